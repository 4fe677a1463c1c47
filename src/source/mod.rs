//! Feed data source abstraction.
//!
//! The coordinator talks to its backend only through the [`FeedSource`]
//! trait. Concrete implementations live in sub-modules (currently
//! [`rss`]); tests substitute scripted in-memory sources.
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Implement [`FeedSource`] for your struct. `fetch_initial` restarts
//!    paging, `fetch_more` returns the next page (empty at the end), and
//!    `observe_updates` pushes [`FeedUpdate`]s until the token is cancelled.
//! 3. Add `mod atom;` below and re-export the struct.

mod feed_item;
mod rss;

pub use feed_item::FeedItem;
pub use rss::RssSource;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;

/// A change pushed by a source without being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// The whole feed, replacing the current snapshot.
    Replace(Vec<FeedItem>),
    /// Entries to upsert by id. Unknown ids go to the head, in order.
    Patch(Vec<FeedItem>),
}

impl FeedUpdate {
    /// Apply this update to `items` in place.
    pub fn apply_to(self, items: &mut Vec<FeedItem>) {
        match self {
            FeedUpdate::Replace(new_items) => *items = new_items,
            FeedUpdate::Patch(patch) => {
                let mut fresh = Vec::new();
                for item in patch {
                    match items.iter_mut().find(|existing| existing.id == item.id) {
                        Some(existing) => *existing = item,
                        None => fresh.push(item),
                    }
                }
                if !fresh.is_empty() {
                    items.splice(0..0, fresh);
                }
            }
        }
    }
}

/// The external collaborator that owns fetching, paging and observation.
///
/// Methods take `&self` because requests run concurrently on spawned tasks;
/// implementations keep any paging cursor behind interior mutability.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable label shown next to items and in logs.
    fn name(&self) -> &str;

    /// Fetch the first page, resetting any paging cursor.
    async fn fetch_initial(&self) -> Result<Vec<FeedItem>, SourceError>;

    /// Fetch the page after the last one returned. An empty page means the
    /// end of the feed.
    async fn fetch_more(&self) -> Result<Vec<FeedItem>, SourceError>;

    /// Start pushing updates. The stream ends once `cancel` fires.
    fn observe_updates(&self, cancel: CancellationToken) -> mpsc::Receiver<FeedUpdate>;
}
