//! RSS-backed [`FeedSource`].
//!
//! RSS has no paging and no push channel, so this source fakes both: the
//! initial fetch downloads the channel and serves it in fixed-size pages,
//! and [`observe_updates`](FeedSource::observe_updates) polls the channel
//! on a timer through [`crate::poll`].

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{FeedItem, FeedSource, FeedUpdate};
use crate::error::SourceError;
use crate::poll;
use crate::session::{ConnectionStatus, Session};

/// An RSS 2.0 feed served page by page.
pub struct RssSource {
    session: Session,
    url: String,
    label: String,
    poll_interval: Duration,
    pager: Mutex<Pager>,
}

impl RssSource {
    pub fn new(
        session: Session,
        url: impl Into<String>,
        label: impl Into<String>,
        page_size: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            session,
            url: url.into(),
            label: label.into(),
            poll_interval,
            pager: Mutex::new(Pager::new(page_size)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse an already-downloaded [`rss::Channel`] into [`FeedItem`]s.
    ///
    /// Pure (no I/O) so tests can exercise it without a network.
    pub fn parse_channel(channel: &rss::Channel, label: &str) -> Vec<FeedItem> {
        channel
            .items()
            .iter()
            .map(|item| {
                // <guid>, then <link>, then empty.
                let id = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .or_else(|| item.link().map(String::from))
                    .unwrap_or_default();

                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                FeedItem {
                    id,
                    title: item.title().unwrap_or("(untitled)").to_string(),
                    description: item.description().map(String::from),
                    link: item.link().map(String::from),
                    published,
                    source_name: label.to_string(),
                }
            })
            .collect()
    }

    fn lock_pager(&self) -> std::sync::MutexGuard<'_, Pager> {
        // Pager updates cannot panic midway, so a poisoned lock still holds
        // consistent data.
        self.pager.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Download and parse the channel, newest entries first.
///
/// Keeps the session's connection status in step with the outcome.
async fn download(session: &Session, url: &str, label: &str) -> Result<Vec<FeedItem>, SourceError> {
    let result = async {
        let body = session
            .http()
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let channel = rss::Channel::read_from(body.as_ref())?;
        Ok::<_, SourceError>(RssSource::parse_channel(&channel, label))
    }
    .await;

    match &result {
        Ok(_) => session.set_connection_status(ConnectionStatus::Connected),
        Err(SourceError::NetworkUnavailable(_)) => session.set_connection_status(ConnectionStatus::Disconnected),
        Err(_) => {}
    }

    let mut items = result?;
    items.sort();
    Ok(items)
}

#[async_trait]
impl FeedSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_initial(&self) -> Result<Vec<FeedItem>, SourceError> {
        let items = download(&self.session, &self.url, &self.label).await?;
        tracing::debug!(source = %self.label, total = items.len(), "downloaded channel");
        Ok(self.lock_pager().reset(items))
    }

    async fn fetch_more(&self) -> Result<Vec<FeedItem>, SourceError> {
        Ok(self.lock_pager().next_page())
    }

    fn observe_updates(&self, cancel: CancellationToken) -> mpsc::Receiver<FeedUpdate> {
        let session = self.session.clone();
        let url = self.url.clone();
        let label = self.label.clone();
        let page_size = self.lock_pager().page_size;

        poll::spawn(self.label.clone(), self.poll_interval, cancel, move || {
            let session = session.clone();
            let url = url.clone();
            let label = label.clone();
            async move {
                let mut items = download(&session, &url, &label).await?;
                items.truncate(page_size);
                Ok(items)
            }
        })
    }
}

/// Serves a downloaded channel in fixed-size pages.
#[derive(Debug)]
struct Pager {
    page_size: usize,
    items: Vec<FeedItem>,
    offset: usize,
}

impl Pager {
    fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            items: Vec::new(),
            offset: 0,
        }
    }

    /// Replace the backing items and return the first page.
    fn reset(&mut self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        self.items = items;
        self.offset = 0;
        self.next_page()
    }

    /// Next page, or an empty vec once everything has been served.
    fn next_page(&mut self) -> Vec<FeedItem> {
        let end = self.offset.saturating_add(self.page_size).min(self.items.len());
        let page = self.items[self.offset..end].to_vec();
        self.offset = end;
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(xml: &str) -> rss::Channel {
        rss::Channel::read_from(xml.as_bytes()).unwrap()
    }

    #[test]
    fn parse_channel_extracts_items() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Community</title>
    <item>
      <title>Welcome post</title>
      <link>https://example.com/posts/1</link>
      <guid>post-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
      <description>Hello everyone</description>
    </item>
    <item>
      <title>Second post</title>
      <link>https://example.com/posts/2</link>
      <guid>post-2</guid>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

        let items = RssSource::parse_channel(&channel(xml), "Community");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "post-1");
        assert_eq!(items[0].title, "Welcome post");
        assert_eq!(items[0].link.as_deref(), Some("https://example.com/posts/1"));
        assert_eq!(items[0].description.as_deref(), Some("Hello everyone"));
        assert_eq!(items[0].source_name, "Community");
        assert!(items[0].published.is_some());
        assert!(items[1].description.is_none());
    }

    #[test]
    fn id_falls_back_to_link() {
        let xml = r#"<rss version="2.0"><channel><title>T</title>
<item><title>No guid</title><link>https://example.com/x</link></item>
</channel></rss>"#;

        let items = RssSource::parse_channel(&channel(xml), "t");
        assert_eq!(items[0].id, "https://example.com/x");
    }

    #[test]
    fn untitled_and_undated_entries_degrade_gracefully() {
        let xml = r#"<rss version="2.0"><channel><title>T</title>
<item><guid>g1</guid><pubDate>not-a-date</pubDate></item>
</channel></rss>"#;

        let items = RssSource::parse_channel(&channel(xml), "t");
        assert_eq!(items[0].title, "(untitled)");
        assert!(items[0].published.is_none());
    }

    fn numbered(n: usize) -> Vec<FeedItem> {
        (0..n).map(|i| FeedItem::new(i.to_string(), format!("#{i}"), "t")).collect()
    }

    #[test]
    fn pager_serves_pages_then_empty() {
        let mut pager = Pager::new(2);
        assert_eq!(pager.reset(numbered(5)).len(), 2);
        assert_eq!(pager.next_page().len(), 2);

        let last = pager.next_page();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, "4");

        assert!(pager.next_page().is_empty());
        assert!(pager.next_page().is_empty());
    }

    #[test]
    fn pager_reset_rewinds() {
        let mut pager = Pager::new(3);
        pager.reset(numbered(4));
        pager.next_page();

        let first = pager.reset(numbered(4));
        assert_eq!(first[0].id, "0");
    }

    #[test]
    fn pager_before_reset_is_empty() {
        let mut pager = Pager::new(10);
        assert!(pager.next_page().is_empty());
    }

    #[test]
    fn huge_page_size_serves_everything_then_empty() {
        let mut pager = Pager::new(usize::MAX);
        assert_eq!(pager.reset(numbered(3)).len(), 3);
        assert!(pager.next_page().is_empty());
        assert!(pager.next_page().is_empty());
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let mut pager = Pager::new(0);
        assert_eq!(pager.reset(numbered(2)).len(), 1);
    }

    #[test]
    fn name_returns_label() {
        let src = RssSource::new(Session::default(), "http://example.com/feed", "My Feed", 20, Duration::from_secs(60));
        assert_eq!(src.name(), "My Feed");
        assert_eq!(src.url(), "http://example.com/feed");
    }
}
