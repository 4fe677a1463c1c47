//! livefeed: a paginated, live-updating feed driven by a load coordinator.
//!
//! ## Architecture overview
//!
//! ```text
//!  ┌──────────────┐ fetch_initial / fetch_more ┌───────────────────┐
//!  │  FeedSource  │ ◄───────────────────────── │  FeedCoordinator  │
//!  │ (source/)    │ ─────────────────────────► │  (coordinator)    │
//!  └──────────────┘   results + push updates   └─────────┬─────────┘
//!         │ poll.rs                                      │ FeedEvent
//!         ▼                                              ▼
//!   periodic re-fetch                            ┌───────────────┐
//!                                                │   Presenter   │
//!                                                │ (TUI App, log)│
//!                                                └───────────────┘
//! ```
//!
//! * **`source`**: the [`FeedSource`](source::FeedSource) trait, the
//!   [`FeedItem`](source::FeedItem) type and the RSS implementation.
//! * **`poll`**: turns a pull-only source into a push stream.
//! * **`debounce`**: coalesces bursts of push updates.
//! * **`coordinator`**: loading state, snapshot, pending flags, stale-result
//!   discard and the event protocol.
//! * **`event`**: state/event types and the [`Presenter`](event::Presenter)
//!   trait.
//! * **`session`**: the explicitly injected client context.
//! * **`config`** / **`logging`**: ambient setup used by the binary.

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod event;
pub mod logging;
pub mod poll;
pub mod session;
pub mod source;

pub use coordinator::{FeedCoordinator, Inbound, PendingFlags};
pub use error::{FailureKind, SourceError};
pub use event::{FeedEvent, FeedRequest, LoadingState, Presenter, RequestKind};
pub use session::{ConnectionStatus, Session};
pub use source::{FeedItem, FeedSource, FeedUpdate, RssSource};
