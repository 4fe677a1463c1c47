//! State and event types shared by the coordinator and its presenters.

use std::fmt;

use crate::error::FailureKind;

/// Coarse loading state of the feed.
///
/// Tracks the latest transition only. Every accepted completion moves to
/// `Loaded`, even when a request of the other kind is still in flight;
/// check [`PendingFlags`](crate::coordinator::PendingFlags) for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    Initial,
    Loading,
    Loaded,
}

/// What an outstanding request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    InitialFetch,
    Refresh,
    LoadMore,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] = [RequestKind::InitialFetch, RequestKind::Refresh, RequestKind::LoadMore];

    /// Kinds whose newer requests make a result of this kind stale.
    ///
    /// Initial fetch and refresh both replace the snapshot, so a later
    /// refresh supersedes an initial fetch.
    pub fn superseded_by(self) -> &'static [RequestKind] {
        match self {
            RequestKind::InitialFetch => &[RequestKind::InitialFetch, RequestKind::Refresh],
            RequestKind::Refresh => &[RequestKind::Refresh],
            RequestKind::LoadMore => &[RequestKind::LoadMore],
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            RequestKind::InitialFetch => 0,
            RequestKind::Refresh => 1,
            RequestKind::LoadMore => 2,
        }
    }
}

/// One issued request: its kind and a coordinator-wide sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    pub kind: RequestKind,
    pub seq: u64,
}

impl fmt::Display for FeedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.seq)
    }
}

/// Everything a presenter is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    LoadingStateChanged(LoadingState),
    /// The snapshot changed; carries its new length.
    DataUpdated(usize),
    /// A load-more finished. `false` means the feed has no further pages.
    DidGetMorePosts { has_new_items: bool },
    OperationFailed(FailureKind),
    ScrollToTop,
}

/// The UI surface that renders coordinator events.
///
/// Presenters never see the snapshot mutably; they read it through
/// [`FeedCoordinator::snapshot`](crate::coordinator::FeedCoordinator::snapshot).
pub trait Presenter {
    fn present(&mut self, event: FeedEvent);
}

/// Records events in order. Handy for tests and replay.
impl Presenter for Vec<FeedEvent> {
    fn present(&mut self, event: FeedEvent) {
        self.push(event);
    }
}

/// Presenter for headless runs: every event becomes a log record.
#[derive(Debug, Default)]
pub struct LogPresenter {
    pub events_seen: usize,
}

impl Presenter for LogPresenter {
    fn present(&mut self, event: FeedEvent) {
        self.events_seen += 1;
        match event {
            FeedEvent::OperationFailed(kind) if kind.is_user_visible() => {
                tracing::warn!(?kind, "{}", kind.notice());
            }
            other => tracing::info!(event = ?other, "feed event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn refresh_supersedes_initial_fetch_only() {
        assert!(RequestKind::InitialFetch.superseded_by().contains(&RequestKind::Refresh));
        assert!(!RequestKind::Refresh.superseded_by().contains(&RequestKind::InitialFetch));
        assert_eq!(RequestKind::LoadMore.superseded_by(), &[RequestKind::LoadMore]);
    }

    #[test]
    fn indices_are_distinct() {
        let seen: HashSet<usize> = RequestKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(seen.len(), RequestKind::ALL.len());
        assert!(seen.iter().all(|&i| i < RequestKind::ALL.len()));
    }

    #[test]
    fn request_display_names_kind_and_seq() {
        let req = FeedRequest { kind: RequestKind::LoadMore, seq: 7 };
        assert_eq!(req.to_string(), "LoadMore#7");
    }

    #[test]
    fn log_presenter_counts_events() {
        let mut presenter = LogPresenter::default();
        presenter.present(FeedEvent::ScrollToTop);
        presenter.present(FeedEvent::OperationFailed(FailureKind::Unknown));
        assert_eq!(presenter.events_seen, 2);
    }
}
