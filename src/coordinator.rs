//! Feed load coordinator.
//!
//! Sits between UI triggers and a [`FeedSource`]. It owns the snapshot, the
//! loading state and the pending flags, and tells a [`Presenter`] what
//! happened.
//!
//! ## Execution model
//!
//! ```text
//!  refresh()/load_more() ──► tokio::spawn(fetch) ──┐
//!                                                  │ Inbound::Completed
//!  observe_updates() ──► forwarder task ───────────┤ Inbound::Pushed
//!                                                  │
//!  Debouncer ──────────────────────────────────────┤ Inbound::FlushUpdates
//!                                                  ▼
//!                                      inbox ──► pump() / process_next()
//! ```
//!
//! Only the owner of the coordinator mutates its state, through `&mut self`.
//! Spawned tasks never touch it; they post messages into the inbox, which
//! the owner drains on its own schedule (the TUI drains once per tick).
//!
//! `stop()` cancels every outstanding request through a
//! [`CancellationToken`] and swaps the inbox, so nothing issued before the
//! stop can reach the presenter afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::debounce::Debouncer;
use crate::error::{FailureKind, SourceError};
use crate::event::{FeedEvent, FeedRequest, LoadingState, Presenter, RequestKind};
use crate::session::Session;
use crate::source::{FeedItem, FeedSource, FeedUpdate};

/// Messages delivered back to the coordinator's context.
#[derive(Debug)]
pub enum Inbound {
    Completed {
        request: FeedRequest,
        result: Result<Vec<FeedItem>, SourceError>,
    },
    Pushed(FeedUpdate),
    FlushUpdates,
}

/// Guards against duplicate triggers of the same kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingFlags {
    pub is_loading_more: bool,
    pub is_refreshing: bool,
}

/// Highest sequence number issued and observed, per request kind.
#[derive(Debug, Default)]
struct SequenceLedger {
    issued: [u64; 3],
    observed: [u64; 3],
}

impl SequenceLedger {
    fn issue(&mut self, request: FeedRequest) {
        let slot = &mut self.issued[request.kind.index()];
        *slot = (*slot).max(request.seq);
    }

    fn observe(&mut self, request: FeedRequest) {
        let slot = &mut self.observed[request.kind.index()];
        *slot = (*slot).max(request.seq);
    }

    fn is_stale(&self, request: FeedRequest) -> bool {
        request.kind.superseded_by().iter().any(|kind| {
            let i = kind.index();
            self.issued[i].max(self.observed[i]) > request.seq
        })
    }
}

pub struct FeedCoordinator<P> {
    session: Session,
    source: Arc<dyn FeedSource>,
    presenter: P,

    state: LoadingState,
    snapshot: Vec<FeedItem>,
    pending: PendingFlags,
    ledger: SequenceLedger,
    next_seq: u64,
    /// Set once an initial fetch or refresh has succeeded since `start()`.
    has_first_page: bool,
    active: bool,

    cancel: CancellationToken,
    inbox_tx: mpsc::UnboundedSender<Inbound>,
    inbox_rx: mpsc::UnboundedReceiver<Inbound>,
    debouncer: Debouncer,
    queued_updates: Vec<FeedUpdate>,
}

impl<P: Presenter> FeedCoordinator<P> {
    /// Create an idle coordinator. Nothing is fetched until [`start`](Self::start).
    ///
    /// # Panics
    /// When called outside a tokio runtime (the push debouncer needs one).
    pub fn new(session: Session, source: Arc<dyn FeedSource>, presenter: P, debounce_delay: Duration) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            session,
            source,
            presenter,
            state: LoadingState::Initial,
            snapshot: Vec::new(),
            pending: PendingFlags::default(),
            ledger: SequenceLedger::default(),
            next_seq: 0,
            has_first_page: false,
            active: false,
            cancel: CancellationToken::new(),
            inbox_tx,
            inbox_rx,
            debouncer: Debouncer::new(debounce_delay),
            queued_updates: Vec::new(),
        }
    }

    // -- accessors -----------------------------------------------------------

    pub fn state(&self) -> LoadingState {
        self.state
    }

    pub fn snapshot(&self) -> &[FeedItem] {
        &self.snapshot
    }

    pub fn pending(&self) -> PendingFlags {
        self.pending
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// The presenter together with a read-only view of the snapshot.
    pub fn view_mut(&mut self) -> (&mut P, &[FeedItem]) {
        (&mut self.presenter, &self.snapshot)
    }

    // -- operations ----------------------------------------------------------

    /// Subscribe to push updates and issue the initial fetch.
    ///
    /// Calling this on a started coordinator does nothing.
    pub fn start(&mut self) {
        if self.active {
            tracing::warn!(source = %self.source.name(), "coordinator already started");
            return;
        }
        tracing::info!(source = %self.source.name(), "starting feed");

        self.active = true;
        self.has_first_page = false;
        self.cancel = CancellationToken::new();

        let mut updates = self.source.observe_updates(self.cancel.child_token());
        let tx = self.inbox_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                let update = tokio::select! {
                    _ = cancel.cancelled() => break,
                    update = updates.recv() => update,
                };
                let Some(update) = update else { break };
                if tx.send(Inbound::Pushed(update)).is_err() {
                    break;
                }
            }
        });

        self.set_state(LoadingState::Loading);
        self.dispatch(RequestKind::InitialFetch);
    }

    /// Re-fetch the first page. Dropped while another refresh is in flight.
    pub fn refresh(&mut self) {
        if !self.active {
            tracing::debug!("refresh ignored: coordinator stopped");
            return;
        }
        if self.pending.is_refreshing {
            tracing::debug!("refresh ignored: already refreshing");
            return;
        }
        if !self.session.is_connected() {
            // The cached status only changes when a request completes, so a
            // user refresh is the retry that can clear it.
            tracing::info!("refresh while offline: retrying");
        }

        self.pending.is_refreshing = true;
        self.set_state(LoadingState::Loading);
        self.dispatch(RequestKind::Refresh);
    }

    /// Fetch the next page. Dropped while another load-more is in flight or
    /// before the first page has arrived.
    pub fn load_more(&mut self) {
        if !self.active {
            tracing::debug!("load more ignored: coordinator stopped");
            return;
        }
        if !self.has_first_page {
            tracing::debug!("load more ignored: first page not loaded");
            return;
        }
        if self.pending.is_loading_more {
            tracing::debug!("load more ignored: already loading");
            return;
        }

        self.pending.is_loading_more = true;
        self.set_state(LoadingState::Loading);
        self.dispatch(RequestKind::LoadMore);
    }

    /// Unsubscribe and cancel outstanding requests. Idempotent.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        tracing::info!(source = %self.source.name(), "stopping feed");

        self.active = false;
        self.cancel.cancel();
        self.debouncer.cancel();
        self.queued_updates.clear();
        self.pending = PendingFlags::default();

        // Anything already posted belongs to the old subscription.
        let (tx, rx) = mpsc::unbounded_channel();
        self.inbox_tx = tx;
        self.inbox_rx = rx;
    }

    // -- inbox ---------------------------------------------------------------

    /// Process every message already waiting, without blocking.
    ///
    /// Returns how many messages were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.inbox_rx.try_recv() {
            self.handle(msg);
            handled += 1;
        }
        handled
    }

    /// Wait for the next message and process it.
    pub async fn process_next(&mut self) {
        if let Some(msg) = self.inbox_rx.recv().await {
            self.handle(msg);
        }
    }

    /// Apply one message on the coordinator's context.
    pub fn handle(&mut self, msg: Inbound) {
        if !self.active {
            tracing::trace!(?msg, "dropping message after stop");
            return;
        }
        match msg {
            Inbound::Completed { request, result } => self.on_completed(request, result),
            Inbound::Pushed(update) => {
                self.queued_updates.push(update);
                let tx = self.inbox_tx.clone();
                self.debouncer.schedule(move || {
                    let _ = tx.send(Inbound::FlushUpdates);
                });
            }
            Inbound::FlushUpdates => self.flush_updates(),
        }
    }

    // -- internals -----------------------------------------------------------

    fn dispatch(&mut self, kind: RequestKind) {
        self.next_seq += 1;
        let request = FeedRequest { kind, seq: self.next_seq };
        self.ledger.issue(request);
        tracing::debug!(%request, "issuing request");

        let source = self.source.clone();
        let tx = self.inbox_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let fetch = async {
                match kind {
                    RequestKind::InitialFetch | RequestKind::Refresh => source.fetch_initial().await,
                    RequestKind::LoadMore => source.fetch_more().await,
                }
            };
            tokio::select! {
                _ = cancel.cancelled() => tracing::debug!(%request, "request cancelled"),
                result = fetch => {
                    let _ = tx.send(Inbound::Completed { request, result });
                }
            }
        });
    }

    fn on_completed(&mut self, request: FeedRequest, result: Result<Vec<FeedItem>, SourceError>) {
        if self.ledger.is_stale(request) {
            tracing::debug!(%request, "discarding stale result");
            return;
        }
        self.ledger.observe(request);

        match request.kind {
            RequestKind::Refresh => self.pending.is_refreshing = false,
            RequestKind::LoadMore => self.pending.is_loading_more = false,
            RequestKind::InitialFetch => {}
        }
        self.set_state(LoadingState::Loaded);

        let items = match result {
            Ok(items) => items,
            Err(err) => {
                self.report_failure(request, &err);
                return;
            }
        };

        match request.kind {
            RequestKind::InitialFetch | RequestKind::Refresh => {
                tracing::debug!(%request, count = items.len(), "replacing snapshot");
                self.snapshot = items;
                self.has_first_page = true;
                self.emit(FeedEvent::DataUpdated(self.snapshot.len()));
                if request.kind == RequestKind::Refresh {
                    self.emit(FeedEvent::ScrollToTop);
                }
            }
            RequestKind::LoadMore => {
                let has_new_items = !items.is_empty();
                tracing::debug!(%request, count = items.len(), "appending page");
                self.snapshot.extend(items);
                if has_new_items {
                    self.emit(FeedEvent::DataUpdated(self.snapshot.len()));
                }
                self.emit(FeedEvent::DidGetMorePosts { has_new_items });
            }
        }
    }

    fn report_failure(&mut self, request: FeedRequest, err: &SourceError) {
        let kind = FailureKind::from(err);
        tracing::warn!(%request, error = %err, ?kind, "feed request failed");
        if kind.is_user_visible() {
            self.emit(FeedEvent::OperationFailed(kind));
        } else {
            // Revoked access: re-render what we have, no notice.
            self.emit(FeedEvent::DataUpdated(self.snapshot.len()));
        }
    }

    fn flush_updates(&mut self) {
        if self.queued_updates.is_empty() {
            return;
        }
        let batched = self.queued_updates.len();
        for update in self.queued_updates.drain(..) {
            update.apply_to(&mut self.snapshot);
        }
        tracing::debug!(batched, count = self.snapshot.len(), "applied push updates");
        self.emit(FeedEvent::DataUpdated(self.snapshot.len()));
    }

    fn set_state(&mut self, state: LoadingState) {
        self.state = state;
        self.emit(FeedEvent::LoadingStateChanged(state));
    }

    fn emit(&mut self, event: FeedEvent) {
        if self.active {
            self.presenter.present(event);
        }
    }
}

impl<P> Drop for FeedCoordinator<P> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
