//! Terminal presenter state.
//!
//! `App` is the [`Presenter`] the coordinator talks to. It only ever learns
//! counts and states from events; the items themselves are read from the
//! coordinator's snapshot at draw time.

use std::time::{Duration, Instant};

use chrono::Local;
use ratatui::widgets::ListState;

use livefeed::logging::LogBuffer;
use livefeed::{FeedEvent, LoadingState, Presenter};

/// How long a notice stays up unless dismissed.
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// A dismissible notice shown over the list.
pub struct Toast {
    pub message: String,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created_at: Instant::now(),
            duration: TOAST_DURATION,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

pub struct App {
    /// Snapshot length as of the last `DataUpdated`.
    pub item_count: usize,
    pub list_state: ListState,
    pub loading: LoadingState,
    /// Set after an empty page; cleared when a refresh scrolls to the top.
    pub reached_end: bool,
    pub toast: Option<Toast>,
    pub show_logs: bool,
    pub logs: LogBuffer,
    pub status: String,
    pub quit: bool,
    /// Advances once per frame; drives the spinner.
    pub frame: usize,
}

impl App {
    pub fn new(logs: LogBuffer) -> Self {
        Self {
            item_count: 0,
            list_state: ListState::default(),
            loading: LoadingState::Initial,
            reached_end: false,
            toast: None,
            show_logs: false,
            logs,
            status: "Starting…".into(),
            quit: false,
            frame: 0,
        }
    }

    /// Per-frame housekeeping: expire the toast, advance the spinner.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    // -- navigation ----------------------------------------------------------

    /// Move down one row. Returns `true` when already on the last row, which
    /// is the cue to load the next page.
    pub fn select_next(&mut self) -> bool {
        if self.item_count == 0 {
            return false;
        }
        let last = self.item_count - 1;
        match self.list_state.selected() {
            Some(i) if i >= last => {
                self.list_state.select(Some(last));
                true
            }
            Some(i) => {
                self.list_state.select(Some(i + 1));
                false
            }
            None => {
                self.list_state.select(Some(0));
                false
            }
        }
    }

    pub fn select_previous(&mut self) {
        if self.item_count == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.item_count > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if self.item_count > 0 {
            self.list_state.select(Some(self.item_count - 1));
        }
    }

    fn clamp_selection(&mut self) {
        match (self.list_state.selected(), self.item_count) {
            (Some(_), 0) => self.list_state.select(None),
            (Some(i), n) if i >= n => self.list_state.select(Some(n - 1)),
            _ => {}
        }
    }
}

impl Presenter for App {
    fn present(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::LoadingStateChanged(state) => {
                self.loading = state;
                self.status = match state {
                    LoadingState::Initial => "Idle".into(),
                    LoadingState::Loading => "Loading…".into(),
                    LoadingState::Loaded => format!("Updated {}", Local::now().format("%H:%M:%S")),
                };
            }
            FeedEvent::DataUpdated(count) => {
                self.item_count = count;
                self.clamp_selection();
            }
            FeedEvent::DidGetMorePosts { has_new_items } => {
                self.reached_end = !has_new_items;
            }
            FeedEvent::OperationFailed(kind) => {
                if kind.is_user_visible() {
                    self.toast = Some(Toast::new(kind.notice()));
                }
            }
            FeedEvent::ScrollToTop => {
                self.reached_end = false;
                *self.list_state.offset_mut() = 0;
                if self.item_count > 0 {
                    self.list_state.select(Some(0));
                } else {
                    self.list_state.select(None);
                }
            }
        }
    }
}
