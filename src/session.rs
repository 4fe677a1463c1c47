//! Explicit client context shared by sources and the coordinator.
//!
//! A `Session` is created once by the binary (or a test) and cloned into
//! whatever needs it. Clones share the HTTP connection pool and the
//! connection status.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;

/// Last known reachability of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

#[derive(Clone)]
pub struct Session {
    http: reqwest::Client,
    status: Arc<watch::Sender<ConnectionStatus>>,
}

impl Session {
    /// Build a session whose HTTP client gives up after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("livefeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(http))
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Connected);
        Self {
            http,
            status: Arc::new(status),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status() == ConnectionStatus::Connected
    }

    pub fn set_connection_status(&self, status: ConnectionStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            tracing::info!(?status, "connection status changed");
            *current = status;
            true
        });
    }

    /// Receiver that observes connection status changes.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connected() {
        assert!(Session::default().is_connected());
    }

    #[test]
    fn clones_share_status() {
        let session = Session::default();
        let clone = session.clone();
        clone.set_connection_status(ConnectionStatus::Disconnected);
        assert!(!session.is_connected());
    }

    #[test]
    fn watchers_see_changes() {
        let session = Session::default();
        let mut rx = session.watch_connection();
        session.set_connection_status(ConnectionStatus::Disconnected);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ConnectionStatus::Disconnected);
    }
}
