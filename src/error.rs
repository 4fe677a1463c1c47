//! Errors reported by feed sources and the failure kinds presenters see.
//!
//! A [`SourceError`] never leaves the coordinator: it is classified into a
//! [`FailureKind`] at the boundary and only the kind is emitted.

use thiserror::Error;

/// Tagged error returned by a [`FeedSource`](crate::source::FeedSource).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("request timed out")]
    Timeout,

    #[error("no access permission for this feed")]
    NoAccessPermission,

    #[error("malformed feed: {0}")]
    Parse(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl SourceError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::from(self)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return SourceError::Timeout;
        }
        if let Some(status) = err.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                return SourceError::NoAccessPermission;
            }
            return SourceError::Unknown(format!("HTTP {status}"));
        }
        if err.is_connect() || err.is_request() {
            return SourceError::NetworkUnavailable(err.to_string());
        }
        SourceError::Unknown(err.to_string())
    }
}

impl From<rss::Error> for SourceError {
    fn from(err: rss::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// What a presenter is told about a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connectivity problem; worth a retry-able notice.
    TransientNetwork,
    /// Access was revoked; reconcile the list silently.
    PermissionDenied,
    /// Anything else; generic notice.
    Unknown,
}

impl FailureKind {
    /// Whether the presenter should surface a notice for this failure.
    pub fn is_user_visible(self) -> bool {
        !matches!(self, FailureKind::PermissionDenied)
    }

    pub fn notice(self) -> &'static str {
        match self {
            FailureKind::TransientNetwork => "No connection. Pull to refresh to retry.",
            FailureKind::PermissionDenied => "",
            FailureKind::Unknown => "Something went wrong.",
        }
    }
}

impl From<&SourceError> for FailureKind {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::NetworkUnavailable(_) | SourceError::Timeout => FailureKind::TransientNetwork,
            SourceError::NoAccessPermission => FailureKind::PermissionDenied,
            SourceError::Parse(_) | SourceError::Unknown(_) => FailureKind::Unknown,
        }
    }
}
