use getset::{CopyGetters, Getters};
use strum_macros::{Display, IntoStaticStr};

pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while serving an endpoint key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Upstream answered 429. Handled by the worker, never handed to a caller.
    Throttled,
    /// Upstream answered with a non-success status.
    Status(u16),
    /// Upstream did not answer within the request timeout.
    Timeout,
    /// Connection level failure.
    Transport,
    /// Upstream answered 2xx with a body that is not JSON.
    Decode,
    /// The pending result was dropped before the worker fulfilled it.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Getters, CopyGetters)]
#[error("{kind} error for {endpoint}: {message}")]
pub struct Error {
    #[getset(get_copy = "pub")]
    kind: ErrorKind,
    #[getset(get = "pub")]
    endpoint: String,
    #[getset(get = "pub")]
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn throttled(endpoint: impl Into<String>) -> Self {
        Self::new(ErrorKind::Throttled, endpoint, "too many requests")
    }

    pub fn status_code(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Status(status), endpoint, message)
    }

    pub fn timeout(endpoint: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, endpoint, "upstream request timed out")
    }

    pub fn internal(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, endpoint, message)
    }

    pub fn is_throttled(&self) -> bool {
        self.kind == ErrorKind::Throttled
    }

    /// HTTP status to report to the caller. Falls back to 500 when the
    /// upstream never produced one.
    pub fn status(&self) -> u16 {
        match self.kind {
            ErrorKind::Status(status) => status,
            ErrorKind::Timeout => 504,
            ErrorKind::Transport | ErrorKind::Decode => 502,
            ErrorKind::Throttled | ErrorKind::Internal => 500,
        }
    }

    /// Stable snake_case label of the error kind.
    pub fn label(&self) -> &'static str {
        self.kind.into()
    }
}
