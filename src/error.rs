//! Relay error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong while handling a signal.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RelayErrorKind {
    /// Join rejected: the session is full or does not exist.
    #[display("Game is full or does not exist")]
    SessionUnavailable,
    /// The signal referenced a session that does not exist.
    #[display("Game {} does not exist", _0)]
    SessionNotFound(String),
    /// The inbound frame could not be decoded.
    #[display("Malformed signal: {}", _0)]
    MalformedSignal(String),
}

/// Relay error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Relay error: {} at {}:{}", kind, file, line)]
pub struct RelayError {
    /// Error kind.
    pub kind: RelayErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RelayError {
    /// Creates a new relay error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: RelayErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Message shown to the originating connection.
    pub fn client_message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<serde_json::Error> for RelayError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(RelayErrorKind::MalformedSignal(err.to_string()))
    }
}
