//! Error types shared across the SDK core.
//!
//! Nothing in this crate retries on its own. Every error carries the context
//! needed to act on it (the offending input, the criteria of a failed fetch,
//! the operation attempted on a closed listener) so callers can decide
//! whether a retry, a resubscribe, or a bail-out is appropriate.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Rejection of an identifier-derivation input before any hashing happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The name does not match `[a-z0-9][a-z0-9_-]*`.
    #[error("invalid identifier name `{name}`: names must match [a-z0-9][a-z0-9_-]*")]
    InvalidName { name: String },

    /// A dotted namespace path has more levels than the network allows.
    #[error("namespace path `{path}` has {count} segments, the maximum is 3")]
    TooManySegments { path: String, count: usize },
}

/// A page fetch reported by the [`Searcher`](crate::streamer::Searcher)
/// failed. The underlying error is preserved as the source; the criteria that
/// produced the fetch is kept in rendered form so consumers can log or match
/// on it without holding the criteria type.
#[derive(Debug, Error)]
#[error("page fetch failed for {criteria}: {source}")]
pub struct PageFetchError {
    criteria: String,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl PageFetchError {
    pub fn new(
        criteria: &impl fmt::Debug,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            criteria: format!("{criteria:?}"),
            source: Box::new(source),
        }
    }

    /// The criteria of the failed fetch, rendered with `Debug`.
    pub fn criteria(&self) -> &str {
        &self.criteria
    }
}

/// Transport-level failure of the message socket.
///
/// Cloneable on purpose: a single socket failure is fanned out to every
/// active subscription stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocketError {
    #[error("socket transport error: {0}")]
    Transport(String),

    #[error("socket closed unexpectedly")]
    Closed,
}

/// Failures of the real-time listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// A subscription was attempted while no connection is established.
    /// Raised synchronously so callers cannot race the check.
    #[error("listener is not open: `{operation}` requires an established connection, call open() first")]
    NotOpen { operation: &'static str },

    #[error(transparent)]
    Socket(#[from] SocketError),

    /// The connection was established but went away before the server sent
    /// its handshake frame.
    #[error("handshake did not complete: {reason}")]
    HandshakeFailed { reason: String },
}
