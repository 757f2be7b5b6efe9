//! Errors surfaced by [`EventStream`](crate::EventStream).

/// Terminal failures of an event stream.
///
/// Malformed frames are never reported here; they are skipped by the parser.
/// End-of-stream is not an error either and shows up as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The byte source failed (connection reset, timeout, ...).
    #[error("stream read error: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The stream was closed and can no longer be read.
    #[error("stream closed")]
    Closed,
    /// A pending read was aborted through a cancellation token.
    #[error("cancelled")]
    Cancelled,
}

impl StreamError {
    /// Whether retrying the whole request may succeed.
    ///
    /// Only source failures qualify; a closed or cancelled stream was ended on
    /// purpose.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}
