//! Internal error helpers for mapping reqwest and stream errors to [`DifyError`].

use std::time::Duration;

use dify_sse::StreamError;
use dify_types::DifyError;

/// Map a [`reqwest::Error`] to a [`DifyError`].
///
/// `timeout` is the configured request timeout, reported back on expiry.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> DifyError {
    if err.is_timeout() {
        DifyError::Timeout(timeout)
    } else {
        DifyError::Network(Box::new(err))
    }
}

/// Map a [`StreamError`] from the event cursor to a [`DifyError`].
///
/// A body read that failed because the request timed out is reported as
/// [`DifyError::Timeout`]. Everything else is wrapped in
/// [`DifyError::Stream`].
pub(crate) fn map_stream_error(err: StreamError, timeout: Duration) -> DifyError {
    let timed_out = matches!(
        &err,
        StreamError::Read(source)
            if source
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout)
    );
    if timed_out {
        DifyError::Timeout(timeout)
    } else {
        DifyError::Stream(Box::new(err))
    }
}
