//! Streaming responses.
//!
//! Streaming endpoints answer with `text/event-stream`:
//!
//! ```text
//! data: {"event": "message", "answer": "Hel", ...}
//!
//! data: {"event": "message", "answer": "lo", ...}
//!
//! data: {"event": "message_end", "metadata": {...}}
//! ```
//!
//! [`EventReader`] pulls raw events off the body with [`dify_sse::EventStream`]
//! and decodes them into [`StreamPayload`]s.

use std::time::Duration;

use dify_sse::{Event, EventStream, ResponseSource, StreamState};
use dify_types::{DifyError, StreamPayload};
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::map_stream_error;

/// Reader over one streaming response.
///
/// Pull with [`next_payload`](Self::next_payload) (decoded) or
/// [`next_event`](Self::next_event) (raw) until `Ok(None)`, then
/// [`close`](Self::close). Dropping the reader also releases the connection.
#[derive(Debug)]
pub struct EventReader {
    events: EventStream<ResponseSource>,
    timeout: Duration,
}

impl EventReader {
    pub(crate) fn new(response: reqwest::Response, timeout: Duration) -> Self {
        Self {
            events: EventStream::new(ResponseSource::new(response)),
            timeout,
        }
    }

    /// Current state of the underlying cursor.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.events.state()
    }

    /// Next raw event, or `Ok(None)` at the end of the stream.
    ///
    /// # Errors
    ///
    /// [`DifyError::Timeout`] when the body read timed out,
    /// [`DifyError::Stream`] for other read failures or use after close.
    pub async fn next_event(&mut self) -> Result<Option<Event>, DifyError> {
        self.events
            .next()
            .await
            .map_err(|e| map_stream_error(e, self.timeout))
    }

    /// Next decoded event, or `Ok(None)` at the end of the stream.
    ///
    /// A payload that does not match the shape of its kind is logged and
    /// returned as [`StreamPayload::Other`] so the stream keeps going.
    ///
    /// # Errors
    ///
    /// As [`next_event`](Self::next_event).
    pub async fn next_payload(&mut self) -> Result<Option<StreamPayload>, DifyError> {
        Ok(self.next_event().await?.map(decode))
    }

    /// Next decoded event, giving up when `token` is cancelled.
    ///
    /// Cancellation closes the reader.
    ///
    /// # Errors
    ///
    /// [`DifyError::Stream`] wrapping [`dify_sse::StreamError::Cancelled`] on
    /// cancellation, otherwise as [`next_event`](Self::next_event).
    pub async fn next_cancellable(
        &mut self,
        token: &CancellationToken,
    ) -> Result<Option<StreamPayload>, DifyError> {
        let event = self
            .events
            .next_cancellable(token)
            .await
            .map_err(|e| map_stream_error(e, self.timeout))?;
        Ok(event.map(decode))
    }

    /// Release the connection. Idempotent.
    pub fn close(&mut self) {
        self.events.close();
    }

    /// Convert into a [`Stream`] of decoded events.
    ///
    /// The stream ends after the last event or the first error, and releases
    /// the connection in both cases.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamPayload, DifyError>> + Send {
        let Self { events, timeout } = self;
        async_stream::stream! {
            let mut events = events;
            loop {
                match events.next().await {
                    Ok(Some(event)) => yield Ok(decode(event)),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(map_stream_error(e, timeout));
                        break;
                    }
                }
            }
            events.close();
        }
    }
}

fn decode(event: Event) -> StreamPayload {
    match StreamPayload::decode(&event.kind, &event.payload) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(kind = %event.kind, error = %e, "undecodable stream event");
            StreamPayload::Other {
                data: serde_json::from_str(&event.payload)
                    .unwrap_or(serde_json::Value::String(event.payload)),
                kind: event.kind,
            }
        }
    }
}
