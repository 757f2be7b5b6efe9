//! Pull-based event cursor over a [`ByteSource`].

use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::event::Event;
use crate::frame::FrameBuffer;
use crate::record::parse_frame;
use crate::source::ByteSource;

/// Size of the scratch buffer each read fills.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Lifecycle of an [`EventStream`].
///
/// `Open -> Reading -> Draining -> Closed`. `Reading` lasts as long as bytes
/// keep arriving. `Draining` is entered once, when the source reports
/// end-of-stream and the trailing partial frame has been flushed. `Closed`
/// is terminal and the source has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Constructed, nothing read yet.
    Open,
    /// Pulling bytes from the source.
    Reading,
    /// The source is exhausted; only end-of-stream is reported from now on.
    Draining,
    /// The source has been released.
    Closed,
}

/// Incremental event parser over a live byte stream.
///
/// Drive it with repeated calls to [`next`](Self::next) from a single task.
/// Each call yields one event, a clean end, or a terminal error. Events are
/// delivered in the order their frames complete on the wire and nothing is
/// read ahead beyond what is needed to find one frame boundary.
///
/// Always finish with [`close`](Self::close) (or drop the stream): the source
/// usually holds a network connection.
#[derive(Debug)]
pub struct EventStream<S> {
    source: S,
    buffer: FrameBuffer,
    scratch: Box<[u8]>,
    state: StreamState,
}

impl<S: ByteSource> EventStream<S> {
    /// Create a cursor over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: FrameBuffer::new(),
            scratch: vec![0u8; READ_CHUNK_SIZE].into_boxed_slice(),
            state: StreamState::Open,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Pull the next event.
    ///
    /// Returns `Ok(Some(event))` for an event and `Ok(None)` once the source
    /// is exhausted. A trailing frame without a terminator is still delivered
    /// before the end is reported. A read error releases the source and is
    /// returned as-is; the stream is closed afterwards.
    ///
    /// # Errors
    ///
    /// [`StreamError::Read`] when the source fails, [`StreamError::Closed`]
    /// when called after [`close`](Self::close).
    pub async fn next(&mut self) -> Result<Option<Event>, StreamError> {
        match self.state {
            StreamState::Closed => return Err(StreamError::Closed),
            StreamState::Draining => return Ok(None),
            StreamState::Open | StreamState::Reading => self.state = StreamState::Reading,
        }

        loop {
            while let Some(frame) = self.buffer.try_extract_frame() {
                tracing::trace!(len = frame.len(), "extracted frame");
                if let Some(event) = parse_frame(&frame) {
                    return Ok(Some(event));
                }
            }

            let n = match self.source.read(&mut self.scratch).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(error = %e, "event stream read failed");
                    self.close();
                    return Err(StreamError::Read(Box::new(e)));
                }
            };

            if n == 0 {
                self.state = StreamState::Draining;
                let last = self.buffer.drain().and_then(|frame| parse_frame(&frame));
                tracing::debug!(flushed = last.is_some(), "event stream reached end");
                return Ok(last);
            }

            self.buffer.append(&self.scratch[..n]);
        }
    }

    /// Pull the next event, giving up when `token` is cancelled.
    ///
    /// Cancellation aborts the pending read and closes the stream. Bytes that
    /// were already buffered are discarded.
    ///
    /// # Errors
    ///
    /// [`StreamError::Cancelled`] on cancellation, otherwise as
    /// [`next`](Self::next).
    pub async fn next_cancellable(
        &mut self,
        token: &CancellationToken,
    ) -> Result<Option<Event>, StreamError> {
        let result = tokio::select! {
            biased;
            () = token.cancelled() => None,
            result = self.next() => Some(result),
        };

        match result {
            Some(result) => result,
            None => {
                tracing::debug!("event stream cancelled");
                self.close();
                Err(StreamError::Cancelled)
            }
        }
    }

    /// Release the source. Idempotent.
    ///
    /// Every later [`next`](Self::next) fails with [`StreamError::Closed`].
    pub fn close(&mut self) {
        if self.state == StreamState::Closed {
            return;
        }
        self.source.close();
        self.buffer.clear();
        self.state = StreamState::Closed;
        tracing::debug!("event stream closed");
    }

    /// Convert the cursor into a [`Stream`] of events.
    ///
    /// The stream ends after the source is exhausted or after the first error,
    /// and closes the source in both cases.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Event, StreamError>> + Send
    where
        S: 'static,
    {
        async_stream::stream! {
            loop {
                match self.next().await {
                    Ok(Some(event)) => yield Ok(event),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
            self.close();
        }
    }
}
