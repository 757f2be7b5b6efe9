//! Byte sources an [`EventStream`](crate::EventStream) can pull from.

use std::future::Future;

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, AsyncReadExt};

/// A sequential supplier of raw stream bytes.
///
/// Typically the body of a live HTTP response. The transport is expected to
/// have checked the status code before handing the body over.
pub trait ByteSource: Send {
    /// Error produced by a failed read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read up to `buf.len()` bytes into `buf`.
    ///
    /// Returns the number of bytes written. `Ok(0)` signals end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Release the underlying resource (connection, file handle, ...).
    ///
    /// Must be safe to call more than once. Reads after `close` return
    /// end-of-stream.
    fn close(&mut self);
}

/// [`ByteSource`] over the body of a [`reqwest::Response`].
///
/// Body chunks are copied out in caller-sized pieces; the unconsumed tail of a
/// chunk is kept for the next read.
#[derive(Debug)]
pub struct ResponseSource {
    response: Option<reqwest::Response>,
    pending: Bytes,
}

impl ResponseSource {
    /// Wrap a response whose status has already been checked.
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            pending: Bytes::new(),
        }
    }

    /// Whether the response is still held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.response.is_some()
    }
}

impl From<reqwest::Response> for ResponseSource {
    fn from(response: reqwest::Response) -> Self {
        Self::new(response)
    }
}

impl ByteSource for ResponseSource {
    type Error = reqwest::Error;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, reqwest::Error> {
        while self.pending.is_empty() {
            let Some(response) = self.response.as_mut() else {
                return Ok(0);
            };
            match response.chunk().await? {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }

        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }

    fn close(&mut self) {
        self.pending.clear();
        // Dropping the response releases the connection.
        self.response = None;
    }
}

/// [`ByteSource`] over any [`AsyncRead`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: Option<R>,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wrap an async reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    type Error = std::io::Error;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, std::io::Error> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf).await,
            None => Ok(0),
        }
    }

    fn close(&mut self) {
        self.reader = None;
    }
}
