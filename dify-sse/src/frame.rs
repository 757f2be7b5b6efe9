//! Incremental frame buffer.
//!
//! Accumulates raw bytes from the wire and cuts them into frames. Two framing
//! conventions are accepted:
//!
//! ```text
//! event: message
//! data: {"answer":"Hi"}
//!                              <- blank line terminates the record
//! data: {"event":"ping"}       <- compact single line, no terminator
//! ```
//!
//! The buffer never assumes a maximum event size. Both searches (for the
//! blank-line terminator and for the end of the first line) resume where the
//! previous call stopped, so a long record arriving in small reads costs time
//! linear in its length.

use bytes::{Buf, Bytes, BytesMut};

/// Blank-line terminator for multi-line records.
const RECORD_TERMINATOR: &[u8] = b"\n\n";

/// Prefix that marks a line as a self-contained compact frame.
const DATA_PREFIX: &[u8] = b"data:";

/// Append-only, front-truncating byte accumulator.
///
/// Owned exclusively by one [`EventStream`](crate::EventStream); its contents
/// live for the whole stream and are never shared.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: BytesMut,
    /// Bytes at the front of `buf` already searched for the terminator.
    scanned: usize,
    /// Bytes at the front of `buf` known to hold no `\n`.
    line_scanned: usize,
}

impl FrameBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the tail of the buffer.
    ///
    /// No upper bound is enforced here; backpressure belongs to the transport.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered, not yet framed bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.reset_scan();
    }

    /// Cut the next complete frame off the front of the buffer, if one is
    /// available.
    ///
    /// A blank-line terminated record wins over the compact form. Failing
    /// that, a first line starting with `data:` is returned as a one-line
    /// frame. Returns `None` when more bytes are needed.
    pub fn try_extract_frame(&mut self) -> Option<Bytes> {
        if let Some(idx) = self.find_terminator() {
            let frame = self.buf.split_to(idx).freeze();
            self.buf.advance(RECORD_TERMINATOR.len());
            self.reset_scan();
            return Some(frame);
        }

        self.skip_leading_blank_lines();

        let newline = self.find_first_newline()?;
        if !self.buf[..newline].starts_with(DATA_PREFIX) {
            return None;
        }
        let frame = self.buf.split_to(newline).freeze();
        self.buf.advance(1);
        self.reset_scan();
        Some(frame)
    }

    /// Flush whatever is left as one final frame.
    ///
    /// Called once when the source reports end-of-stream. The buffer is empty
    /// afterwards regardless of the result.
    pub fn drain(&mut self) -> Option<Bytes> {
        self.reset_scan();
        if self.buf.is_empty() {
            return None;
        }
        Some(self.buf.split().freeze())
    }

    /// Locate the blank-line terminator, resuming from the last search.
    fn find_terminator(&mut self) -> Option<usize> {
        // One byte of overlap: the first `\n` of the pair may be the last
        // byte of the previous search window.
        let start = self.scanned.saturating_sub(RECORD_TERMINATOR.len() - 1);
        let found = self.buf[start..]
            .windows(RECORD_TERMINATOR.len())
            .position(|w| w == RECORD_TERMINATOR)
            .map(|pos| start + pos);
        if found.is_none() {
            self.scanned = self.buf.len();
        }
        found
    }

    /// Locate the first `\n`, skipping the prefix known to hold none.
    fn find_first_newline(&mut self) -> Option<usize> {
        let start = self.line_scanned;
        match self.buf[start..].iter().position(|&b| b == b'\n') {
            Some(pos) => {
                self.line_scanned = start + pos;
                Some(start + pos)
            }
            None => {
                self.line_scanned = self.buf.len();
                None
            }
        }
    }

    fn reset_scan(&mut self) {
        self.scanned = 0;
        self.line_scanned = 0;
    }

    /// Drop empty (or lone `\r`) lines sitting at the front of the buffer.
    ///
    /// They can only ever form empty frames, and leaving them in place would
    /// hide a compact `data:` line queued behind them.
    fn skip_leading_blank_lines(&mut self) {
        loop {
            let skip = match self.buf.as_ref() {
                [b'\n', ..] => 1,
                [b'\r', b'\n', ..] => 2,
                _ => break,
            };
            self.buf.advance(skip);
            self.scanned = self.scanned.saturating_sub(skip);
            self.line_scanned = self.line_scanned.saturating_sub(skip);
        }
    }
}
