//! The decoded unit handed to stream consumers.

/// One event decoded from the wire.
///
/// The parser does not interpret either field. `kind` comes from an `event:`
/// line (or the `event` field of a JSON payload) and `payload` is the raw
/// value of the `data:` line. At least one of them is non-empty for every
/// event yielded by an [`EventStream`](crate::EventStream).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Event kind label, possibly empty.
    pub kind: String,
    /// Opaque payload string, possibly empty.
    pub payload: String,
}

impl Event {
    /// Create an event from a kind and a payload.
    pub fn new(kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Whether both kind and payload are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() && self.payload.is_empty()
    }
}
