//! Event record parser.
//!
//! Turns one frame into an [`Event`]. Only `event:` and `data:` lines are
//! understood; every other line is ignored. Repeated fields are not folded:
//! the last `event:` line and the last `data:` line of a frame win.

use crate::event::Event;

const EVENT_FIELD: &[u8] = b"event:";
const DATA_FIELD: &[u8] = b"data:";

/// Decode one frame into an [`Event`].
///
/// Returns `None` for frames that carry neither a kind nor a payload, such as
/// empty records or comment-only records. When no `event:` line is present
/// the kind is taken from the `event` field of a JSON object payload, if any.
/// A payload that is not such an object is kept as-is with an empty kind.
pub fn parse_frame(frame: &[u8]) -> Option<Event> {
    let mut event = Event::default();

    for line in frame.split(|&b| b == b'\n') {
        if let Some(value) = line.strip_prefix(EVENT_FIELD) {
            event.kind = field_value(value);
        } else if let Some(value) = line.strip_prefix(DATA_FIELD) {
            event.payload = field_value(value);
        }
    }

    if event.kind.is_empty() && !event.payload.is_empty() {
        if let Some(kind) = embedded_kind(&event.payload) {
            event.kind = kind;
        }
    }

    if event.is_empty() {
        tracing::trace!(len = frame.len(), "discarding empty frame");
        return None;
    }
    Some(event)
}

fn field_value(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}

/// Read the `event` field of a JSON object payload.
///
/// An exact `event` key is preferred; otherwise the key is matched ignoring
/// ASCII case, so `{"Event":"tick"}` also names its kind.
fn embedded_kind(payload: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(payload).ok()?;
    let object = json.as_object()?;
    let value = object.get("event").or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("event"))
            .map(|(_, value)| value)
    })?;
    value
        .as_str()
        .filter(|kind| !kind.is_empty())
        .map(str::to_string)
}
