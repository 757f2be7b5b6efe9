#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod cursor;
pub mod error;
pub mod event;
pub mod frame;
pub mod record;
pub mod source;

pub use cursor::{EventStream, READ_CHUNK_SIZE, StreamState};
pub use error::StreamError;
pub use event::Event;
pub use frame::FrameBuffer;
pub use record::parse_frame;
pub use source::{ByteSource, ReaderSource, ResponseSource};
