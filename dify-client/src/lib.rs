#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod chat;
pub mod client;
pub mod completion;
pub mod config;
mod error;
pub mod files;
pub mod streaming;
pub mod workflow;

pub use chat::{ChatClient, DEFAULT_PAGE_LIMIT};
pub use client::Client;
pub use completion::CompletionClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use files::AudioStream;
pub use streaming::EventReader;
pub use workflow::WorkflowClient;

pub use dify_sse::{Event, StreamError, StreamState};
pub use dify_types;
