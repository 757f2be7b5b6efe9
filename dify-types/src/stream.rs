//! Typed payloads of streaming events.
//!
//! The event parser hands out `(kind, payload)` string pairs. This module
//! gives them meaning:
//!
//! ```text
//! message            -> StreamPayload::Message        (answer delta)
//! message_end        -> StreamPayload::MessageEnd     (usage, citations)
//! workflow_started   -> StreamPayload::WorkflowStarted
//! node_started       -> StreamPayload::NodeStarted
//! node_finished      -> StreamPayload::NodeFinished
//! workflow_finished  -> StreamPayload::WorkflowFinished
//! error              -> StreamPayload::Error
//! ping               -> StreamPayload::Ping
//! ```
//!
//! Kinds not listed are preserved as [`StreamPayload::Other`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, DifyError};
use crate::types::{Inputs, Metadata, WorkflowData};

/// Incremental answer text (`message` and `agent_message`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    pub task_id: String,
    pub message_id: String,
    pub conversation_id: String,
    /// The text fragment carried by this event.
    pub answer: String,
    pub created_at: i64,
}

/// End of an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEndEvent {
    pub task_id: String,
    pub message_id: String,
    pub conversation_id: String,
    pub metadata: Metadata,
}

/// A workflow run began.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowStartedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: WorkflowStartedData,
}

/// Details of a started workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowStartedData {
    pub id: String,
    pub workflow_id: String,
    pub sequence_number: u64,
    pub created_at: i64,
}

/// A workflow node began executing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStartedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: NodeStartedData,
}

/// Details of a started node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStartedData {
    pub id: String,
    pub node_id: String,
    pub node_type: String,
    pub title: String,
    pub index: u32,
    pub predecessor_node_id: Option<String>,
    pub inputs: Inputs,
    pub created_at: i64,
}

/// A workflow node finished executing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFinishedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: NodeFinishedData,
}

/// Details of a finished node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFinishedData {
    pub id: String,
    pub node_id: String,
    pub node_type: String,
    pub title: String,
    pub index: u32,
    pub predecessor_node_id: Option<String>,
    pub inputs: Inputs,
    pub process_data: Option<Inputs>,
    pub outputs: Option<Inputs>,
    pub status: String,
    pub error: Option<String>,
    pub elapsed_time: f64,
    pub execution_metadata: Option<Inputs>,
    pub created_at: i64,
}

/// A workflow run finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowFinishedEvent {
    pub task_id: String,
    pub workflow_run_id: String,
    pub data: WorkflowData,
}

/// The server aborted the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorEvent {
    pub task_id: String,
    pub message_id: Option<String>,
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl From<ErrorEvent> for ApiError {
    fn from(event: ErrorEvent) -> Self {
        Self {
            status_code: event.status,
            code: event.code,
            message: event.message,
            status: event.status,
        }
    }
}

/// A decoded streaming event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPayload {
    /// Answer text delta (`message`, `agent_message`).
    Message(MessageEvent),
    /// The answer is complete.
    MessageEnd(MessageEndEvent),
    /// A workflow run started.
    WorkflowStarted(WorkflowStartedEvent),
    /// A workflow node started.
    NodeStarted(NodeStartedEvent),
    /// A workflow node finished.
    NodeFinished(NodeFinishedEvent),
    /// A workflow run finished.
    WorkflowFinished(WorkflowFinishedEvent),
    /// The server reported an error inside the stream.
    Error(ErrorEvent),
    /// Keep-alive.
    Ping,
    /// Any kind this crate does not model.
    Other {
        /// The event kind label (may be empty).
        kind: String,
        /// Payload as JSON; non-JSON payloads are kept as a JSON string.
        data: serde_json::Value,
    },
}

impl StreamPayload {
    /// Decode the payload of an event of the given kind.
    ///
    /// # Errors
    ///
    /// [`DifyError::InvalidResponse`] when a known kind carries a payload that
    /// does not match its shape. Unknown kinds never fail.
    pub fn decode(kind: &str, payload: &str) -> Result<Self, DifyError> {
        let decoded = match kind {
            "message" | "agent_message" => Self::Message(parse(kind, payload)?),
            "message_end" => Self::MessageEnd(parse(kind, payload)?),
            "workflow_started" => Self::WorkflowStarted(parse(kind, payload)?),
            "node_started" => Self::NodeStarted(parse(kind, payload)?),
            "node_finished" => Self::NodeFinished(parse(kind, payload)?),
            "workflow_finished" => Self::WorkflowFinished(parse(kind, payload)?),
            "error" => Self::Error(parse(kind, payload)?),
            "ping" => Self::Ping,
            _ => Self::Other {
                kind: kind.to_string(),
                data: serde_json::from_str(payload)
                    .unwrap_or_else(|_| serde_json::Value::String(payload.to_string())),
            },
        };
        Ok(decoded)
    }

    /// The answer text carried by a message delta.
    #[must_use]
    pub fn answer_delta(&self) -> Option<&str> {
        match self {
            Self::Message(msg) => Some(msg.answer.as_str()),
            _ => None,
        }
    }

    /// Whether no further meaningful events follow this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::MessageEnd(_) | Self::WorkflowFinished(_) | Self::Error(_)
        )
    }
}

fn parse<T: DeserializeOwned>(kind: &str, payload: &str) -> Result<T, DifyError> {
    serde_json::from_str(payload)
        .map_err(|e| DifyError::InvalidResponse(format!("invalid {kind} event payload: {e}")))
}
