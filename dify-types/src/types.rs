//! Request and response bodies for the Dify app APIs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// User identifier sent when the caller does not supply one.
pub const DEFAULT_USER: &str = "dify-rust-sdk";

/// App input variables, keyed by variable name.
pub type Inputs = HashMap<String, serde_json::Value>;

/// How the server should deliver the answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Wait for the full answer in one JSON body.
    #[default]
    Blocking,
    /// Receive the answer as a stream of events.
    Streaming,
}

// ─── Common ──────────────────────────────────────────────────────────────────

/// Token usage and pricing for one answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub prompt_unit_price: String,
    pub prompt_price_unit: String,
    pub prompt_price: String,
    pub completion_tokens: u64,
    pub completion_unit_price: String,
    pub completion_price_unit: String,
    pub completion_price: String,
    pub total_tokens: u64,
    pub total_price: String,
    pub currency: String,
    /// Seconds spent producing the answer.
    pub latency: f64,
}

/// A knowledge-base segment cited by an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverResource {
    pub position: u32,
    pub dataset_id: String,
    pub dataset_name: String,
    pub document_id: String,
    pub document_name: String,
    pub segment_id: String,
    pub score: f64,
    pub content: String,
}

/// Metadata attached to an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub usage: Usage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retriever_resources: Vec<RetrieverResource>,
}

/// A file passed to an app, either by URL or by a prior upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInput {
    /// File type, e.g. `image`.
    #[serde(rename = "type")]
    pub file_type: String,
    /// `remote_url` or `local_file`.
    pub transfer_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_file_id: Option<String>,
}

impl FileInput {
    /// Reference a file by public URL.
    pub fn remote_url(file_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
            transfer_method: "remote_url".into(),
            url: Some(url.into()),
            upload_file_id: None,
        }
    }

    /// Reference a file returned by an earlier upload.
    pub fn local_file(file_type: impl Into<String>, upload_file_id: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
            transfer_method: "local_file".into(),
            url: None,
            upload_file_id: Some(upload_file_id.into()),
        }
    }
}

// ─── Chat ────────────────────────────────────────────────────────────────────

/// Body of `POST /chat-messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub inputs: Inputs,
    /// Overwritten by the client method that sends the request.
    #[serde(default)]
    pub response_mode: ResponseMode,
    /// Falls back to the client's default user when empty.
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_generate_name: Option<bool>,
}

impl ChatRequest {
    /// Start a request for the given user query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the end-user identifier.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Continue an existing conversation.
    #[must_use]
    pub fn conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// Set one app input variable.
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Attach a file.
    #[must_use]
    pub fn file(mut self, file: FileInput) -> Self {
        self.files.push(file);
        self
    }
}

/// Blocking-mode answer from `POST /chat-messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatResponse {
    pub message_id: String,
    pub conversation_id: String,
    pub mode: String,
    pub answer: String,
    pub metadata: Metadata,
    pub created_at: i64,
}

/// A conversation as listed by `GET /conversations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub inputs: Inputs,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Page of conversations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationListResponse {
    pub data: Vec<Conversation>,
    pub has_more: bool,
    pub limit: u32,
}

/// A message from the conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub inputs: Inputs,
    pub query: String,
    pub answer: String,
    pub message_files: Vec<MessageFile>,
    pub feedback: Option<Feedback>,
    pub retriever_resources: Vec<RetrieverResource>,
    pub created_at: i64,
}

/// A file attached to a history message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageFile {
    pub id: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub url: String,
    /// `user` or `assistant`.
    pub belongs_to: String,
}

/// Page of history messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageListResponse {
    pub data: Vec<Message>,
    pub has_more: bool,
    pub limit: u32,
}

/// Feedback recorded on a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feedback {
    /// `like`, `dislike`, or empty to revoke.
    pub rating: String,
}

/// Body of `POST /messages/{id}/feedbacks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// `like`, `dislike`, or `null` (sent as empty) to revoke.
    pub rating: String,
    #[serde(default)]
    pub user: String,
}

/// Generic `{"result": "success"}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackResponse {
    pub result: String,
}

/// Body of `POST /conversations/{id}/name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_generate: Option<bool>,
    #[serde(default)]
    pub user: String,
}

/// The renamed conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameResponse {
    pub id: String,
    pub name: String,
    pub inputs: Inputs,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Suggested follow-up questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedResponse {
    pub result: String,
    pub data: Vec<String>,
}

// ─── Completion ──────────────────────────────────────────────────────────────

/// Body of `POST /completion-messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub inputs: Inputs,
    /// Overwritten by the client method that sends the request.
    #[serde(default)]
    pub response_mode: ResponseMode,
    /// Falls back to the client's default user when empty.
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileInput>,
}

impl CompletionRequest {
    /// Start an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one app input variable.
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Set the end-user identifier.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Attach a file.
    #[must_use]
    pub fn file(mut self, file: FileInput) -> Self {
        self.files.push(file);
        self
    }
}

/// Blocking-mode answer from `POST /completion-messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionResponse {
    pub message_id: String,
    pub mode: String,
    pub answer: String,
    pub metadata: Metadata,
    pub created_at: i64,
}

// ─── Workflow ────────────────────────────────────────────────────────────────

/// Body of `POST /workflows/run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    #[serde(default)]
    pub inputs: Inputs,
    /// Overwritten by the client method that sends the request.
    #[serde(default)]
    pub response_mode: ResponseMode,
    /// Falls back to the client's default user when empty.
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileInput>,
}

impl WorkflowRequest {
    /// Start an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one workflow input variable.
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Set the end-user identifier.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Attach a file.
    #[must_use]
    pub fn file(mut self, file: FileInput) -> Self {
        self.files.push(file);
        self
    }
}

/// Blocking-mode answer from `POST /workflows/run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowResponse {
    pub workflow_run_id: String,
    pub task_id: String,
    pub data: WorkflowData,
}

/// Outcome of one workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowData {
    pub id: String,
    pub workflow_id: String,
    /// `running`, `succeeded`, `failed`, or `stopped`.
    pub status: String,
    pub outputs: Inputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_time: f64,
    pub total_tokens: u64,
    pub total_steps: u32,
    pub created_at: i64,
    pub finished_at: i64,
}

/// Body of `GET /workflows/run/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRunResponse {
    pub id: String,
    pub workflow_id: String,
    pub status: String,
    pub inputs: Inputs,
    pub outputs: Inputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_steps: u32,
    pub total_tokens: u64,
    pub created_at: i64,
    pub finished_at: i64,
    pub elapsed_time: f64,
}

// ─── Shared endpoints ────────────────────────────────────────────────────────

/// Body of `POST /files/upload` responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUploadResponse {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub extension: String,
    pub mime_type: String,
    pub created_by: String,
    pub created_at: i64,
}

/// App settings from `GET /parameters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppParametersResponse {
    pub opening_statement: String,
    pub suggested_questions: Vec<String>,
    pub suggested_questions_after_answer: Toggle,
    pub speech_to_text: Toggle,
    pub text_to_speech: TextToSpeechConfig,
    pub retriever_resource: Toggle,
    pub annotation_reply: Toggle,
    pub user_input_form: Vec<UserInputFormItem>,
    pub file_upload: FileUploadConfig,
    pub system_parameters: SystemParamsConfig,
}

/// An app feature that can only be switched on or off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggle {
    pub enabled: bool,
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextToSpeechConfig {
    pub enabled: bool,
    pub voice: String,
    pub language: String,
}

/// One form control, keyed by its control type (`text-input`, `select`, ...).
pub type UserInputFormItem = HashMap<String, FormItemConfig>;

/// Settings of one form control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormItemConfig {
    pub label: String,
    pub variable: String,
    pub required: bool,
    pub default: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// File upload settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUploadConfig {
    pub image: ImageUploadConfig,
}

/// Image upload settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageUploadConfig {
    pub enabled: bool,
    pub number_limits: u32,
    pub transfer_methods: Vec<String>,
}

/// Upload size limits, in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemParamsConfig {
    pub file_size_limit: u32,
    pub image_file_size_limit: u32,
    pub audio_file_size_limit: u32,
    pub video_file_size_limit: u32,
}

/// Body of `GET /meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetaResponse {
    pub tool_icons: HashMap<String, serde_json::Value>,
}

/// Body of the stop endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    pub user: String,
}

/// Acknowledgement from the stop endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopResponse {
    pub result: String,
}

/// Body of `POST /audio-to-text` responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioToTextResponse {
    pub text: String,
}
