//! Error types for all dify crates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error object returned by the Dify API on non-2xx responses.
///
/// ```text
/// {"code": "invalid_param", "message": "query is required", "status": 400}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("dify api error: status={status_code}, code={code}, message={message}")]
pub struct ApiError {
    /// HTTP status of the response that carried this error.
    #[serde(skip)]
    pub status_code: u16,
    /// Machine-readable error code (see [`codes`]).
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Status as reported inside the body.
    #[serde(default)]
    pub status: u16,
}

impl ApiError {
    /// Whether this error carries the given code.
    #[must_use]
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

/// Error codes the Dify API is known to return.
pub mod codes {
    /// No API key was sent.
    pub const NO_API_KEY: &str = "no_api_key";
    /// The API key is not valid.
    pub const INVALID_API_KEY: &str = "invalid_api_key";
    /// The app is disabled or its configuration is broken.
    pub const APP_UNAVAILABLE: &str = "app_unavailable";
    /// No model provider credentials are configured.
    pub const PROVIDER_NOT_INITIALIZE: &str = "provider_not_initialize";
    /// The model provider quota is used up.
    pub const PROVIDER_QUOTA_EXCEEDED: &str = "provider_quota_exceeded";
    /// The current model is not available.
    pub const MODEL_CURRENTLY_NOT_SUPPORT: &str = "model_currently_not_support";
    /// Text generation failed.
    pub const COMPLETION_REQUEST_ERROR: &str = "completion_request_error";
    /// The requested resource does not exist.
    pub const NOT_FOUND: &str = "not_found";
    /// The app is not a chat app.
    pub const NOT_CHAT_APP: &str = "not_chat_app";
    /// The app is not a completion app.
    pub const NOT_COMPLETION_APP: &str = "not_completion_app";
    /// The conversation has ended.
    pub const CONVERSATION_COMPLETED: &str = "conversation_completed";
    /// The referenced file does not exist.
    pub const FILE_NOT_FOUND: &str = "file_not_found";
    /// The uploaded file exceeds the size limit.
    pub const FILE_TOO_LARGE: &str = "file_too_large";
    /// The uploaded file type is not accepted.
    pub const UNSUPPORTED_FILE_TYPE: &str = "unsupported_file_type";
    /// Object storage is unreachable.
    pub const S3_CONNECTION_FAILED: &str = "s3_connection_failed";
    /// Object storage rejected the upload.
    pub const S3_PERMISSION_DENIED: &str = "s3_permission_denied";
    /// The file exceeds the object storage size limit.
    pub const S3_FILE_TOO_LARGE: &str = "s3_file_too_large";
}

/// Errors from Dify client operations.
#[derive(Debug, thiserror::Error)]
pub enum DifyError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // Errors reported by the server
    /// Structured error object from a non-2xx response.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Non-2xx response whose body was not an error object.
    #[error("http error: status={status}, body={body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    // Local errors
    /// Client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A 2xx response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Local I/O failure (reading an upload from disk, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The event stream failed or was used after close.
    #[error("stream error: {0}")]
    Stream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DifyError {
    /// Decode the body of a non-2xx response.
    ///
    /// A JSON object becomes [`DifyError::Api`]; anything else is kept raw in
    /// [`DifyError::Http`].
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let api_error = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .filter(serde_json::Value::is_object)
            .and_then(|json| serde_json::from_value::<ApiError>(json).ok());

        match api_error {
            Some(mut err) => {
                err.status_code = status;
                Self::Api(err)
            }
            None => Self::Http {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    /// HTTP status of the failed response, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status_code),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// API error code, if the server sent an error object.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api(err) => Some(err.code.as_str()),
            _ => None,
        }
    }

    /// Whether this error is likely transient and the request can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api(_) | Self::Http { .. } => {
                matches!(self.status(), Some(429 | 500..=599))
            }
            _ => false,
        }
    }
}
