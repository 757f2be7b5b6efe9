//! Client for text generation (completion) apps.

use dify_types::{
    AppMetaResponse, AppParametersResponse, CompletionRequest, CompletionResponse, DifyError,
    FeedbackRequest, FeedbackResponse, ResponseMode, StopRequest, StopResponse,
};
use reqwest::Method;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::streaming::EventReader;

/// Client for a completion app (`/completion-messages`).
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
}

impl CompletionClient {
    /// Build a completion client from `config`.
    ///
    /// # Errors
    ///
    /// [`DifyError::Config`] when the config is invalid.
    pub fn new(config: ClientConfig) -> Result<Self, DifyError> {
        Client::new(config).map(Self::from_client)
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// The shared client, for file and audio endpoints.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Generate text and wait for the full answer.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn send_message(
        &self,
        mut request: CompletionRequest,
    ) -> Result<CompletionResponse, DifyError> {
        request.response_mode = ResponseMode::Blocking;
        request.user = self.client.user_or_default(&request.user);
        let request = self
            .client
            .request(Method::POST, "/completion-messages")
            .json(&request);
        self.client.execute_json(request).await
    }

    /// Generate text and stream it as it is produced.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request. A non-2xx answer never yields a
    /// reader.
    pub async fn send_message_stream(
        &self,
        mut request: CompletionRequest,
    ) -> Result<EventReader, DifyError> {
        request.response_mode = ResponseMode::Streaming;
        request.user = self.client.user_or_default(&request.user);
        let request = self
            .client
            .request(Method::POST, "/completion-messages")
            .json(&request);
        self.client.execute_stream(request).await
    }

    /// Stop a streaming generation by its task id.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn stop_message(&self, task_id: &str, user: &str) -> Result<StopResponse, DifyError> {
        let body = StopRequest {
            user: self.client.user_or_default(user),
        };
        let request = self
            .client
            .request(Method::POST, &format!("/completion-messages/{task_id}/stop"))
            .json(&body);
        self.client.execute_json(request).await
    }

    /// Rate a generated message.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn message_feedback(
        &self,
        message_id: &str,
        mut feedback: FeedbackRequest,
    ) -> Result<FeedbackResponse, DifyError> {
        feedback.user = self.client.user_or_default(&feedback.user);
        let request = self
            .client
            .request(Method::POST, &format!("/messages/{message_id}/feedbacks"))
            .json(&feedback);
        self.client.execute_json(request).await
    }

    /// See [`Client::parameters`].
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn parameters(&self, user: &str) -> Result<AppParametersResponse, DifyError> {
        self.client.parameters(user).await
    }

    /// See [`Client::meta`].
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn meta(&self, user: &str) -> Result<AppMetaResponse, DifyError> {
        self.client.meta(user).await
    }
}

impl AsRef<Client> for CompletionClient {
    fn as_ref(&self) -> &Client {
        &self.client
    }
}
