//! Client for chat and agent apps.

use dify_types::{
    AppMetaResponse, AppParametersResponse, ChatRequest, ChatResponse, ConversationListResponse,
    DifyError, FeedbackRequest, FeedbackResponse, MessageListResponse, RenameRequest,
    RenameResponse, ResponseMode, StopRequest, StopResponse, SuggestedResponse,
};
use reqwest::Method;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::streaming::EventReader;

/// Page size used when a list call passes `None`.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Client for a chat app (`/chat-messages`, conversations, message history).
///
/// # Example
///
/// ```no_run
/// use dify_client::{ChatClient, ClientConfig};
/// use dify_types::ChatRequest;
///
/// # async fn run() -> Result<(), dify_types::DifyError> {
/// let chat = ChatClient::new(ClientConfig::from_env()?)?;
/// let answer = chat
///     .send_message(ChatRequest::new("What is Dify?").user("user-1"))
///     .await?;
/// println!("{}", answer.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
}

impl ChatClient {
    /// Build a chat client from `config`.
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

    /// Send a message and wait for the full answer.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn send_message(&self, mut request: ChatRequest) -> Result<ChatResponse, DifyError> {
        request.response_mode = ResponseMode::Blocking;
        request.user = self.client.user_or_default(&request.user);
        let request = self
            .client
            .request(Method::POST, "/chat-messages")
            .json(&request);
        self.client.execute_json(request).await
    }

    /// Send a message and stream the answer as it is generated.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request. A non-2xx answer never yields a
    /// reader.
    pub async fn send_message_stream(
        &self,
        mut request: ChatRequest,
    ) -> Result<EventReader, DifyError> {
        request.response_mode = ResponseMode::Streaming;
        request.user = self.client.user_or_default(&request.user);
        let request = self
            .client
            .request(Method::POST, "/chat-messages")
            .json(&request);
        self.client.execute_stream(request).await
    }

    /// Stop a streaming answer by its task id.
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
            .request(Method::POST, &format!("/chat-messages/{task_id}/stop"))
            .json(&body);
        self.client.execute_json(request).await
    }

    /// Rate a message.
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

    /// Suggested follow-up questions for a message.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn suggested_questions(
        &self,
        message_id: &str,
        user: &str,
    ) -> Result<SuggestedResponse, DifyError> {
        let request = self
            .client
            .request(Method::GET, &format!("/messages/{message_id}/suggested"))
            .query(&[("user", self.client.user_or_default(user))]);
        self.client.execute_json(request).await
    }

    /// Message history of a conversation, newest page first.
    ///
    /// `first_id` is the id of the oldest message already seen; `None`
    /// fetches the latest page.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn messages(
        &self,
        conversation_id: &str,
        user: &str,
        first_id: Option<&str>,
        limit: Option<u32>,
    ) -> Result<MessageListResponse, DifyError> {
        let mut query = vec![
            ("user", self.client.user_or_default(user)),
            ("conversation_id", conversation_id.to_string()),
            ("limit", limit.unwrap_or(DEFAULT_PAGE_LIMIT).to_string()),
        ];
        if let Some(first_id) = first_id.filter(|id| !id.is_empty()) {
            query.push(("first_id", first_id.to_string()));
        }
        let request = self.client.request(Method::GET, "/messages").query(&query);
        self.client.execute_json(request).await
    }

    /// Conversations of a user.
    ///
    /// `last_id` is the id of the last conversation already seen; `pinned`
    /// filters on the pinned flag when set.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn conversations(
        &self,
        user: &str,
        last_id: Option<&str>,
        limit: Option<u32>,
        pinned: Option<bool>,
    ) -> Result<ConversationListResponse, DifyError> {
        let mut query = vec![
            ("user", self.client.user_or_default(user)),
            ("limit", limit.unwrap_or(DEFAULT_PAGE_LIMIT).to_string()),
        ];
        if let Some(last_id) = last_id.filter(|id| !id.is_empty()) {
            query.push(("last_id", last_id.to_string()));
        }
        if let Some(pinned) = pinned {
            query.push(("pinned", pinned.to_string()));
        }
        let request = self
            .client
            .request(Method::GET, "/conversations")
            .query(&query);
        self.client.execute_json(request).await
    }

    /// Delete a conversation.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn delete_conversation(
        &self,
        conversation_id: &str,
        user: &str,
    ) -> Result<(), DifyError> {
        let body = serde_json::json!({ "user": self.client.user_or_default(user) });
        let request = self
            .client
            .request(Method::DELETE, &format!("/conversations/{conversation_id}"))
            .json(&body);
        self.client.execute_empty(request).await
    }

    /// Rename a conversation, or let the server generate a name.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn rename_conversation(
        &self,
        conversation_id: &str,
        mut rename: RenameRequest,
    ) -> Result<RenameResponse, DifyError> {
        rename.user = self.client.user_or_default(&rename.user);
        let request = self
            .client
            .request(Method::POST, &format!("/conversations/{conversation_id}/name"))
            .json(&rename);
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

impl AsRef<Client> for ChatClient {
    fn as_ref(&self) -> &Client {
        &self.client
    }
}
