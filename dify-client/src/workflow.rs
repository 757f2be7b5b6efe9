//! Client for workflow apps.

use dify_types::{
    AppMetaResponse, AppParametersResponse, DifyError, ResponseMode, StopRequest, StopResponse,
    WorkflowRequest, WorkflowResponse, WorkflowRunResponse,
};
use reqwest::Method;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::streaming::EventReader;

/// Client for a workflow app (`/workflows/...`).
///
/// A streamed run emits `workflow_started`, one `node_started` and
/// `node_finished` pair per node, then `workflow_finished`.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
}

impl WorkflowClient {
    /// Build a workflow client from `config`.
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

    /// Run the workflow and wait for its outputs.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn run(&self, mut request: WorkflowRequest) -> Result<WorkflowResponse, DifyError> {
        request.response_mode = ResponseMode::Blocking;
        request.user = self.client.user_or_default(&request.user);
        let request = self
            .client
            .request(Method::POST, "/workflows/run")
            .json(&request);
        self.client.execute_json(request).await
    }

    /// Run the workflow and stream its progress.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request. A non-2xx answer never yields a
    /// reader.
    pub async fn run_stream(&self, mut request: WorkflowRequest) -> Result<EventReader, DifyError> {
        request.response_mode = ResponseMode::Streaming;
        request.user = self.client.user_or_default(&request.user);
        let request = self
            .client
            .request(Method::POST, "/workflows/run")
            .json(&request);
        self.client.execute_stream(request).await
    }

    /// Stop a streaming run by its task id.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn stop(&self, task_id: &str, user: &str) -> Result<StopResponse, DifyError> {
        let body = StopRequest {
            user: self.client.user_or_default(user),
        };
        let request = self
            .client
            .request(Method::POST, &format!("/workflows/tasks/{task_id}/stop"))
            .json(&body);
        self.client.execute_json(request).await
    }

    /// Status and outputs of a past run.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn run_status(&self, workflow_run_id: &str) -> Result<WorkflowRunResponse, DifyError> {
        let request = self
            .client
            .request(Method::GET, &format!("/workflows/run/{workflow_run_id}"));
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

impl AsRef<Client> for WorkflowClient {
    fn as_ref(&self) -> &Client {
        &self.client
    }
}
