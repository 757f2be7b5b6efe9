//! Shared HTTP transport for every Dify app client.

use std::time::Duration;

use bytes::Bytes;
use dify_types::{AppMetaResponse, AppParametersResponse, DifyError};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::map_reqwest_error;
use crate::streaming::EventReader;

/// Low-level Dify API client.
///
/// Owns the connection pool, credentials, and defaults. The app clients
/// ([`ChatClient`](crate::ChatClient), [`CompletionClient`](crate::CompletionClient),
/// [`WorkflowClient`](crate::WorkflowClient)) wrap one and expose it through
/// `client()` for the endpoints shared by every app type: parameters, meta,
/// file upload, and audio.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    /// Bearer token.
    pub(crate) api_key: String,
    /// API root without a trailing `/`.
    pub(crate) base_url: String,
    /// Applied to every request, including streaming body reads.
    pub(crate) timeout: Duration,
    /// User sent when a call passes an empty one.
    pub(crate) default_user: String,
    /// Shared HTTP client.
    pub(crate) http: reqwest::Client,
}

impl Client {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// [`DifyError::Config`] when the key or base URL is missing or invalid,
    /// or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, DifyError> {
        let config = config.normalized()?;
        let timeout = config.effective_timeout();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .build()
            .map_err(|e| DifyError::Config(format!("failed to build http client: {e}")))?;

        tracing::debug!(
            base_url = %config.base_url,
            timeout = ?timeout,
            skip_tls_verify = config.skip_tls_verify,
            "created dify client"
        );

        Ok(Self {
            api_key: config.api_key,
            base_url: config.base_url,
            timeout,
            default_user: config.default_user.unwrap_or_default(),
            http,
        })
    }

    /// API root, without a trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout in effect.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// User sent when a call does not name one.
    #[must_use]
    pub fn default_user(&self) -> &str {
        &self.default_user
    }

    /// Input form, feature toggles, and upload limits of the app.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn parameters(&self, user: &str) -> Result<AppParametersResponse, DifyError> {
        let request = self
            .request(Method::GET, "/parameters")
            .query(&[("user", self.user_or_default(user))]);
        self.execute_json(request).await
    }

    /// Tool icons used by the app.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn meta(&self, user: &str) -> Result<AppMetaResponse, DifyError> {
        let request = self
            .request(Method::GET, "/meta")
            .query(&[("user", self.user_or_default(user))]);
        self.execute_json(request).await
    }

    // ─── Transport ───────────────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn user_or_default(&self, user: &str) -> String {
        let user = user.trim();
        if user.is_empty() {
            self.default_user.clone()
        } else {
            user.to_string()
        }
    }

    /// Start an authenticated request to `path` (relative to the base URL).
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.api_key)
    }

    /// Send `request`, turning any non-2xx answer into an error.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response, DifyError> {
        let request = request
            .build()
            .map_err(|e| DifyError::Config(format!("invalid request: {e}")))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "sending request to Dify");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(
                        status = status.as_u16(),
                        error = %e,
                        "failed to read error response body"
                    );
                    Bytes::new()
                }
            };
            tracing::debug!(status = status.as_u16(), "dify request failed");
            return Err(DifyError::from_response(status.as_u16(), &body));
        }

        Ok(response)
    }

    /// Send `request` and decode the JSON body.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DifyError> {
        let response = self.execute(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        serde_json::from_slice(&body)
            .map_err(|e| DifyError::InvalidResponse(format!("invalid JSON response: {e}")))
    }

    /// Send `request` and ignore the body of a successful answer.
    pub(crate) async fn execute_empty(&self, request: RequestBuilder) -> Result<(), DifyError> {
        self.execute(request).await.map(drop)
    }

    /// Send `request` and hand the body to an [`EventReader`].
    ///
    /// A non-2xx answer is returned as an error; no reader is created for it.
    pub(crate) async fn execute_stream(
        &self,
        request: RequestBuilder,
    ) -> Result<EventReader, DifyError> {
        let response = self
            .execute(request.header(reqwest::header::ACCEPT, "text/event-stream"))
            .await?;
        Ok(EventReader::new(response, self.timeout))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_user", &self.default_user)
            .finish_non_exhaustive()
    }
}
