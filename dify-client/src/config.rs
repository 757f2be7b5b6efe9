//! Client configuration.

use std::time::Duration;

use dify_types::{DEFAULT_USER, DifyError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Base URL of Dify cloud, used by [`ClientConfig::from_env`] when
/// `DIFY_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

/// Connection settings for a Dify app.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use dify_client::ClientConfig;
///
/// let config = ClientConfig::new("app-key", "https://dify.internal/v1/")
///     .timeout(Duration::from_secs(30))
///     .default_user("svc-reporting");
/// assert_eq!(config.base_url, "https://dify.internal/v1/");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// App API key, sent as a bearer token.
    pub api_key: String,
    /// API root, e.g. `https://api.dify.ai/v1`. A trailing `/` is ignored.
    pub base_url: String,
    /// Per-request timeout. `None` or zero means [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Accept invalid TLS certificates (self-hosted instances only).
    pub skip_tls_verify: bool,
    /// User identifier sent when a call does not name one.
    pub default_user: Option<String>,
}

impl ClientConfig {
    /// Create a config for the given key and base URL.
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
            skip_tls_verify: false,
            default_user: None,
        }
    }

    /// Read the config from `DIFY_API_KEY`, `DIFY_BASE_URL`,
    /// `DIFY_TIMEOUT_SECS`, and `DIFY_SKIP_TLS_VERIFY`.
    ///
    /// # Errors
    ///
    /// [`DifyError::Config`] when `DIFY_API_KEY` is missing or a variable
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, DifyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DifyError> {
        let api_key = lookup("DIFY_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DifyError::Config("DIFY_API_KEY is not set".into()))?;
        let base_url = lookup("DIFY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let mut config = Self::new(api_key, base_url);

        if let Some(secs) = lookup("DIFY_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DifyError::Config(format!("DIFY_TIMEOUT_SECS is not a number: {secs:?}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(flag) = lookup("DIFY_SKIP_TLS_VERIFY") {
            config.skip_tls_verify = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "" | "0" | "false" | "no" => false,
                _ => {
                    return Err(DifyError::Config(format!(
                        "DIFY_SKIP_TLS_VERIFY is not a boolean: {flag:?}"
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Override the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept invalid TLS certificates.
    #[must_use]
    pub fn skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    /// Override the user sent when a call does not name one.
    #[must_use]
    pub fn default_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = Some(user.into());
        self
    }

    /// Trimmed, checked copy of this config.
    pub(crate) fn normalized(&self) -> Result<Self, DifyError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(DifyError::Config("api key is required".into()));
        }

        let base_url = self.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(DifyError::Config("base url is required".into()));
        }
        reqwest::Url::parse(base_url)
            .map_err(|e| DifyError::Config(format!("invalid base url {base_url:?}: {e}")))?;

        let default_user = self
            .default_user
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .unwrap_or(DEFAULT_USER);

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            timeout: Some(self.effective_timeout()),
            skip_tls_verify: self.skip_tls_verify,
            default_user: Some(default_user.to_string()),
        })
    }

    /// The timeout that will actually be applied.
    #[must_use]
    pub fn effective_timeout(&self) -> Duration {
        self.timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("default_user", &self.default_user)
            .finish()
    }
}
