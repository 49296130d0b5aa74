//! Async REST client for the remote platform.
//!
//! Wraps `reqwest` with request signing, per-request timeouts, and
//! bounded retries with exponential backoff. Client errors (4xx) are
//! never retried; transient failures are.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use floodmap_core::{Expr, VisParams};

use crate::auth::RequestAuth;
use crate::error::{PlatformError, Result};
use crate::models::{api_error, ComputeValueRequest, CreateMapRequest, MapResponse, ValueResponse};

/// Environment variable holding the platform project identifier.
pub const PROJECT_ENV_VAR: &str = "EARTHENGINE_PROJECT";

/// Default REST endpoint of the platform.
pub const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`PlatformClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// REST endpoint base URL (default [`DEFAULT_BASE_URL`]).
    pub base_url: String,
    /// Project the computation is billed to.
    pub project: String,
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
}

impl ClientOptions {
    /// Set the base URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set the project identifier.
    pub fn project(mut self, project: &str) -> Self {
        self.project = project.to_string();
        self
    }

    /// Default options, with the project overridden from
    /// [`PROJECT_ENV_VAR`] when set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(project) = std::env::var(PROJECT_ENV_VAR) {
            if !project.is_empty() {
                options.project = project;
            }
        }
        options
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: "earthengine-legacy".to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Async client for the platform's expression and map endpoints.
pub struct PlatformClient {
    client: reqwest::Client,
    auth: Box<dyn RequestAuth>,
    options: ClientOptions,
}

impl PlatformClient {
    /// Create a new client.
    pub fn new(auth: Box<dyn RequestAuth>, options: ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| PlatformError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            auth,
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Verify the session by hitting the capability endpoint.
    pub async fn ping(&self) -> Result<()> {
        let url = self.capabilities_url();
        self.execute(self.client.get(&url), &url, "GET").await?;
        Ok(())
    }

    /// Force an expression to a concrete value.
    pub async fn compute_value(&self, expression: &Expr) -> Result<Value> {
        let url = self.value_compute_url();
        let body = ComputeValueRequest { expression };
        let raw = self.post_json(&url, &body).await?;
        let resp: ValueResponse = serde_json::from_str(&raw)
            .map_err(|e| PlatformError::Decode(format!("parsing compute response: {e}")))?;
        Ok(resp.result)
    }

    /// Create a server-side map for an image expression.
    pub async fn create_map(
        &self,
        expression: &Expr,
        visualization: Option<&VisParams>,
    ) -> Result<MapResponse> {
        let url = self.maps_url();
        let body = CreateMapRequest {
            expression,
            visualization,
        };
        let raw = self.post_json(&url, &body).await?;
        serde_json::from_str(&raw)
            .map_err(|e| PlatformError::Decode(format!("parsing map response: {e}")))
    }

    // ── Endpoint URLs ───────────────────────────────────────────────

    fn base(&self) -> &str {
        self.options.base_url.trim_end_matches('/')
    }

    fn capabilities_url(&self) -> String {
        format!("{}/v1/capabilities", self.base())
    }

    fn value_compute_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/value:compute",
            self.base(),
            self.options.project
        )
    }

    fn maps_url(&self) -> String {
        format!("{}/v1/projects/{}/maps", self.base(), self.options.project)
    }

    // ── Private helpers ─────────────────────────────────────────────

    async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<String> {
        let req = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        self.execute(req, url, "POST").await
    }

    /// Execute a request with exponential backoff retry, returning the
    /// response body on success.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        method: &str,
    ) -> Result<String> {
        let mut auth_headers = Vec::new();
        self.auth.sign_request(url, method, &mut auth_headers)?;

        let mut last_err = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s, 2s, ...
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(url, attempt, "retrying platform request");
                tokio::time::sleep(delay).await;
            }

            let mut req = match request.try_clone() {
                Some(cloned) => cloned,
                None => return Err(PlatformError::Network("request is not retryable".into())),
            };
            for (key, value) in &auth_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            debug!(url, method, "platform request");
            match req.send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .text()
                        .await
                        .map_err(|e| PlatformError::Network(format!("reading response body: {e}")));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    last_err = Some(api_error(status, &body));
                    // Don't retry client errors (4xx).
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_err = Some(PlatformError::Network(format!("request failed: {e}")));
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| PlatformError::Network(format!("request to {} failed", url))))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
