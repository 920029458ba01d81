// # HTTP Settings Backend
//
// This crate provides a Backend implementation that talks to a remote
// settings service over HTTP.
//
// ## Wire Protocol
//
// Every backend call is one `POST {base_url}/{call}` with a JSON body:
//
// | call | request body | response body |
// |---|---|---|
// | `get_all_settings` | `{}` | `{"key": "value", ...}` |
// | `set_config` | `{"key": k, "value": v}` | ignored (any 2xx, may be empty) |
// | `update_settings` | `{"settings": {...}}` | `{"success": bool}` |
// | `regenerate_uuid` | `{}` | `{"success": bool, "uuid": "..."}` |
// | `reset_settings` | `{"exclude": [...]}` | `{"success": bool}` |
// | `get_calculated_week_number` | `{}` | integer or `null` |
//
// ## Responsibilities
//
// - ✅ One HTTP request per backend call
// - ✅ HTTP timeout configured (30 seconds by default)
// - ✅ Specific error mapping for HTTP status codes (401/403, 404, 429, 5xx)
// - ❌ NO retry logic (callers decide)
// - ❌ NO caching (the mirror lives in `SettingsStore`)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - The bearer token NEVER appears in logs or `Debug` output

use async_trait::async_trait;
use cfgsync_core::config::BackendConfig;
use cfgsync_core::traits::{Backend, BackendFactory, BatchAck, RegeneratedId, SettingsMap};
use cfgsync_core::{BackendRegistry, Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Default HTTP timeout for backend requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const BACKEND_NAME: &str = "http";

/// HTTP settings backend
///
/// Stateless and single-shot: every method performs exactly one request
/// and maps the outcome to a [`Result`].
///
/// # Security
///
/// The Debug implementation does NOT expose the bearer token.
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,

    /// Optional bearer token
    /// ⚠️ NEVER log this value
    token: Option<String>,

    client: reqwest::Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl HttpBackend {
    /// Create a new HTTP backend
    ///
    /// # Parameters
    ///
    /// - `base_url`: Service root; calls are posted to `{base_url}/{call}`
    /// - `token`: Optional bearer token sent with every request
    /// - `timeout`: Per-request timeout
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: if `base_url` is empty
    /// - `Err(Error::Http)`: if the HTTP client cannot be built
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::config("HTTP backend URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token: token.filter(|t| !t.is_empty()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, call: &str) -> String {
        format!("{}/{}", self.base_url, call)
    }

    /// Send one backend call and check its status
    async fn send<B>(&self, call: &str, body: &B) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        tracing::debug!("Invoking {} on {}", call, self.base_url);

        let mut request = self.client.post(self.url(call)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(BACKEND_NAME, format!("{} request failed: {}", call, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status(call, status, &error_text));
        }

        Ok(response)
    }

    /// Perform one backend call and decode its JSON answer
    async fn invoke<B, R>(&self, call: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.send(call, body)
            .await?
            .json()
            .await
            .map_err(|e| Error::http(format!("Failed to parse {} response: {}", call, e)))
    }
}

/// Map a non-success HTTP status to an error
fn map_status(call: &str, status: reqwest::StatusCode, error_text: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::transport(
            BACKEND_NAME,
            format!(
                "Authentication failed: invalid token or insufficient permissions. Status: {}",
                status
            ),
        ),
        404 => Error::not_found(format!("Backend call not found: {}", call)),
        429 => Error::transport(
            BACKEND_NAME,
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::transport(
            BACKEND_NAME,
            format!("Settings service error (transient): {} - {}", status, error_text),
        ),
        _ => Error::transport(
            BACKEND_NAME,
            format!("{} failed: {} - {}", call, status, error_text),
        ),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_all_settings(&self) -> Result<SettingsMap> {
        self.invoke("get_all_settings", &json!({})).await
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        // Any 2xx counts, whatever the body
        self.send("set_config", &json!({ "key": key, "value": value }))
            .await?;
        Ok(())
    }

    async fn update_settings(&self, settings: &SettingsMap) -> Result<BatchAck> {
        self.invoke("update_settings", &json!({ "settings": settings }))
            .await
    }

    async fn regenerate_uuid(&self) -> Result<RegeneratedId> {
        self.invoke("regenerate_uuid", &json!({})).await
    }

    async fn reset_settings(&self, exclude: &[String]) -> Result<BatchAck> {
        self.invoke("reset_settings", &json!({ "exclude": exclude }))
            .await
    }

    async fn get_calculated_week_number(&self) -> Result<Option<u32>> {
        self.invoke("get_calculated_week_number", &json!({}))
            .await
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

/// Factory for creating HTTP backends
pub struct HttpBackendFactory;

#[async_trait]
impl BackendFactory for HttpBackendFactory {
    async fn create(&self, config: &BackendConfig) -> Result<Arc<dyn Backend>> {
        match config {
            BackendConfig::Http {
                base_url,
                token,
                timeout_secs,
            } => {
                config.validate()?;
                let backend = HttpBackend::new(
                    base_url.clone(),
                    token.clone(),
                    Duration::from_secs(*timeout_secs),
                )?;
                tracing::info!("HTTP backend configured for {}", backend.base_url());
                Ok(Arc::new(backend))
            }
            _ => Err(Error::config("Invalid config for HTTP backend")),
        }
    }
}

/// Register the HTTP backend with a registry
///
/// # Example
///
/// ```rust
/// use cfgsync_core::BackendRegistry;
///
/// let registry = BackendRegistry::with_builtin();
/// cfgsync_backend_http::register(&registry);
/// assert!(registry.has_backend("http"));
/// ```
pub fn register(registry: &BackendRegistry) {
    registry.register_backend(BACKEND_NAME, Box::new(HttpBackendFactory));
}
