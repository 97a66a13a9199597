//! `reqwest`-backed implementation of [`PlatformTransport`].
//!
//! One [`HttpPlatform`] per backend; the underlying `reqwest::Client`
//! pools connections, so clones of a client may be shared across several
//! transports if an embedding talks to more than one host.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use astrovault_core::payload::SubmissionPayload;

use crate::auth::CredentialStore;
use crate::config::PlatformConfig;
use crate::error::PlatformError;
use crate::transport::PlatformTransport;

/// HTTP client for the platform REST API.
pub struct HttpPlatform {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpPlatform {
    /// Create a client for the API at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across transports).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Create a client from configuration, applying the configured
    /// request timeout.
    pub fn from_config(
        config: &PlatformConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config.base_url.clone(), credentials))
    }

    /// Base URL of the API this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn bearer(&self) -> Result<String, PlatformError> {
        self.credentials
            .bearer_token()
            .await
            .ok_or(PlatformError::Auth)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, PlatformError> {
        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;
        ensure_success(response).await
    }
}

#[async_trait]
impl PlatformTransport for HttpPlatform {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, PlatformError> {
        let token = self.bearer().await?;
        let request = self.client.get(self.url(path)).query(query).bearer_auth(token);
        parse_json(self.send(request).await?).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, PlatformError> {
        let token = self.bearer().await?;
        let request = self.client.post(self.url(path)).json(body).bearer_auth(token);
        parse_json(self.send(request).await?).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, PlatformError> {
        let token = self.bearer().await?;
        let request = self.client.put(self.url(path)).json(body).bearer_auth(token);
        parse_json(self.send(request).await?).await
    }

    async fn delete(&self, path: &str) -> Result<(), PlatformError> {
        let token = self.bearer().await?;
        let request = self.client.delete(self.url(path)).bearer_auth(token);
        self.send(request).await?;
        Ok(())
    }

    async fn upload(&self, path: &str, payload: &SubmissionPayload) -> Result<(), PlatformError> {
        let token = self.bearer().await?;

        let mut form = reqwest::multipart::Form::new();
        for part in &payload.files {
            let file_part = reqwest::multipart::Part::bytes(part.file.bytes.clone())
                .file_name(part.file.file_name.clone())
                .mime_str(&part.file.content_type)
                .map_err(|e| {
                    PlatformError::Network(format!(
                        "Invalid content type \"{}\": {e}",
                        part.file.content_type
                    ))
                })?;
            form = form.part(part.key.clone(), file_part);
        }
        for (key, value) in &payload.fields {
            form = form.text(key.clone(), value.clone());
        }

        tracing::debug!(
            path,
            file_parts = payload.files.len(),
            field_parts = payload.fields.len(),
            "Uploading multipart submission",
        );

        let request = self
            .client
            .post(self.url(path))
            .multipart(form)
            .bearer_auth(token);
        self.send(request).await?;
        Ok(())
    }
}

/// Ensure the response has a success status code. On failure, decode the
/// backend's `{error: string}` body (or fall back to a generic message)
/// into a [`PlatformError::Server`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PlatformError::Server {
            status: status.as_u16(),
            message: server_error_message(status.as_u16(), &body),
        });
    }
    Ok(response)
}

/// Parse a successful response body as JSON.
async fn parse_json(response: reqwest::Response) -> Result<Value, PlatformError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| PlatformError::Network(e.to_string()))
}

/// The user-facing message for a failed response: the backend's reported
/// `error` string unchanged, or a generic fallback when the body is
/// absent or unparseable.
fn server_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
