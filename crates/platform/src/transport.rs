//! Transport abstraction over the platform REST API.
//!
//! The entity stores and the submission assembler talk to the backend
//! exclusively through [`PlatformTransport`], so the HTTP implementation
//! can be swapped for an in-memory fake in tests. Paths are relative to
//! the configured API base URL (`/locations`, `/upload-image`, ...).

use async_trait::async_trait;
use serde_json::Value;

use astrovault_core::payload::SubmissionPayload;

use crate::error::PlatformError;

/// Asynchronous, bearer-authenticated JSON + multipart transport.
///
/// Implementations attach the credential themselves and fail with
/// [`PlatformError::Auth`] before any I/O when none is available.
#[async_trait]
pub trait PlatformTransport: Send + Sync {
    /// `GET {path}` with optional query parameters; returns the JSON body.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, PlatformError>;

    /// `POST {path}` with a JSON body; returns the JSON response body.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PlatformError>;

    /// `PUT {path}` with a JSON body; returns the JSON response body.
    async fn put(&self, path: &str, body: &Value) -> Result<Value, PlatformError>;

    /// `DELETE {path}`; the response body is discarded.
    async fn delete(&self, path: &str) -> Result<(), PlatformError>;

    /// `POST {path}` as one atomic multipart request carrying the whole
    /// submission payload. There is no partial or staged upload.
    async fn upload(&self, path: &str, payload: &SubmissionPayload) -> Result<(), PlatformError>;
}
