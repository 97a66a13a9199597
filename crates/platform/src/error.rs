//! Error taxonomy for the platform REST client.
//!
//! Every failure a caller can see is one of three kinds: a missing or
//! invalid credential, a transport failure, or a backend-reported error.
//! All are recoverable by the user (sign in again, or retry the same
//! action); none are retried automatically.

/// A failed platform call.
///
/// `Display` renders the user-facing message: server messages pass
/// through unchanged, auth failures render as a sign-in prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// No credential is available or the backend rejected it.
    #[error("Please sign in again.")]
    Auth,

    /// The HTTP request itself failed (DNS, TCP, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },
}
