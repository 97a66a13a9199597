//! Credential access and the memoized authenticated-user context.
//!
//! Token acquisition and storage are owned by the embedding application;
//! the engine only reads the current bearer token through
//! [`CredentialStore`]. The authenticated user's id is a cross-cutting
//! dependency of every entity store, so it is resolved once per
//! [`AuthContext`] lifetime and shared, never re-derived per component.

use async_trait::async_trait;
use tokio::sync::OnceCell;

use astrovault_core::types::DbId;

use crate::error::PlatformError;
use crate::transport::PlatformTransport;

/// Endpoint resolving the current credential to a user id.
pub const USER_ID_PATH: &str = "/user_id";

/// Read access to the current bearer credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The current bearer token, or `None` when signed out.
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed credential, for embeddings that manage tokens elsewhere and
/// for tests.
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentials {
    async fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Lazily resolved, memoized identity of the authenticated user.
///
/// Shared (via `Arc`) by every entity store of a wizard instance. The
/// first caller pays for the `GET /user_id` round trip; later callers and
/// retries after a failure reuse or re-attempt the single cell.
#[derive(Default)]
pub struct AuthContext {
    user_id: OnceCell<DbId>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The authenticated user's id, fetching it on first use.
    ///
    /// A failed fetch leaves the cell empty, so the next call retries.
    pub async fn user_id(
        &self,
        transport: &dyn PlatformTransport,
    ) -> Result<DbId, PlatformError> {
        self.user_id
            .get_or_try_init(|| async {
                let value = transport.get(USER_ID_PATH, &[]).await?;
                value
                    .get("user_id")
                    .and_then(serde_json::Value::as_i64)
                    .ok_or_else(|| {
                        PlatformError::Network(
                            "Malformed response from /user_id".to_string(),
                        )
                    })
            })
            .await
            .copied()
    }

    /// The memoized user id, if it has been resolved.
    pub fn cached(&self) -> Option<DbId> {
        self.user_id.get().copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use astrovault_core::payload::SubmissionPayload;

    /// Transport that serves only `/user_id` and counts calls.
    struct UserIdOnly {
        calls: AtomicUsize,
        fail: bool,
    }

    impl UserIdOnly {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl PlatformTransport for UserIdOnly {
        async fn get(
            &self,
            path: &str,
            _query: &[(String, String)],
        ) -> Result<Value, PlatformError> {
            assert_eq!(path, USER_ID_PATH);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PlatformError::Network("offline".to_string()));
            }
            Ok(json!({ "user_id": 9 }))
        }

        async fn post(&self, _path: &str, _body: &Value) -> Result<Value, PlatformError> {
            unreachable!("not used in these tests")
        }

        async fn put(&self, _path: &str, _body: &Value) -> Result<Value, PlatformError> {
            unreachable!("not used in these tests")
        }

        async fn delete(&self, _path: &str) -> Result<(), PlatformError> {
            unreachable!("not used in these tests")
        }

        async fn upload(
            &self,
            _path: &str,
            _payload: &SubmissionPayload,
        ) -> Result<(), PlatformError> {
            unreachable!("not used in these tests")
        }
    }

    #[tokio::test]
    async fn user_id_is_fetched_once_and_memoized() {
        let transport = UserIdOnly::new(false);
        let auth = AuthContext::new();
        assert_eq!(auth.cached(), None);

        assert_eq!(auth.user_id(&transport).await.unwrap(), 9);
        assert_eq!(auth.user_id(&transport).await.unwrap(), 9);
        assert_eq!(auth.cached(), Some(9));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_resolution_is_retried_on_next_call() {
        let transport = UserIdOnly::new(true);
        let auth = AuthContext::new();

        let err = auth.user_id(&transport).await.unwrap_err();
        assert_matches!(err, PlatformError::Network(_));
        assert_eq!(auth.cached(), None);

        let err = auth.user_id(&transport).await.unwrap_err();
        assert_matches!(err, PlatformError::Network(_));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn static_credentials_report_their_token() {
        assert_eq!(
            StaticCredentials::signed_in("tok").bearer_token().await,
            Some("tok".to_string())
        );
        assert_eq!(StaticCredentials::signed_out().bearer_token().await, None);
    }
}
