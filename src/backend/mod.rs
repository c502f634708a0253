// Ports to the hosted identity and document services
pub mod documents;
pub mod retry;
pub mod simulated;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::BackendError;

pub use documents::{MemoryDocumentStore, SqliteDocumentStore};
pub use retry::{backoff_delay, connect_with_retry};
pub use simulated::SimulatedBackend;

pub const USERS_COLLECTION: &str = "users";

/// An account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

/// Account lifecycle operations of the identity provider.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    async fn send_verification_email(&self, identity: &Identity) -> Result<(), BackendError>;

    /// Consume an email verification code
    async fn apply_verification_code(&self, code: &str) -> Result<(), BackendError>;

    async fn send_password_reset_email(&self, email: &str) -> Result<(), BackendError>;

    /// Consume a password reset code and set the new password
    async fn confirm_password_reset(&self, code: &str, new_password: &str)
        -> Result<(), BackendError>;

    async fn delete_account(&self, uid: &str) -> Result<(), BackendError>;
}

/// JSON documents keyed by collection and id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError>;

    /// Write a document. With `merge`, top-level fields are merged into the
    /// existing document instead of replacing it.
    async fn set(&self, collection: &str, id: &str, doc: Value, merge: bool)
        -> Result<(), BackendError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, BackendError>;
}

pub type DynIdentityService = Arc<dyn IdentityService>;
pub type DynDocumentStore = Arc<dyn DocumentStore>;

/// Shallow merge of `patch` into `base`. Non-object values replace outright.
pub(crate) fn merge_documents(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overrides_top_level_fields() {
        let merged = merge_documents(
            json!({"username": "ABC123456", "emailVerified": false}),
            json!({"emailVerified": true}),
        );
        assert_eq!(merged, json!({"username": "ABC123456", "emailVerified": true}));
    }

    #[test]
    fn merge_into_non_object_replaces() {
        assert_eq!(merge_documents(json!(null), json!({"a": 1})), json!({"a": 1}));
    }
}
