use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;

use crate::backend::{DynDocumentStore, DynIdentityService, Identity, USERS_COLLECTION};
use crate::error::AuthError;
use crate::models::User;
use crate::persistence::{self, DynSnapshotStore, AUTH_PARTITION};

/// The persisted part of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl AuthSession {
    /// Drop an authenticated flag that no verified user backs.
    fn repaired(mut self) -> Self {
        let verified = self.user.as_ref().is_some_and(|u| u.email_verified);
        if self.is_authenticated && !verified {
            tracing::warn!("Restored session claimed authentication without a verified user");
            self.is_authenticated = false;
        }
        self
    }
}

/// Everything a view needs to render auth state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthView {
    pub session: AuthSession,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Unverified,
    Authenticated,
}

impl AuthView {
    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    pub fn status(&self) -> AuthStatus {
        match (&self.session.user, self.session.is_authenticated) {
            (None, _) => AuthStatus::Anonymous,
            (Some(_), true) => AuthStatus::Authenticated,
            (Some(_), false) => AuthStatus::Unverified,
        }
    }
}

/// Display handle: first three characters of the email, upper-cased,
/// followed by six random digits.
pub fn derive_username(email: &str) -> String {
    let prefix: String = email.chars().take(3).collect::<String>().to_uppercase();
    let digits = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}{:06}", prefix, digits)
}

/// Owner of the single current session.
///
/// State lives in a watch channel so views can subscribe and re-render on
/// every change. Every remote operation raises `is_loading` for its duration
/// and records a readable message in `error` when it fails, in addition to
/// returning the error.
pub struct AuthStore {
    view: watch::Sender<AuthView>,
    identity: DynIdentityService,
    documents: DynDocumentStore,
    snapshots: Option<DynSnapshotStore>,
}

impl AuthStore {
    pub fn new(
        identity: DynIdentityService,
        documents: DynDocumentStore,
        snapshots: Option<DynSnapshotStore>,
    ) -> Self {
        let session: AuthSession =
            persistence::restore_or(snapshots.as_ref(), AUTH_PARTITION, AuthSession::default);
        let (view, _) = watch::channel(AuthView {
            session: session.repaired(),
            ..AuthView::default()
        });

        Self {
            view,
            identity,
            documents,
            snapshots,
        }
    }

    pub fn snapshot(&self) -> AuthView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthView> {
        self.view.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.view.borrow().session.user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.view.borrow().session.is_authenticated
    }

    /// Create an account and send the verification email. The new user is
    /// held unverified until [`AuthStore::verify_email`] succeeds.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.begin();
        let result = self.try_register(email, password).await;
        self.finish("register", result)
    }

    async fn try_register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let username = derive_username(email);
        let identity = self.identity.create_account(email, password).await?;
        self.identity.send_verification_email(&identity).await?;

        self.documents
            .set(
                USERS_COLLECTION,
                &identity.uid,
                json!({
                    "username": username,
                    "email": email,
                    "emailVerified": false,
                    "createdAt": Utc::now().to_rfc3339(),
                }),
                false,
            )
            .await?;

        tracing::info!("Registered {} as {}", identity.uid, username);
        self.set_session(AuthSession {
            user: Some(User {
                id: identity.uid,
                username,
                email: email.to_string(),
                email_verified: false,
            }),
            is_authenticated: false,
        });
        Ok(())
    }

    /// Sign in. An unverified account gets a fresh verification email, is
    /// held as the unverified current user, and fails with
    /// [`AuthError::EmailNotVerified`].
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.begin();
        let result = self.try_login(email, password).await;
        self.finish("login", result)
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let identity = self.identity.sign_in(email, password).await?;

        let doc = self
            .documents
            .get(USERS_COLLECTION, &identity.uid)
            .await?
            .ok_or(AuthError::UserDataNotFound)?;
        let username = doc
            .get("username")
            .and_then(|v| v.as_str())
            .ok_or(AuthError::UserDataNotFound)?
            .to_string();

        let user = User {
            id: identity.uid.clone(),
            username,
            email: identity.email.clone(),
            email_verified: identity.email_verified,
        };

        if !identity.email_verified {
            self.identity.send_verification_email(&identity).await?;
            self.set_session(AuthSession {
                user: Some(user),
                is_authenticated: false,
            });
            return Err(AuthError::EmailNotVerified);
        }

        tracing::info!("Signed in {}", user.username);
        self.set_session(AuthSession {
            user: Some(user),
            is_authenticated: true,
        });
        Ok(())
    }

    /// Clear the session. Always succeeds locally, even if the provider
    /// sign-out fails.
    pub async fn logout(&self) {
        self.begin();
        if let Err(e) = self.identity.sign_out().await {
            tracing::warn!("Provider sign-out failed: {}", e);
        }
        self.set_session(AuthSession::default());
        self.view.send_modify(|v| v.is_loading = false);
    }

    pub async fn verify_email(&self, code: &str) -> Result<(), AuthError> {
        self.begin();
        let result = self.try_verify_email(code).await;
        self.finish("verify_email", result)
    }

    async fn try_verify_email(&self, code: &str) -> Result<(), AuthError> {
        self.identity.apply_verification_code(code).await?;

        let Some(mut user) = self.current_user() else {
            tracing::info!("Email verified with no active session");
            return Ok(());
        };

        self.documents
            .set(
                USERS_COLLECTION,
                &user.id,
                json!({ "emailVerified": true }),
                true,
            )
            .await?;

        user.email_verified = true;
        self.set_session(AuthSession {
            user: Some(user),
            is_authenticated: true,
        });
        Ok(())
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.begin();
        let result = self
            .identity
            .send_password_reset_email(email)
            .await
            .map_err(AuthError::from);
        self.finish("send_password_reset", result)
    }

    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), AuthError> {
        self.begin();
        let result = self
            .identity
            .confirm_password_reset(code, new_password)
            .await
            .map_err(AuthError::from);
        self.finish("reset_password", result)
    }

    pub async fn resend_verification_email(&self) -> Result<(), AuthError> {
        self.begin();
        let result = self.try_resend_verification().await;
        self.finish("resend_verification_email", result)
    }

    async fn try_resend_verification(&self) -> Result<(), AuthError> {
        let user = self.current_user().ok_or(AuthError::NoCurrentUser)?;
        let identity = Identity {
            uid: user.id,
            email: user.email,
            email_verified: user.email_verified,
        };
        self.identity.send_verification_email(&identity).await?;
        Ok(())
    }

    /// Re-authenticate with `password`, delete the account and its user
    /// document, and clear the session.
    pub async fn delete_account(&self, password: &str) -> Result<(), AuthError> {
        self.begin();
        let result = self.try_delete_account(password).await;
        self.finish("delete_account", result)
    }

    async fn try_delete_account(&self, password: &str) -> Result<(), AuthError> {
        let user = self.current_user().ok_or(AuthError::NoCurrentUser)?;

        self.identity.sign_in(&user.email, password).await?;
        self.documents.delete(USERS_COLLECTION, &user.id).await?;
        self.identity.delete_account(&user.id).await?;

        tracing::info!("Deleted account {}", user.username);
        self.set_session(AuthSession::default());
        Ok(())
    }

    fn begin(&self) {
        self.view.send_modify(|v| {
            v.is_loading = true;
            v.error = None;
        });
    }

    fn finish<T>(&self, op: &str, result: Result<T, AuthError>) -> Result<T, AuthError> {
        let message = result.as_ref().err().map(|e| {
            tracing::warn!("Auth {} failed: {}", op, e);
            e.to_string()
        });
        self.view.send_modify(|v| {
            v.is_loading = false;
            if message.is_some() {
                v.error = message;
            }
        });
        result
    }

    fn set_session(&self, session: AuthSession) {
        persistence::mirror(self.snapshots.as_ref(), AUTH_PARTITION, &session);
        self.view.send_modify(|v| v.session = session);
    }
}
