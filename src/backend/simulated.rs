use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::backend::{Identity, IdentityService};
use crate::error::BackendError;

const CODE_LEN: usize = 32;
const DEFAULT_HASH_COST: u32 = 10;
const MIN_HASH_COST: u32 = 4;
const MAX_HASH_COST: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Verification,
    PasswordReset,
}

/// An email the simulated provider "sent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub kind: EmailKind,
    pub code: String,
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
    email_verified: bool,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
        }
    }
}

#[derive(Default)]
struct ProviderState {
    /// Keyed by email
    accounts: HashMap<String, Account>,
    /// code -> uid
    verification_codes: HashMap<String, String>,
    /// code -> email
    reset_codes: HashMap<String, String>,
    outbox: Vec<SentEmail>,
    signed_in: Option<String>,
}

impl ProviderState {
    fn account_by_uid_mut(&mut self, uid: &str) -> Option<&mut Account> {
        self.accounts.values_mut().find(|a| a.uid == uid)
    }

    fn issue_code(&mut self, to: &str, kind: EmailKind) -> String {
        let code = generate_code();
        self.outbox.push(SentEmail {
            to: to.to_string(),
            kind,
            code: code.clone(),
        });
        code
    }
}

/// In-process stand-in for the hosted identity provider.
///
/// Every call waits `latency` before touching state. Passwords are stored as
/// bcrypt hashes; verification and reset codes are single-use and delivered
/// to an inspectable outbox instead of real mail.
pub struct SimulatedBackend {
    latency: Duration,
    hash_cost: u32,
    state: Mutex<ProviderState>,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            hash_cost: DEFAULT_HASH_COST,
            state: Mutex::new(ProviderState::default()),
        }
    }

    /// bcrypt cost for stored passwords (4..=31)
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost.clamp(MIN_HASH_COST, MAX_HASH_COST);
        self
    }

    pub async fn outbox(&self) -> Vec<SentEmail> {
        self.state.lock().await.outbox.clone()
    }

    /// Most recent code of `kind` sent to `email`.
    pub async fn latest_code(&self, email: &str, kind: EmailKind) -> Option<String> {
        let state = self.state.lock().await;
        state
            .outbox
            .iter()
            .rev()
            .find(|m| m.to == email && m.kind == kind)
            .map(|m| m.code.clone())
    }

    pub async fn signed_in_uid(&self) -> Option<String> {
        self.state.lock().await.signed_in.clone()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn hash(&self, password: &str) -> Result<String, BackendError> {
        bcrypt::hash(password, self.hash_cost).map_err(|e| BackendError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl IdentityService for SimulatedBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, BackendError> {
        self.delay().await;
        let password_hash = self.hash(password)?;

        let mut state = self.state.lock().await;
        if state.accounts.contains_key(email) {
            return Err(BackendError::EmailInUse);
        }

        let account = Account {
            uid: uuid::Uuid::now_v7().to_string(),
            email: email.to_string(),
            password_hash,
            email_verified: false,
        };
        let identity = account.identity();
        state.accounts.insert(email.to_string(), account);
        state.signed_in = Some(identity.uid.clone());

        tracing::info!("Created account {} for {}", identity.uid, email);
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, BackendError> {
        self.delay().await;

        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get(email)
            .ok_or(BackendError::UserNotFound)?;

        if !bcrypt::verify(password, &account.password_hash).unwrap_or(false) {
            tracing::warn!("Rejected sign-in for {}", email);
            return Err(BackendError::InvalidCredentials);
        }

        let identity = account.identity();
        state.signed_in = Some(identity.uid.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.delay().await;
        self.state.lock().await.signed_in = None;
        Ok(())
    }

    async fn send_verification_email(&self, identity: &Identity) -> Result<(), BackendError> {
        self.delay().await;

        let mut state = self.state.lock().await;
        if !state.accounts.contains_key(&identity.email) {
            return Err(BackendError::UserNotFound);
        }
        let code = state.issue_code(&identity.email, EmailKind::Verification);
        state.verification_codes.insert(code, identity.uid.clone());

        tracing::info!("Sent verification email to {}", identity.email);
        Ok(())
    }

    async fn apply_verification_code(&self, code: &str) -> Result<(), BackendError> {
        self.delay().await;

        let mut state = self.state.lock().await;
        let uid = state
            .verification_codes
            .remove(code)
            .ok_or(BackendError::InvalidCode)?;
        let account = state
            .account_by_uid_mut(&uid)
            .ok_or(BackendError::InvalidCode)?;

        account.email_verified = true;
        tracing::info!("Verified email for {}", account.email);
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<(), BackendError> {
        self.delay().await;

        let mut state = self.state.lock().await;
        if !state.accounts.contains_key(email) {
            return Err(BackendError::UserNotFound);
        }
        let code = state.issue_code(email, EmailKind::PasswordReset);
        state.reset_codes.insert(code, email.to_string());

        tracing::info!("Sent password reset email to {}", email);
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        self.delay().await;
        let password_hash = self.hash(new_password)?;

        let mut state = self.state.lock().await;
        let email = state
            .reset_codes
            .remove(code)
            .ok_or(BackendError::InvalidCode)?;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or(BackendError::InvalidCode)?;

        account.password_hash = password_hash;
        tracing::info!("Password reset for {}", email);
        Ok(())
    }

    async fn delete_account(&self, uid: &str) -> Result<(), BackendError> {
        self.delay().await;

        let mut state = self.state.lock().await;
        let before = state.accounts.len();
        state.accounts.retain(|_, a| a.uid != uid);
        if state.accounts.len() == before {
            return Err(BackendError::UserNotFound);
        }

        state.verification_codes.retain(|_, owner| owner.as_str() != uid);
        if state.signed_in.as_deref() == Some(uid) {
            state.signed_in = None;
        }

        tracing::info!("Deleted account {}", uid);
        Ok(())
    }
}

fn generate_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SimulatedBackend {
        SimulatedBackend::new(Duration::ZERO).with_hash_cost(4)
    }

    #[tokio::test]
    async fn test_create_and_sign_in() {
        let backend = backend();
        let created = backend
            .create_account("abc@krct.ac.in", "secret1")
            .await
            .unwrap();
        assert!(!created.email_verified);

        let signed = backend.sign_in("abc@krct.ac.in", "secret1").await.unwrap();
        assert_eq!(signed.uid, created.uid);
        assert_eq!(backend.signed_in_uid().await, Some(created.uid));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let backend = backend();
        backend.create_account("a@krct.ac.in", "secret1").await.unwrap();
        let err = backend
            .create_account("a@krct.ac.in", "other12")
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::EmailInUse);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let backend = backend();
        backend.create_account("a@krct.ac.in", "secret1").await.unwrap();
        assert_eq!(
            backend.sign_in("a@krct.ac.in", "nope").await.unwrap_err(),
            BackendError::InvalidCredentials
        );
        assert_eq!(
            backend.sign_in("b@krct.ac.in", "secret1").await.unwrap_err(),
            BackendError::UserNotFound
        );
    }

    #[tokio::test]
    async fn test_verification_code_is_single_use() {
        let backend = backend();
        let identity = backend.create_account("a@krct.ac.in", "secret1").await.unwrap();
        backend.send_verification_email(&identity).await.unwrap();

        let code = backend
            .latest_code("a@krct.ac.in", EmailKind::Verification)
            .await
            .unwrap();
        assert_eq!(code.len(), CODE_LEN);

        backend.apply_verification_code(&code).await.unwrap();
        assert_eq!(
            backend.apply_verification_code(&code).await.unwrap_err(),
            BackendError::InvalidCode
        );

        let signed = backend.sign_in("a@krct.ac.in", "secret1").await.unwrap();
        assert!(signed.email_verified);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let backend = backend();
        backend.create_account("a@krct.ac.in", "secret1").await.unwrap();
        backend.send_password_reset_email("a@krct.ac.in").await.unwrap();

        let code = backend
            .latest_code("a@krct.ac.in", EmailKind::PasswordReset)
            .await
            .unwrap();
        backend.confirm_password_reset(&code, "newpass1").await.unwrap();

        assert!(backend.sign_in("a@krct.ac.in", "secret1").await.is_err());
        assert!(backend.sign_in("a@krct.ac.in", "newpass1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let backend = backend();
        let identity = backend.create_account("a@krct.ac.in", "secret1").await.unwrap();

        backend.delete_account(&identity.uid).await.unwrap();
        assert_eq!(backend.signed_in_uid().await, None);
        assert_eq!(
            backend.delete_account(&identity.uid).await.unwrap_err(),
            BackendError::UserNotFound
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let backend = SimulatedBackend::new(Duration::from_millis(1500)).with_hash_cost(4);
        let started = tokio::time::Instant::now();
        backend.sign_out().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
