use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use parking_lot::RwLock;
use rollcall_core::errors::AuthError;
use tokio::sync::watch;
use uuid::Uuid;

use crate::auth::{AuthSession, IdentityProvider};

struct Account {
    uid: String,
    password_hash: String,
    disabled: bool,
}

#[derive(Default)]
struct AuthState {
    // Keyed by normalized email.
    accounts: HashMap<String, Account>,
    reset_requests: Vec<String>,
}

/// In-memory [`IdentityProvider`] backed by argon2 password hashes. Fails
/// with the same codes a hosted provider reports, so error handling can be
/// exercised without network access.
pub struct MemoryAuth {
    state: RwLock<AuthState>,
    session: watch::Sender<Option<AuthSession>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            state: RwLock::default(),
            session,
        }
    }

    /// Marks an account as disabled, as a console-side suspension would.
    pub fn disable(&self, email: &str) {
        let mut state = self.state.write();
        if let Some(account) = state.accounts.get_mut(&normalize(email)) {
            account.disabled = true;
        }
    }

    /// Emails that received a password reset request, oldest first.
    pub fn reset_requests(&self) -> Vec<String> {
        self.state.read().reset_requests.clone()
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize(email);
        if !well_formed(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = hash_password(password)?;
        let uid = Uuid::new_v4().to_string();
        {
            let mut state = self.state.write();
            if state.accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse);
            }
            state.accounts.insert(
                email.clone(),
                Account {
                    uid: uid.clone(),
                    password_hash,
                    disabled: false,
                },
            );
        }

        tracing::debug!("Created account {} for {}", uid, email);
        let session = AuthSession { uid, email };
        self.session.send_replace(Some(session.clone()));

        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize(email);
        if !well_formed(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let uid = {
            let state = self.state.read();
            let account = state.accounts.get(&email).ok_or(AuthError::UserNotFound)?;
            if account.disabled {
                return Err(AuthError::UserDisabled);
            }
            let parsed = PasswordHash::new(&account.password_hash)
                .map_err(|err| AuthError::Provider(format!("stored hash invalid: {err}")))?;
            if Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_err()
            {
                return Err(AuthError::WrongPassword);
            }
            account.uid.clone()
        };

        let session = AuthSession { uid, email };
        self.session.send_replace(Some(session.clone()));

        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize(email);
        if !well_formed(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let mut state = self.state.write();
        if !state.accounts.contains_key(&email) {
            return Err(AuthError::UserNotFound);
        }
        state.reset_requests.push(email);

        Ok(())
    }

    fn watch_session(&self) -> watch::Receiver<Option<AuthSession>> {
        self.session.subscribe()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn well_formed(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    // Generate a fresh, random salt per account.
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Provider(format!("password hashing failed: {err}")))
}
