use async_trait::async_trait;
use rollcall_core::errors::AuthError;
use tokio::sync::watch;

/// An authenticated session as the identity provider reports it. The profile
/// document lives in the document store, keyed by `uid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub uid: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Watches the session. Holds `None` while signed out; every sign-in and
    /// sign-out publishes a new value.
    fn watch_session(&self) -> watch::Receiver<Option<AuthSession>>;
}
