use async_trait::async_trait;
use eyre::Result;
use mockall::mock;
use rollcall_core::errors::AuthError;
use tokio::sync::watch;

use crate::auth::{AuthSession, IdentityProvider};
use crate::document::{Document, Fields};
use crate::store::{DocumentStore, Query};

// Mock backends for testing
mock! {
    pub DocumentStore {}

    #[async_trait]
    impl DocumentStore for DocumentStore {
        async fn add(&self, collection: &str, fields: Fields) -> Result<Document>;

        async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

        async fn update(&self, collection: &str, id: &str, changes: Fields) -> Result<()>;

        async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

        async fn find(&self, query: Query) -> Result<Vec<Document>>;

        fn subscribe(&self, query: Query) -> watch::Receiver<Vec<Document>>;
    }
}

mock! {
    pub IdentityProvider {}

    #[async_trait]
    impl IdentityProvider for IdentityProvider {
        async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

        async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

        async fn sign_out(&self) -> Result<(), AuthError>;

        async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

        fn watch_session(&self) -> watch::Receiver<Option<AuthSession>>;
    }
}

/// Receiver over an already-closed channel holding an empty snapshot. Handy
/// as a `subscribe` return value when a test does not drive the stream.
pub fn closed_subscription() -> watch::Receiver<Vec<Document>> {
    let (_tx, rx) = watch::channel(Vec::new());
    rx
}
