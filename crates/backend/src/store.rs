use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;
use tokio::sync::watch;

use crate::document::{Document, Fields};

/// A collection read: equality clauses plus an optional sort field.
///
/// ```
/// use rollcall_backend::store::Query;
///
/// let query = Query::collection("attendance")
///     .where_eq("classId", "c1")
///     .where_eq("date", "2024-01-15");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub collection: String,
    pub clauses: Vec<(String, Value)>,
    pub order_by: Option<String>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            ..Self::default()
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Whether a document's fields satisfy every equality clause.
    pub fn matches(&self, fields: &Fields) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value))
    }
}

/// Remote document database, collection-per-entity with live subscriptions.
///
/// Mutations go to the backend only; the client reads its own writes back
/// through the subscription snapshots.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document with a backend-assigned id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document>;

    /// Creates or replaces the document at a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Merges fields into an existing document. Fails if the document does
    /// not exist.
    async fn update(&self, collection: &str, id: &str, changes: Fields) -> Result<()>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn find(&self, query: Query) -> Result<Vec<Document>>;

    /// Opens a live view of a collection. The receiver always holds the
    /// latest full snapshot; intermediate snapshots may be skipped.
    fn subscribe(&self, query: Query) -> watch::Receiver<Vec<Document>>;
}
