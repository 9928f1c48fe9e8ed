use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use eyre::{Result, eyre};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use crate::document::{Document, Fields};
use crate::store::{DocumentStore, Query};

struct Watcher {
    query: Query,
    tx: watch::Sender<Vec<Document>>,
}

#[derive(Default)]
struct Collection {
    docs: Vec<Document>,
    watchers: Vec<Watcher>,
}

impl Collection {
    /// Pushes a fresh snapshot to every live subscriber of this collection.
    fn publish(&mut self) {
        self.watchers.retain(|watcher| !watcher.tx.is_closed());
        for watcher in &self.watchers {
            let _ = watcher.tx.send(view(&self.docs, &watcher.query));
        }
    }
}

/// In-memory [`DocumentStore`]. Documents keep insertion order, ids are
/// assigned on insert and every write republishes the affected collection
/// to its subscribers.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document> {
        let document = Document::new(Uuid::new_v4().to_string(), fields);
        tracing::debug!("Adding document {} to {}", document.id, collection);

        let mut collections = self.collections.write();
        let entry = collections.entry(collection.to_string()).or_default();
        entry.docs.push(document.clone());
        entry.publish();

        Ok(document)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut collections = self.collections.write();
        let entry = collections.entry(collection.to_string()).or_default();
        match entry.docs.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => existing.fields = fields,
            None => entry.docs.push(Document::new(id, fields)),
        }
        entry.publish();

        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, changes: Fields) -> Result<()> {
        let mut collections = self.collections.write();
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| eyre!("no document {}/{}", collection, id))?;
        let doc = entry
            .docs
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| eyre!("no document {}/{}", collection, id))?;
        doc.fields.extend(changes);
        entry.publish();

        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read();
        let doc = collections
            .get(collection)
            .and_then(|entry| entry.docs.iter().find(|doc| doc.id == id).cloned());

        Ok(doc)
    }

    async fn find(&self, query: Query) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let docs = collections
            .get(&query.collection)
            .map(|entry| view(&entry.docs, &query))
            .unwrap_or_default();

        Ok(docs)
    }

    fn subscribe(&self, query: Query) -> watch::Receiver<Vec<Document>> {
        tracing::debug!("Subscribing to {}", query.collection);

        let mut collections = self.collections.write();
        let entry = collections.entry(query.collection.clone()).or_default();
        let (tx, rx) = watch::channel(view(&entry.docs, &query));
        entry.watchers.push(Watcher { query, tx });

        rx
    }
}

fn view(docs: &[Document], query: &Query) -> Vec<Document> {
    let mut docs: Vec<Document> = docs
        .iter()
        .filter(|doc| query.matches(&doc.fields))
        .cloned()
        .collect();
    if let Some(field) = query.order_by.as_deref() {
        docs.sort_by(|a, b| cmp_field(a.fields.get(field), b.fields.get(field)));
    }
    docs
}

fn cmp_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp_value(a, b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_value(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        // Timestamps of differing precision do not order correctly as raw
        // strings, so parse them when both sides look like RFC 3339.
        (Value::String(a), Value::String(b)) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
