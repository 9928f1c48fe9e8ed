use std::time::Duration;

use pretty_assertions::assert_eq;
use rollcall_backend::document::Fields;
use rollcall_backend::memory::store::MemoryStore;
use rollcall_backend::store::{DocumentStore, Query};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::timeout;

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[tokio::test]
async fn test_add_assigns_unique_ids() {
    let store = MemoryStore::new();

    let first = store
        .add("classes", fields(json!({ "name": "Algebra I" })))
        .await
        .expect("Failed to add document");
    let second = store
        .add("classes", fields(json!({ "name": "Biology" })))
        .await
        .expect("Failed to add document");

    assert_ne!(first.id, second.id);

    let fetched = store
        .get("classes", &first.id)
        .await
        .expect("Failed to get document")
        .expect("Document should exist");
    assert_eq!(fetched.fields["name"], "Algebra I");
}

#[tokio::test]
async fn test_set_creates_then_replaces() {
    let store = MemoryStore::new();

    store
        .set("users", "u1", fields(json!({ "name": "Pat", "role": "student" })))
        .await
        .expect("Failed to set document");
    store
        .set("users", "u1", fields(json!({ "name": "Pat Lee" })))
        .await
        .expect("Failed to set document");

    let doc = store
        .get("users", "u1")
        .await
        .expect("Failed to get document")
        .expect("Document should exist");

    // Replaced outright, not merged.
    assert_eq!(doc.fields.get("role"), None);
    assert_eq!(doc.fields["name"], "Pat Lee");
}

#[tokio::test]
async fn test_update_merges_fields() {
    let store = MemoryStore::new();

    let doc = store
        .add("classes", fields(json!({ "name": "Algebra I", "isActive": false })))
        .await
        .expect("Failed to add document");
    store
        .update("classes", &doc.id, fields(json!({ "isActive": true })))
        .await
        .expect("Failed to update document");

    let updated = store
        .get("classes", &doc.id)
        .await
        .expect("Failed to get document")
        .expect("Document should exist");

    assert_eq!(updated.fields["name"], "Algebra I");
    assert_eq!(updated.fields["isActive"], true);
}

#[tokio::test]
async fn test_update_missing_document_fails() {
    let store = MemoryStore::new();

    let result = store
        .update("classes", "missing", fields(json!({ "isActive": true })))
        .await;

    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("classes/missing"));
}

#[tokio::test]
async fn test_find_applies_equality_clauses() {
    let store = MemoryStore::new();

    store
        .add(
            "attendance",
            fields(json!({ "classId": "c1", "studentId": "s1", "date": "2024-01-15" })),
        )
        .await
        .expect("Failed to add document");
    store
        .add(
            "attendance",
            fields(json!({ "classId": "c1", "studentId": "s2", "date": "2024-01-15" })),
        )
        .await
        .expect("Failed to add document");
    store
        .add(
            "attendance",
            fields(json!({ "classId": "c1", "studentId": "s1", "date": "2024-01-16" })),
        )
        .await
        .expect("Failed to add document");

    let matches = store
        .find(
            Query::collection("attendance")
                .where_eq("classId", "c1")
                .where_eq("studentId", "s1")
                .where_eq("date", "2024-01-15"),
        )
        .await
        .expect("Failed to run query");

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].fields["studentId"], "s1");

    let none = store
        .find(Query::collection("attendance").where_eq("classId", "c9"))
        .await
        .expect("Failed to run query");
    assert!(none.is_empty());

    let unknown = store
        .find(Query::collection("nothing-here"))
        .await
        .expect("Failed to run query");
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn test_subscribe_sees_existing_and_new_documents() {
    let store = MemoryStore::new();

    store
        .add("classes", fields(json!({ "name": "Algebra I" })))
        .await
        .expect("Failed to add document");

    let mut rx = store.subscribe(Query::collection("classes"));
    assert_eq!(rx.borrow_and_update().len(), 1);

    store
        .add("classes", fields(json!({ "name": "Biology" })))
        .await
        .expect("Failed to add document");

    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("Timed out waiting for snapshot")
        .expect("Subscription closed");
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[1].fields["name"], "Biology");
}

#[tokio::test]
async fn test_subscription_applies_equality_clauses() {
    let store = MemoryStore::new();

    store
        .add("enrollments", fields(json!({ "classId": "c1", "studentId": "s1" })))
        .await
        .expect("Failed to add document");

    let mut rx = store.subscribe(Query::collection("enrollments").where_eq("classId", "c1"));
    assert_eq!(rx.borrow_and_update().len(), 1);

    store
        .add("enrollments", fields(json!({ "classId": "c2", "studentId": "s1" })))
        .await
        .expect("Failed to add document");
    store
        .add("enrollments", fields(json!({ "classId": "c1", "studentId": "s2" })))
        .await
        .expect("Failed to add document");

    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("Timed out waiting for snapshot")
        .expect("Subscription closed");
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.iter().all(|doc| doc.fields["classId"] == "c1"));
}

#[tokio::test]
async fn test_subscription_orders_by_field() {
    let store = MemoryStore::new();

    store
        .add(
            "chatMessages",
            fields(json!({ "message": "second", "createdAt": "2024-01-15T10:00:00Z" })),
        )
        .await
        .expect("Failed to add document");
    store
        .add(
            "chatMessages",
            fields(json!({ "message": "first", "createdAt": "2024-01-15T09:00:00Z" })),
        )
        .await
        .expect("Failed to add document");

    let mut rx = store.subscribe(Query::collection("chatMessages").order_by("createdAt"));
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot[0].fields["message"], "first");
    assert_eq!(snapshot[1].fields["message"], "second");

    // Differing timestamp precision still orders chronologically.
    store
        .add(
            "chatMessages",
            fields(json!({ "message": "earliest", "createdAt": "2024-01-15T08:59:59.500Z" })),
        )
        .await
        .expect("Failed to add document");

    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("Timed out waiting for snapshot")
        .expect("Subscription closed");
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot[0].fields["message"], "earliest");
}

#[tokio::test]
async fn test_update_republishes_snapshot() {
    let store = MemoryStore::new();

    let doc = store
        .add("classes", fields(json!({ "name": "Algebra I", "isActive": false })))
        .await
        .expect("Failed to add document");

    let mut rx = store.subscribe(Query::collection("classes"));
    rx.borrow_and_update();

    store
        .update("classes", &doc.id, fields(json!({ "isActive": true })))
        .await
        .expect("Failed to update document");

    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("Timed out waiting for snapshot")
        .expect("Subscription closed");
    assert_eq!(rx.borrow_and_update()[0].fields["isActive"], true);
}

#[derive(Debug, Deserialize, PartialEq)]
struct NamedDoc {
    id: String,
    name: String,
}

#[tokio::test]
async fn test_data_injects_document_id() {
    let store = MemoryStore::new();

    let doc = store
        .add("classes", fields(json!({ "name": "Algebra I" })))
        .await
        .expect("Failed to add document");

    let decoded: NamedDoc = doc.data().expect("Failed to decode document");
    assert_eq!(decoded.id, doc.id);
    assert_eq!(decoded.name, "Algebra I");
}

#[tokio::test]
async fn test_data_keeps_stored_id_field() {
    let store = MemoryStore::new();

    // Profile documents duplicate the uid into their fields.
    store
        .set("users", "uid-1", fields(json!({ "id": "uid-1", "name": "Pat" })))
        .await
        .expect("Failed to set document");

    let doc = store
        .get("users", "uid-1")
        .await
        .expect("Failed to get document")
        .expect("Document should exist");
    let decoded: NamedDoc = doc.data().expect("Failed to decode document");

    assert_eq!(decoded.id, "uid-1");
}
