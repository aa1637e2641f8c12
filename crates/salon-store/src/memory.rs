//! In-memory document backend.
//!
//! Plays the store's role for tests and local development: collections are
//! vectors of JSON documents, watchers get a freshly filtered and sorted
//! snapshot on every insert.  The sort is stable, so documents with equal
//! order-field values stay in arrival order, the same tie-break the hosted
//! service applies.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{DocumentBackend, DocumentId, WatchQuery};
use crate::error::Result;
use crate::live::{self, Subscription, SubscriptionProducer, WatchEvent};

const CHANNEL_CAPACITY: usize = 32;

struct Watcher {
    query: WatchQuery,
    tx: mpsc::Sender<WatchEvent>,
    cancel_rx: tokio::sync::watch::Receiver<bool>,
}

impl Watcher {
    fn is_live(&self) -> bool {
        !*self.cancel_rx.borrow() && !self.tx.is_closed()
    }
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Value>>,
    watchers: Vec<Watcher>,
}

/// In-process [`DocumentBackend`].
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection.
    pub fn len(&self, collection: &str) -> usize {
        let inner = self.inner.lock().expect("memory store lock");
        inner.collections.get(collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert_one(&self, collection: &str, document: Value) -> Result<DocumentId> {
        // Collect deliveries under the lock, send after releasing it.
        let deliveries: Vec<(mpsc::Sender<WatchEvent>, WatchEvent)> = {
            let mut inner = self.inner.lock().expect("memory store lock");
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(document);

            inner.watchers.retain(Watcher::is_live);

            let mut deliveries = Vec::new();
            for watcher in &inner.watchers {
                if watcher.query.collection != collection {
                    continue;
                }
                let docs = inner
                    .collections
                    .get(collection)
                    .map(|docs| snapshot(docs, &watcher.query))
                    .unwrap_or_default();
                deliveries.push((watcher.tx.clone(), WatchEvent::Snapshot(docs)));
            }
            deliveries
        };

        for (tx, event) in deliveries {
            // A closed receiver just means the subscriber went away.
            let _ = tx.send(event).await;
        }

        Ok(DocumentId(Uuid::new_v4().to_string()))
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let inner = self.inner.lock().expect("memory store lock");
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn watch(&self, query: WatchQuery) -> Result<Subscription> {
        let (producer, subscription) = live::channel(CHANNEL_CAPACITY);
        let SubscriptionProducer { tx, cancel_rx } = producer;

        let mut inner = self.inner.lock().expect("memory store lock");
        let initial = inner
            .collections
            .get(&query.collection)
            .map(|docs| snapshot(docs, &query))
            .unwrap_or_default();

        debug!(collection = %query.collection, docs = initial.len(), "watch opened");

        // Capacity is at least one and the channel is empty here.
        let _ = tx.try_send(WatchEvent::Snapshot(initial));

        inner.watchers.push(Watcher {
            query,
            tx,
            cancel_rx,
        });

        Ok(subscription)
    }
}

/// Filter and order one collection for delivery.
fn snapshot(docs: &[Value], query: &WatchQuery) -> Vec<Value> {
    let mut out: Vec<Value> = docs
        .iter()
        .filter(|doc| match &query.filter {
            Some((field, value)) => doc.get(field) == Some(value),
            None => true,
        })
        .cloned()
        .collect();
    out.sort_by(|a, b| field_cmp(a, b, &query.order_by));
    out
}

/// Compare two documents on one field.  Strings compare lexicographically,
/// numbers numerically; anything else ties (stable sort keeps arrival
/// order).
fn field_cmp(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(text: &str, timestamp: &str, topic: &str) -> Value {
        json!({ "text": text, "timestamp": timestamp, "topic": topic })
    }

    fn message_watch(topic: Option<&str>) -> WatchQuery {
        WatchQuery {
            collection: "message".into(),
            filter: topic.map(|t| ("topic".to_string(), json!(t))),
            order_by: "timestamp".into(),
        }
    }

    #[tokio::test]
    async fn query_eq_matches_exactly() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("user", json!({ "uid": "u1", "name": "alice" }))
            .await
            .unwrap();
        backend
            .insert_one("user", json!({ "uid": "u2", "name": "bob" }))
            .await
            .unwrap();

        let matches = backend
            .query_eq("user", "uid", &json!("u2"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["name"], "bob");

        let none = backend
            .query_eq("user", "uid", &json!("u3"))
            .await
            .unwrap();
        assert!(none.is_empty());

        assert_eq!(backend.len("user"), 2);
        assert!(backend.is_empty("message"));
    }

    #[tokio::test]
    async fn watch_delivers_initial_snapshot() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("message", msg("hi", "1700000000001", "chat-room-1"))
            .await
            .unwrap();

        let mut sub = backend.watch(message_watch(None)).await.unwrap();
        match sub.next().await {
            Some(WatchEvent::Snapshot(docs)) => assert_eq!(docs.len(), 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn snapshots_are_ordered_by_timestamp_not_arrival() {
        let backend = MemoryBackend::new();
        // Writes complete out of timestamp order.
        for ts in ["1700000000003", "1700000000001", "1700000000002"] {
            backend
                .insert_one("message", msg(ts, ts, "chat-room-1"))
                .await
                .unwrap();
        }

        let mut sub = backend.watch(message_watch(None)).await.unwrap();
        let Some(WatchEvent::Snapshot(docs)) = sub.next().await else {
            panic!("expected snapshot");
        };
        let order: Vec<&str> = docs.iter().map(|d| d["timestamp"].as_str().unwrap()).collect();
        assert_eq!(
            order,
            vec!["1700000000001", "1700000000002", "1700000000003"]
        );
    }

    #[tokio::test]
    async fn equal_timestamps_keep_arrival_order() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("message", msg("first", "1700000000001", "chat-room-1"))
            .await
            .unwrap();
        backend
            .insert_one("message", msg("second", "1700000000001", "chat-room-1"))
            .await
            .unwrap();

        let mut sub = backend.watch(message_watch(None)).await.unwrap();
        let Some(WatchEvent::Snapshot(docs)) = sub.next().await else {
            panic!("expected snapshot");
        };
        assert_eq!(docs[0]["text"], "first");
        assert_eq!(docs[1]["text"], "second");
    }

    #[tokio::test]
    async fn topic_filter_scopes_the_snapshot() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("message", msg("one", "1", "chat-room-1"))
            .await
            .unwrap();
        backend
            .insert_one("message", msg("two", "2", "chat-room-2"))
            .await
            .unwrap();

        let mut sub = backend.watch(message_watch(Some("chat-room-1"))).await.unwrap();
        let Some(WatchEvent::Snapshot(docs)) = sub.next().await else {
            panic!("expected snapshot");
        };
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["text"], "one");
    }

    #[tokio::test]
    async fn cancelled_watch_receives_nothing_more() {
        let backend = MemoryBackend::new();
        let mut sub = backend.watch(message_watch(None)).await.unwrap();

        // Drain the initial (empty) snapshot, then cancel.
        assert!(matches!(sub.next().await, Some(WatchEvent::Snapshot(_))));
        sub.cancel();

        backend
            .insert_one("message", msg("late", "1", "chat-room-1"))
            .await
            .unwrap();

        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn each_insert_fans_out_a_fresh_snapshot() {
        let backend = MemoryBackend::new();
        let mut sub = backend.watch(message_watch(None)).await.unwrap();
        assert!(matches!(sub.next().await, Some(WatchEvent::Snapshot(ref d)) if d.is_empty()));

        backend
            .insert_one("message", msg("a", "1", "chat-room-1"))
            .await
            .unwrap();
        backend
            .insert_one("message", msg("b", "2", "chat-room-1"))
            .await
            .unwrap();

        let Some(WatchEvent::Snapshot(first)) = sub.next().await else {
            panic!("expected snapshot");
        };
        let Some(WatchEvent::Snapshot(second)) = sub.next().await else {
            panic!("expected snapshot");
        };
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }
}
