//! The backend seam.
//!
//! The hosted document service is opaque: the whole client depends on the
//! three operations below and nothing else.  [`crate::HttpBackend`]
//! implements them against the remote API; [`crate::MemoryBackend`] is the
//! in-process stand-in used by tests and local development.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::live::Subscription;

/// Identifier the store assigns to an inserted document.  Opaque to the
/// client; returned for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentId(pub String);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters of a live ordered query.
#[derive(Debug, Clone)]
pub struct WatchQuery {
    /// Collection to watch.
    pub collection: String,
    /// Optional equality filter (field name, required value).
    pub filter: Option<(String, Value)>,
    /// Field the snapshot is ordered by, ascending.
    pub order_by: String,
}

/// Minimal surface of the remote document store.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Append one document to a named collection.
    async fn insert_one(&self, collection: &str, document: Value) -> Result<DocumentId>;

    /// One-shot equality query returning all matches.
    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>>;

    /// Open a live query.  Every change to the watched collection delivers
    /// a full refreshed ordered snapshot until the subscription is
    /// cancelled.
    async fn watch(&self, query: WatchQuery) -> Result<Subscription>;
}
