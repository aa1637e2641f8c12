//! Typed facade over a [`DocumentBackend`].
//!
//! The application never builds raw documents or collection names itself;
//! it goes through these helpers.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use salon_shared::constants::{
    COLLECTION_MESSAGES, COLLECTION_USERS, FIELD_TIMESTAMP, FIELD_TOPIC, FIELD_UID,
};
use salon_shared::{Topic, Uid};

use crate::backend::{DocumentBackend, DocumentId, WatchQuery};
use crate::error::Result;
use crate::http::{HttpBackend, StoreConfig};
use crate::live::Subscription;
use crate::memory::MemoryBackend;
use crate::models::{ChatMessage, UserProfile};

/// Handle to the document store.  Cheap to clone; all clones share the
/// same backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Connect to the hosted service.
    pub fn remote(config: StoreConfig) -> Self {
        Self::new(Arc::new(HttpBackend::new(config)))
    }

    /// In-process store for tests and local development.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Write the signup profile document.  Called exactly once per account.
    pub async fn insert_user(&self, profile: &UserProfile) -> Result<DocumentId> {
        let doc = serde_json::to_value(profile)?;
        let id = self.backend.insert_one(COLLECTION_USERS, doc).await?;
        info!(uid = %profile.uid.short(), "user profile stored");
        Ok(id)
    }

    /// One-shot uid lookup.  Returns the first match; the uid is expected
    /// unique, duplicates are undefined but never a crash.
    pub async fn find_user(&self, uid: &Uid) -> Result<Option<UserProfile>> {
        let matches = self
            .backend
            .query_eq(COLLECTION_USERS, FIELD_UID, &json!(uid))
            .await?;
        match matches.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Append one chat message.  At-least-once from the caller's
    /// perspective: a failure does not imply the document was not stored.
    pub async fn insert_message(&self, message: &ChatMessage) -> Result<DocumentId> {
        let doc = serde_json::to_value(message)?;
        self.backend.insert_one(COLLECTION_MESSAGES, doc).await
    }

    /// Open the live message query for one topic, ordered ascending by
    /// timestamp.
    pub async fn watch_messages(&self, topic: &Topic) -> Result<Subscription> {
        self.backend
            .watch(WatchQuery {
                collection: COLLECTION_MESSAGES.to_string(),
                filter: Some((FIELD_TOPIC.to_string(), json!(topic))),
                order_by: FIELD_TIMESTAMP.to_string(),
            })
            .await
    }
}
