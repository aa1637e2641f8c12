//! Document shapes exchanged with the remote store.
//!
//! Field names match the stored documents exactly; both structs travel as
//! JSON.  Avatar images are embedded as `data:` URL strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use salon_shared::{Topic, Uid};

/// A `user` collection document.  Written exactly once at signup and never
/// mutated afterwards by this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Opaque identifier issued by the auth service.
    pub uid: Uid,
    /// Display name, at most 20 characters.
    pub name: String,
    /// Avatar image as a `data:` URL.
    pub img: String,
    /// Email the account was created with.
    pub email: String,
}

/// A `message` collection document.  Append-only: never mutated or
/// deleted.  Ordered by `timestamp`; ties are broken by arrival order at
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub uid: Uid,
    /// Sender display name, denormalised into every message.
    pub name: String,
    /// Sender avatar `data:` URL, denormalised into every message.
    pub img: String,
    /// Body text, at most 100 characters.
    pub text: String,
    /// Decimal milliseconds since the epoch, as a string.  Monotonically
    /// increasing per client.
    pub timestamp: String,
    /// Room this message belongs to.
    pub topic: Topic,
}

impl ChatMessage {
    /// Convert a delivered snapshot of raw documents into messages,
    /// skipping anything that does not match the expected shape.
    pub fn many_from_documents(documents: Vec<Value>) -> Vec<ChatMessage> {
        documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<ChatMessage>(doc) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(error = %e, "skipping malformed message document");
                    None
                }
            })
            .collect()
    }
}
