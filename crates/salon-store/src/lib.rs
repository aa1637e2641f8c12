//! # salon-store
//!
//! Client for the hosted document store backing the chat.  The remote
//! service is an opaque external collaborator; this crate depends on three
//! operations only: insert-one into a named collection, one-shot equality
//! query, and a live ordered query delivering a full snapshot on every
//! change.
//!
//! [`backend::DocumentBackend`] is the seam: [`HttpBackend`] talks to the
//! hosted service, [`MemoryBackend`] serves tests and local development.
//! [`Store`] is the typed facade the application uses.

pub mod backend;
pub mod http;
pub mod live;
pub mod memory;
pub mod models;
pub mod store;

mod error;

pub use backend::{DocumentBackend, DocumentId, WatchQuery};
pub use error::{Result, StoreError};
pub use http::{HttpBackend, StoreConfig};
pub use live::{Subscription, WatchEvent};
pub use memory::MemoryBackend;
pub use models::{ChatMessage, UserProfile};
pub use store::Store;
