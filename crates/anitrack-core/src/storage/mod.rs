//! Watchlist document store
//!
//! A watchlist is a collection of documents addressed by
//! `watchlists/{user_id}/anime`. Each document holds the fields of one
//! saved anime and is keyed by an id the store assigns on creation.
//!
//! ## Adapters
//!
//! - **SQLite** (`SqliteWatchlistStore`): the default, one row per document
//! - **In-memory** (`InMemoryWatchlistStore`): tests and ephemeral sessions
//!
//! Collections list in insertion order. Nothing is sorted or deduplicated.

use std::fmt;

use async_trait::async_trait;

use crate::models::EntryFields;

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryWatchlistStore;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteWatchlistStore;

/// Length of generated document ids
const DOCUMENT_ID_LEN: usize = 20;

/// Address of one user's watchlist collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    user_id: String,
}

impl CollectionPath {
    /// Build the watchlist path for a user
    ///
    /// Rejects ids that are empty or would change the path shape.
    pub fn watchlist(user_id: &str) -> StoreResult<Self> {
        if user_id.trim().is_empty() {
            return Err(StoreError::InvalidPath("user id is empty".to_string()));
        }
        if user_id.contains('/') {
            return Err(StoreError::InvalidPath(format!(
                "user id '{}' contains '/'",
                user_id
            )));
        }
        Ok(Self {
            user_id: user_id.to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watchlists/{}/anime", self.user_id)
    }
}

/// A document as returned by `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: EntryFields,
}

/// Per-user document collection
///
/// Implementations must list a collection in a stable order and must treat
/// deleting an unknown id as success.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All documents in the collection, in the store's native order
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<StoredDocument>>;

    /// Create a document and return its new id
    async fn create(&self, path: &CollectionPath, fields: &EntryFields) -> StoreResult<String>;

    /// Delete a document by id
    async fn delete(&self, path: &CollectionPath, doc_id: &str) -> StoreResult<()>;

    /// Human-readable location of the store (for status output)
    fn location(&self) -> String;
}

/// Generate a random document id
pub fn new_document_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(DOCUMENT_ID_LEN);
    id
}
