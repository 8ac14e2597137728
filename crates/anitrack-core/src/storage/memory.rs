//! In-memory watchlist store
//!
//! Keeps every collection in a map guarded by a mutex. Used by tests and by
//! `--ephemeral` sessions where nothing should touch disk.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{new_document_id, CollectionPath, StoreError, StoreResult, StoredDocument, WatchlistStore};
use crate::models::EntryFields;

/// Watchlist store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryWatchlistStore {
    collections: Mutex<HashMap<CollectionPath, Vec<StoredDocument>>>,
}

impl InMemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, path: &CollectionPath) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(path).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, path: &CollectionPath) -> bool {
        self.len(path) == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl WatchlistStore for InMemoryWatchlistStore {
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.collections.lock().map_err(|_| Self::poisoned())?;
        Ok(collections.get(path).cloned().unwrap_or_default())
    }

    async fn create(&self, path: &CollectionPath, fields: &EntryFields) -> StoreResult<String> {
        let mut collections = self.collections.lock().map_err(|_| Self::poisoned())?;
        let id = new_document_id();
        collections
            .entry(path.clone())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            });
        Ok(id)
    }

    async fn delete(&self, path: &CollectionPath, doc_id: &str) -> StoreResult<()> {
        let mut collections = self.collections.lock().map_err(|_| Self::poisoned())?;
        if let Some(docs) = collections.get_mut(path) {
            docs.retain(|d| d.id != doc_id);
        }
        Ok(())
    }

    fn location(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogItem;

    fn naruto() -> EntryFields {
        CatalogItem::new(1, "Naruto", "x").fields()
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = InMemoryWatchlistStore::new();
        let path = CollectionPath::watchlist("U1").unwrap();

        let id = store.create(&path, &naruto()).await.unwrap();
        let docs = store.list(&path).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].fields.title, "Naruto");
    }

    #[tokio::test]
    async fn test_collections_are_per_user() {
        let store = InMemoryWatchlistStore::new();
        let u1 = CollectionPath::watchlist("U1").unwrap();
        let u2 = CollectionPath::watchlist("U2").unwrap();

        store.create(&u1, &naruto()).await.unwrap();

        assert_eq!(store.len(&u1), 1);
        assert!(store.is_empty(&u2));
        assert!(store.list(&u2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_ok() {
        let store = InMemoryWatchlistStore::new();
        let path = CollectionPath::watchlist("U1").unwrap();

        store.delete(&path, "missing").await.unwrap();

        let id = store.create(&path, &naruto()).await.unwrap();
        store.delete(&path, &id).await.unwrap();
        assert!(store.is_empty(&path));
    }
}
