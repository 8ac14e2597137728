//! SQLite watchlist store
//!
//! Persists watchlist documents in a local SQLite database. Fields are
//! stored as a JSON blob so a document is exactly what was written.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

use super::schema::{init_schema, needs_init};
use super::{new_document_id, CollectionPath, StoreError, StoreResult, StoredDocument, WatchlistStore};
use crate::models::EntryFields;

/// Watchlist store backed by SQLite
pub struct SqliteWatchlistStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteWatchlistStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(path)?;
        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        debug!("Opened watchlist store at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }

    /// Count documents across every collection
    pub fn document_count(&self) -> StoreResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[async_trait]
impl WatchlistStore for SqliteWatchlistStore {
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<StoredDocument>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT doc_id, fields FROM documents WHERE collection = ?1 ORDER BY seq")?;
        let rows = stmt
            .query_map([path.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, json)| {
                let fields: EntryFields =
                    serde_json::from_str(&json).map_err(|e| StoreError::MalformedDocument {
                        doc_id: id.clone(),
                        details: e.to_string(),
                    })?;
                Ok(StoredDocument { id, fields })
            })
            .collect()
    }

    async fn create(&self, path: &CollectionPath, fields: &EntryFields) -> StoreResult<String> {
        let json = serde_json::to_string(fields)?;
        let id = new_document_id();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (collection, doc_id, fields, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![path.to_string(), id, json, Utc::now().timestamp_millis()],
        )?;

        debug!("Created document {} in {}", id, path);
        Ok(id)
    }

    async fn delete(&self, path: &CollectionPath, doc_id: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![path.to_string(), doc_id],
        )?;

        debug!("Deleted {} document(s) {} from {}", removed, doc_id, path);
        Ok(())
    }

    fn location(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => ":memory:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogItem;
    use tempfile::TempDir;

    fn fields(mal_id: i64, title: &str) -> EntryFields {
        CatalogItem::new(mal_id, title, "img").fields()
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = SqliteWatchlistStore::open_in_memory().unwrap();
        let path = CollectionPath::watchlist("U1").unwrap();

        let a = store.create(&path, &fields(3, "Zeta")).await.unwrap();
        let b = store.create(&path, &fields(1, "Alpha")).await.unwrap();

        let docs = store.list(&path).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(docs[0].fields.title, "Zeta");
    }

    #[tokio::test]
    async fn test_duplicates_get_distinct_ids() {
        let store = SqliteWatchlistStore::open_in_memory().unwrap();
        let path = CollectionPath::watchlist("U1").unwrap();

        let a = store.create(&path, &fields(1, "Naruto")).await.unwrap();
        let b = store.create(&path, &fields(1, "Naruto")).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.list(&path).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_scoped_to_collection() {
        let store = SqliteWatchlistStore::open_in_memory().unwrap();
        let u1 = CollectionPath::watchlist("U1").unwrap();
        let u2 = CollectionPath::watchlist("U2").unwrap();

        let id = store.create(&u1, &fields(1, "Naruto")).await.unwrap();

        // Same id under another user's path leaves U1 untouched
        store.delete(&u2, &id).await.unwrap();
        assert_eq!(store.list(&u1).await.unwrap().len(), 1);

        store.delete(&u1, &id).await.unwrap();
        assert!(store.list(&u1).await.unwrap().is_empty());

        // Unknown id is not an error
        store.delete(&u1, &id).await.unwrap();
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("watchlist.db");
        let path = CollectionPath::watchlist("U1").unwrap();

        let id = {
            let store = SqliteWatchlistStore::open(&db_path).unwrap();
            store.create(&path, &fields(20, "Naruto")).await.unwrap()
        };

        let store = SqliteWatchlistStore::open(&db_path).unwrap();
        let docs = store.list(&path).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(store.document_count().unwrap(), 1);
        assert!(store.location().ends_with("watchlist.db"));
    }

    #[tokio::test]
    async fn test_malformed_document_is_reported() {
        let store = SqliteWatchlistStore::open_in_memory().unwrap();
        let path = CollectionPath::watchlist("U1").unwrap();

        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO documents (collection, doc_id, fields, created_at) VALUES (?1, 'bad', '{}', 0)",
                [path.to_string()],
            )
            .unwrap();

        let err = store.list(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedDocument { .. }));
    }
}
