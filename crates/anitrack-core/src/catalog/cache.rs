//! Catalog cache
//!
//! Reuses the last fetched catalog until it is older than the TTL. A failed
//! refetch keeps the previous list available through `cached()`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{CatalogError, CatalogSource};
use crate::models::CatalogItem;

struct CachedList {
    fetched_at: Instant,
    items: Arc<Vec<CatalogItem>>,
}

/// TTL cache in front of a catalog source
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    cached: Mutex<Option<CachedList>>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Get the catalog, fetching only if the cached copy is missing or stale
    pub async fn get(&self) -> Result<Arc<Vec<CatalogItem>>, CatalogError> {
        let mut cached = self.cached.lock().await;

        if let Some(ref entry) = *cached {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!("Catalog cache hit ({} items)", entry.items.len());
                return Ok(Arc::clone(&entry.items));
            }
        }

        let items = Arc::new(self.source.fetch_top().await?);
        *cached = Some(CachedList {
            fetched_at: Instant::now(),
            items: Arc::clone(&items),
        });
        Ok(items)
    }

    /// Fetch regardless of cache age
    pub async fn refresh(&self) -> Result<Arc<Vec<CatalogItem>>, CatalogError> {
        let mut cached = self.cached.lock().await;
        let items = Arc::new(self.source.fetch_top().await?);
        *cached = Some(CachedList {
            fetched_at: Instant::now(),
            items: Arc::clone(&items),
        });
        Ok(items)
    }

    /// Last successfully fetched list, however old
    pub async fn cached(&self) -> Option<Arc<Vec<CatalogItem>>> {
        self.cached
            .lock()
            .await
            .as_ref()
            .map(|entry| Arc::clone(&entry.items))
    }
}
