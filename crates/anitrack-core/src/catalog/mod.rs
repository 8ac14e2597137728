//! Top-anime catalog
//!
//! Read-only access to the ranked anime list:
//!
//! - `RemoteCatalogClient`: HTTP client for the public endpoint
//! - `CatalogCache`: TTL cache the calling layer puts in front of it
//!
//! ## Usage
//!
//! ```ignore
//! let client = RemoteCatalogClient::new(&config.catalog_url, config.request_timeout())?;
//! let cache = CatalogCache::new(Arc::new(client), config.catalog_ttl());
//! let items = cache.get().await?;
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::models::CatalogItem;

mod cache;
mod client;

pub use cache::CatalogCache;
pub use client::{parse_top_anime, RemoteCatalogClient};

/// Errors fetching the catalog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Invalid catalog URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("Catalog request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Unable to connect to catalog server at {0}")]
    Connect(String),

    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Catalog API error: HTTP {0}")]
    Status(u16),

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

/// Anything that can produce the ranked catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_top(&self) -> Result<Vec<CatalogItem>, CatalogError>;
}

/// Find an item by MyAnimeList id
pub fn find_item(items: &[CatalogItem], mal_id: i64) -> Option<&CatalogItem> {
    items.iter().find(|item| item.mal_id == mal_id)
}
