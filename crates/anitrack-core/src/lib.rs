//! AniTrack Core Library
//!
//! This crate provides the core functionality for AniTrack, a personal
//! anime watchlist built on a public top-anime catalog.
//!
//! # Architecture
//!
//! - **Catalog**: read-only ranked list fetched over HTTP, cached with a TTL
//! - **Identity**: who is signed in, observed through a watch channel
//! - **Storage**: per-user document collections behind `WatchlistStore`
//! - **Sync**: keeps the in-memory watchlist consistent with the store
//!
//! The watchlist state is never persisted locally; it is always rebuilt from
//! the store when the identity changes.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = Arc::new(SqliteWatchlistStore::open(&config.store_path())?);
//! let identity = LocalIdentityProvider::from_config(&config, None)?;
//!
//! let controller = Arc::new(WatchlistSyncController::new(store));
//! controller.on_identity_changed(identity.current()).await?;
//!
//! // Add the top-ranked anime
//! let items = catalog.get().await?;
//! controller.add_to_watchlist(&items[0]).await?;
//! ```
//!
//! # Modules
//!
//! - `catalog`: top-anime client and cache
//! - `config`: Application configuration
//! - `identity`: Sign-in provider
//! - `models`: Catalog items, watchlist entries, identities
//! - `storage`: Watchlist document stores
//! - `sync`: Watchlist sync controller

pub mod catalog;
pub mod config;
pub mod identity;
pub mod models;
pub mod storage;
pub mod sync;

pub use catalog::{CatalogCache, CatalogError, CatalogSource, RemoteCatalogClient};
pub use config::Config;
pub use identity::{IdentityError, IdentityProvider, LocalIdentityProvider};
pub use models::{CatalogItem, EntryFields, Identity, WatchlistEntry};
pub use storage::{
    CollectionPath, InMemoryWatchlistStore, SqliteWatchlistStore, StoreError, WatchlistStore,
};
pub use sync::{
    LoadOutcome, Notification, NotificationLevel, RemoteOperation, SessionState, SyncError,
    WatchlistPhase, WatchlistSnapshot, WatchlistState, WatchlistSyncController,
};
