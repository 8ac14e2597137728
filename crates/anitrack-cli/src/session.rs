//! Wiring for commands and the TUI
//!
//! Builds the store, identity provider, catalog cache and sync controller
//! from the configuration, and owns them for the lifetime of a run.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use anitrack_core::{
    CatalogCache, Config, IdentityProvider, InMemoryWatchlistStore, LocalIdentityProvider,
    RemoteCatalogClient, SqliteWatchlistStore, WatchlistStore, WatchlistSyncController,
};

/// Everything a command needs
pub struct Session {
    pub config: Config,
    pub store: Arc<dyn WatchlistStore>,
    pub identity: Arc<LocalIdentityProvider>,
    pub controller: Arc<WatchlistSyncController>,
    pub catalog: Arc<CatalogCache>,
}

impl Session {
    /// Build a session
    ///
    /// `user` overrides the configured profile for sign-in. With `ephemeral`
    /// the watchlist lives in memory and is gone when the process exits.
    pub fn open(config: Config, user: Option<String>, ephemeral: bool) -> Result<Self> {
        let store: Arc<dyn WatchlistStore> = if ephemeral {
            debug!("Using in-memory watchlist store");
            Arc::new(InMemoryWatchlistStore::new())
        } else {
            config
                .ensure_data_dir()
                .context("Failed to create data directory")?;
            let path = config.store_path();
            Arc::new(
                SqliteWatchlistStore::open(&path)
                    .with_context(|| format!("Failed to open watchlist store at {:?}", path))?,
            )
        };

        let identity = Arc::new(
            LocalIdentityProvider::from_config(&config, user)
                .context("Failed to restore session")?,
        );

        let client = RemoteCatalogClient::new(&config.catalog_url, config.request_timeout())
            .context("Invalid catalog configuration")?;
        let catalog = Arc::new(CatalogCache::new(Arc::new(client), config.catalog_ttl()));

        let controller = Arc::new(WatchlistSyncController::new(Arc::clone(&store)));

        Ok(Self {
            config,
            store,
            identity,
            controller,
            catalog,
        })
    }

    /// Load the watchlist for the restored session, if any
    pub async fn restore(&self) -> Result<()> {
        self.controller
            .on_identity_changed(self.identity.current())
            .await
            .context("Failed to load watchlist")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_open_creates_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let session = Session::open(config.clone(), Some("U1".to_string()), false).unwrap();

        assert!(config.store_path().exists());
        assert_eq!(session.identity.profile(), Some("U1"));
        assert!(session.identity.current().is_none());
    }

    #[tokio::test]
    async fn test_restore_signed_in_session() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let first = Session::open(config.clone(), Some("U1".to_string()), false).unwrap();
        let identity = first.identity.sign_in().await.unwrap();
        first.controller.on_identity_changed(Some(identity)).await.unwrap();
        first
            .controller
            .add_to_watchlist(&anitrack_core::CatalogItem::new(1, "Naruto", "x"))
            .await
            .unwrap();
        drop(first);

        let second = Session::open(config, None, false).unwrap();
        second.restore().await.unwrap();

        let entries = second.controller.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Naruto");
    }

    #[tokio::test]
    async fn test_ephemeral_skips_disk_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let session = Session::open(config.clone(), None, true).unwrap();

        assert!(!config.store_path().exists());
        assert_eq!(session.store.location(), "in-memory");
    }
}
