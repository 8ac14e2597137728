//! Watchlist sync controller
//!
//! Keeps the in-memory watchlist consistent with the signed-in user's remote
//! collection. Loads, adds and removes run one at a time in submission order.
//! Identity changes do not wait for them: they start a new generation
//! immediately, and any result captured under an older generation is dropped
//! instead of applied.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::{Notification, RemoteOperation, SyncError};
use super::state::{WatchlistSnapshot, WatchlistState};
use crate::models::{CatalogItem, Identity, WatchlistEntry};
use crate::storage::{CollectionPath, WatchlistStore};

/// Result of a watchlist load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// State replaced with this many entries
    Applied(usize),
    /// Identity changed while the load was in flight
    Discarded,
    /// The user is not the signed-in identity, nothing was fetched
    Skipped,
}

/// Coordinates identity, watchlist state and the remote store
pub struct WatchlistSyncController {
    store: Arc<dyn WatchlistStore>,
    state: Mutex<WatchlistState>,
    /// FIFO turn for load/add/remove
    turn: tokio::sync::Mutex<()>,
    snapshot_tx: watch::Sender<WatchlistSnapshot>,
    event_tx: mpsc::UnboundedSender<Notification>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<Notification>>>,
}

impl WatchlistSyncController {
    pub fn new(store: Arc<dyn WatchlistStore>) -> Self {
        let state = WatchlistState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            store,
            state: Mutex::new(state),
            turn: tokio::sync::Mutex::new(()),
            snapshot_tx,
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
        }
    }

    /// Take the notification receiver
    ///
    /// Can only be called once; subsequent calls return None.
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<Notification>> {
        self.event_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Watch state snapshots
    pub fn subscribe(&self) -> watch::Receiver<WatchlistSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> WatchlistSnapshot {
        self.read(|state| state.snapshot())
    }

    pub fn entries(&self) -> Vec<WatchlistEntry> {
        self.read(|state| state.entries().to_vec())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read(|state| state.identity().cloned())
    }

    pub fn begin_sign_in(&self) {
        self.update(|state| state.begin_sign_in());
    }

    pub fn begin_sign_out(&self) {
        self.update(|state| state.begin_sign_out());
    }

    /// Return to a settled session after the provider failed to sign in
    pub fn sign_in_failed(&self, error: &dyn fmt::Display) {
        warn!("Sign-in failed: {}", error);
        self.update(|state| state.settle_session());
        self.notify(Notification::error(format!("Sign-in failed: {}", error)));
    }

    /// Return to a settled session after the provider failed to sign out
    pub fn sign_out_failed(&self, error: &dyn fmt::Display) {
        warn!("Sign-out failed: {}", error);
        self.update(|state| state.settle_session());
        self.notify(Notification::error(format!("Sign-out failed: {}", error)));
    }

    /// React to a new identity (or none)
    ///
    /// With an identity the watchlist is reloaded for that user. Without one
    /// the state is cleared right away, without waiting for in-flight calls.
    pub async fn on_identity_changed(&self, identity: Option<Identity>) -> Result<(), SyncError> {
        match self.apply_identity(identity) {
            Some(user_id) => self.load_watchlist(&user_id).await.map(|_| ()),
            None => Ok(()),
        }
    }

    /// Record the identity and bump the generation, returning the user to load
    fn apply_identity(&self, identity: Option<Identity>) -> Option<String> {
        let user_id = identity.as_ref().map(|i| i.user_id.clone());
        let generation = self.update(|state| state.set_identity(identity));

        match user_id {
            Some(ref id) => info!("Identity changed to {} (generation {})", id, generation),
            None => info!("Signed out, watchlist cleared (generation {})", generation),
        }
        user_id
    }

    /// Replace the watchlist with the remote collection for `user_id`
    ///
    /// The result is applied only if `user_id` is still the signed-in user
    /// and no identity change happened while the fetch was in flight. On
    /// failure the state is left as it was and the error is both returned
    /// and emitted as a notification.
    pub async fn load_watchlist(&self, user_id: &str) -> Result<LoadOutcome, SyncError> {
        let path = collection_for(user_id)?;
        let _turn = self.turn.lock().await;

        let generation = self.update(|state| {
            if !state.is_current_user(user_id) {
                return None;
            }
            state.mark_loading();
            Some(state.generation())
        });
        let Some(generation) = generation else {
            debug!("Skipping load for {}: not the signed-in user", user_id);
            return Ok(LoadOutcome::Skipped);
        };

        debug!("Loading {}", path);
        match self.store.list(&path).await {
            Ok(documents) => {
                let entries: Vec<WatchlistEntry> = documents
                    .into_iter()
                    .map(|doc| WatchlistEntry::from_document(doc.id, doc.fields))
                    .collect();
                let count = entries.len();

                let applied = self.update(|state| {
                    if !state.is_current(generation) {
                        return false;
                    }
                    state.replace_entries(entries);
                    true
                });

                if applied {
                    info!("Loaded {} watchlist entries for {}", count, user_id);
                    Ok(LoadOutcome::Applied(count))
                } else {
                    debug!("Discarding load for {}: identity changed", user_id);
                    Ok(LoadOutcome::Discarded)
                }
            }
            Err(e) => {
                let err = SyncError::remote(RemoteOperation::Load, e);
                warn!("{} at {} (recoverable: {})", err, path, err.is_recoverable());
                let message = err.to_string();
                self.update(|state| {
                    if state.is_current(generation) {
                        state.record_load_error(message);
                    }
                });
                self.notify(err.to_notification());
                Err(err)
            }
        }
    }

    /// Reload the signed-in user's watchlist
    pub async fn reload(&self) -> Result<LoadOutcome, SyncError> {
        match self.identity() {
            Some(identity) => self.load_watchlist(&identity.user_id).await,
            None => Ok(LoadOutcome::Skipped),
        }
    }

    /// Append a catalog item to the signed-in user's watchlist
    ///
    /// Fails with `Unauthenticated` (and a blocking notification) when nobody
    /// is signed in; no remote call is made in that case. Only
    /// `mal_id`, `title` and `image_url` are stored.
    pub async fn add_to_watchlist(&self, item: &CatalogItem) -> Result<WatchlistEntry, SyncError> {
        if self.identity().is_none() {
            return Err(self.unauthenticated());
        }

        let _turn = self.turn.lock().await;

        // Identity may have changed while waiting for the turn
        let Some((identity, generation)) =
            self.read(|state| state.identity().cloned().map(|i| (i, state.generation())))
        else {
            return Err(self.unauthenticated());
        };
        let path = collection_for(&identity.user_id)?;
        let fields = item.fields();

        let id = match self.store.create(&path, &fields).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to add {} to {}: {}", item.mal_id, path, e);
                let err = SyncError::remote(RemoteOperation::Create, e);
                self.notify(err.to_notification());
                return Err(err);
            }
        };

        let entry = WatchlistEntry::from_document(id, fields);
        let applied = self.update(|state| {
            if !state.is_current(generation) {
                return false;
            }
            state.push_entry(entry.clone());
            true
        });

        if applied {
            info!("Added {} ({}) as {}", entry.title, entry.mal_id, entry.id);
            self.notify(Notification::info(format!("Added {} to watchlist", entry.title)));
        } else {
            debug!("Created {} but identity changed; not applied", entry.id);
        }
        Ok(entry)
    }

    /// Remove an entry from the signed-in user's watchlist by document id
    ///
    /// Returns `Ok(false)` without any remote call when nobody is signed in
    /// or the id is not in the watchlist.
    pub async fn remove_from_watchlist(&self, entry_id: &str) -> Result<bool, SyncError> {
        let _turn = self.turn.lock().await;

        let target = self.read(|state| {
            let identity = state.identity()?.clone();
            if !state.contains(entry_id) {
                return None;
            }
            Some((identity, state.generation()))
        });
        let Some((identity, generation)) = target else {
            debug!("Remove {}: not in watchlist", entry_id);
            return Ok(false);
        };
        let path = collection_for(&identity.user_id)?;

        if let Err(e) = self.store.delete(&path, entry_id).await {
            warn!("Failed to remove {} from {}: {}", entry_id, path, e);
            let err = SyncError::remote(RemoteOperation::Delete, e);
            self.notify(err.to_notification());
            return Err(err);
        }

        let removed = self.update(|state| {
            if !state.is_current(generation) {
                return None;
            }
            state.remove_entry(entry_id)
        });

        match removed {
            Some(entry) => {
                info!("Removed {} ({})", entry.title, entry.id);
                self.notify(Notification::info(format!(
                    "Removed {} from watchlist",
                    entry.title
                )));
                Ok(true)
            }
            None => {
                debug!("Deleted {} but identity changed; not applied", entry_id);
                Ok(false)
            }
        }
    }

    /// Forward identity changes from a provider subscription
    ///
    /// The current value is applied first. Each change is applied in order;
    /// the reload it triggers runs on its own task so a slow load never
    /// delays the next change. The task ends when the provider is dropped.
    pub fn spawn_identity_listener(
        self: &Arc<Self>,
        mut identities: watch::Receiver<Option<Identity>>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();
                if let Some(user_id) = controller.apply_identity(identity) {
                    let loader = Arc::clone(&controller);
                    tokio::spawn(async move {
                        // Failures already reach the user as notifications
                        if let Err(e) = loader.load_watchlist(&user_id).await {
                            debug!("Load after identity change failed: {}", e);
                        }
                    });
                }

                if identities.changed().await.is_err() {
                    debug!("Identity provider closed");
                    break;
                }
            }
        })
    }

    fn unauthenticated(&self) -> SyncError {
        let err = SyncError::Unauthenticated;
        self.notify(err.to_notification());
        err
    }

    fn notify(&self, notification: Notification) {
        let _ = self.event_tx.send(notification);
    }

    fn read<R>(&self, f: impl FnOnce(&WatchlistState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate state and publish the resulting snapshot
    fn update<R>(&self, f: impl FnOnce(&mut WatchlistState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        self.snapshot_tx.send_replace(state.snapshot());
        result
    }
}

fn collection_for(user_id: &str) -> Result<CollectionPath, SyncError> {
    CollectionPath::watchlist(user_id).map_err(|_| SyncError::InvalidUserId(user_id.to_string()))
}
