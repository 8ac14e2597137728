//! Watchlist synchronization
//!
//! Keeps the signed-in user's watchlist in memory and in step with the
//! remote store.
//!
//! ## Usage
//!
//! ```ignore
//! let controller = Arc::new(WatchlistSyncController::new(store));
//! let mut events = controller.take_events().unwrap();
//! controller.spawn_identity_listener(identity.subscribe());
//!
//! controller.add_to_watchlist(&item).await?;
//! ```

mod controller;
mod error;
mod state;

pub use controller::{LoadOutcome, WatchlistSyncController};
pub use error::{Notification, NotificationLevel, RemoteOperation, SyncError};
pub use state::{SessionState, WatchlistPhase, WatchlistSnapshot, WatchlistState};
