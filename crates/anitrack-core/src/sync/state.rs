//! In-memory watchlist state
//!
//! Holds the session state, the loaded entries, and the identity generation
//! used to discard results that belong to an earlier identity.

use crate::models::{Identity, WatchlistEntry};

/// Sign-in lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

/// Watchlist load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistPhase {
    /// Nobody signed in
    Empty,
    /// Identity present, first load not finished
    Loading,
    /// Entries reflect the remote collection
    Loaded,
}

/// Immutable copy of the state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistSnapshot {
    pub session: SessionState,
    pub phase: WatchlistPhase,
    pub identity: Option<Identity>,
    pub entries: Vec<WatchlistEntry>,
    /// Message from the last failed load, cleared by the next success
    pub last_error: Option<String>,
    pub generation: u64,
}

/// Mutable state owned by the sync controller
#[derive(Debug)]
pub struct WatchlistState {
    session: SessionState,
    phase: WatchlistPhase,
    identity: Option<Identity>,
    entries: Vec<WatchlistEntry>,
    last_error: Option<String>,
    generation: u64,
}

impl Default for WatchlistState {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistState {
    pub fn new() -> Self {
        Self {
            session: SessionState::LoggedOut,
            phase: WatchlistPhase::Empty,
            identity: None,
            entries: Vec::new(),
            last_error: None,
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> WatchlistSnapshot {
        WatchlistSnapshot {
            session: self.session,
            phase: self.phase,
            identity: self.identity.clone(),
            entries: self.entries.clone(),
            last_error: self.last_error.clone(),
            generation: self.generation,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn phase(&self) -> WatchlistPhase {
        self.phase
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch to a new identity (or none) and start a new generation
    ///
    /// Entries are always cleared: they belonged to the previous identity.
    pub fn set_identity(&mut self, identity: Option<Identity>) -> u64 {
        self.generation += 1;
        self.entries.clear();
        self.last_error = None;

        match identity {
            Some(identity) => {
                self.session = SessionState::LoggedIn;
                self.phase = WatchlistPhase::Loading;
                self.identity = Some(identity);
            }
            None => {
                self.session = SessionState::LoggedOut;
                self.phase = WatchlistPhase::Empty;
                self.identity = None;
            }
        }

        self.generation
    }

    pub fn begin_sign_in(&mut self) {
        if self.session == SessionState::LoggedOut {
            self.session = SessionState::LoggingIn;
        }
    }

    pub fn begin_sign_out(&mut self) {
        if self.session == SessionState::LoggedIn {
            self.session = SessionState::LoggingOut;
        }
    }

    /// Undo `begin_sign_in` / `begin_sign_out` after a provider failure
    pub fn settle_session(&mut self) {
        self.session = if self.identity.is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        };
    }

    /// Whether `user_id` is the signed-in user
    pub fn is_current_user(&self, user_id: &str) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.user_id == user_id)
    }

    /// Whether a result started at `generation` still applies
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn mark_loading(&mut self) {
        if self.identity.is_some() && self.phase == WatchlistPhase::Empty {
            self.phase = WatchlistPhase::Loading;
        }
    }

    /// Replace all entries with a fresh load
    pub fn replace_entries(&mut self, entries: Vec<WatchlistEntry>) {
        self.entries = entries;
        self.phase = WatchlistPhase::Loaded;
        self.last_error = None;
    }

    pub fn record_load_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn push_entry(&mut self, entry: WatchlistEntry) {
        self.entries.push(entry);
    }

    pub fn contains(&self, entry_id: &str) -> bool {
        self.entries.iter().any(|e| e.id == entry_id)
    }

    /// Remove an entry by id, returning it if present
    pub fn remove_entry(&mut self, entry_id: &str) -> Option<WatchlistEntry> {
        let pos = self.entries.iter().position(|e| e.id == entry_id)?;
        Some(self.entries.remove(pos))
    }
}
