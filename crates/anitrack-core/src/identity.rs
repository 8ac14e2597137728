//! Identity and sign-in management
//!
//! The `IdentityProvider` trait is what the watchlist core sees of
//! authentication: sign in, sign out, and a stream of identity changes.
//!
//! `LocalIdentityProvider` keeps a single signed-in profile in
//! `{data_dir}/session.json`, so a session survives between invocations.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::Identity;

/// Errors from the identity provider
#[derive(Error, Debug)]
pub enum IdentityError {
    /// No profile name configured or given
    #[error("No profile to sign in as. Pass --user NAME or set `user` in the config.")]
    MissingProfile,

    /// Profile name cannot be used as a user id
    #[error("Invalid profile name '{0}': must be non-empty and must not contain '/'")]
    InvalidProfile(String),

    /// Failed to read the session file
    #[error("Failed to read session '{path}': {source}")]
    ReadSession {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write or remove the session file
    #[error("Failed to write session '{path}': {source}")]
    WriteSession {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Session file exists but cannot be parsed
    #[error("Session file '{path}' is corrupt: {details}. Sign in again to replace it.")]
    CorruptSession { path: PathBuf, details: String },
}

/// Authentication collaborator
///
/// `subscribe` mirrors an auth-state listener: a new receiver sees the
/// current identity immediately and every change after that.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Start a session and return the signed-in identity
    async fn sign_in(&self) -> Result<Identity, IdentityError>;

    /// End the current session (no-op if signed out)
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// The identity of the current session, if any
    fn current(&self) -> Option<Identity>;

    /// Watch identity changes
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// File-backed single-profile identity provider
pub struct LocalIdentityProvider {
    session_path: PathBuf,
    profile: Option<String>,
    state: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    /// Open the provider, restoring a saved session if present
    pub fn open(session_path: PathBuf, profile: Option<String>) -> Result<Self, IdentityError> {
        let restored = load_session(&session_path)?;
        if let Some(ref identity) = restored {
            debug!("Restored session for {}", identity.user_id);
        }

        let (state, _) = watch::channel(restored);
        Ok(Self {
            session_path,
            profile,
            state,
        })
    }

    /// Open using the configured session path
    ///
    /// Profile precedence: explicit override, then config `user`, then `$USER`.
    pub fn from_config(config: &Config, profile: Option<String>) -> Result<Self, IdentityError> {
        let profile = profile
            .or_else(|| config.user.clone())
            .or_else(|| std::env::var("USER").ok());
        Self::open(config.session_path(), profile)
    }

    /// Profile this provider signs in as
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self) -> Result<Identity, IdentityError> {
        let profile = self
            .profile
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(IdentityError::MissingProfile)?;

        if profile.contains('/') {
            return Err(IdentityError::InvalidProfile(profile.to_string()));
        }

        // Signing in again as the same profile keeps the existing session
        if let Some(existing) = self.current() {
            if existing.user_id == profile {
                return Ok(existing);
            }
        }

        let identity = Identity::new(profile, profile);
        save_session(&self.session_path, &identity)?;

        info!("Signed in as {}", identity.user_id);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(IdentityError::WriteSession {
                    path: self.session_path.clone(),
                    source,
                })
            }
        }

        if self.state.send_replace(None).is_some() {
            info!("Signed out");
        }
        Ok(())
    }

    fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}

fn load_session(path: &Path) -> Result<Option<Identity>, IdentityError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(IdentityError::ReadSession {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| IdentityError::CorruptSession {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
}

/// Write the session via a temp file and rename so it is never half-written
fn save_session(path: &Path, identity: &Identity) -> Result<(), IdentityError> {
    let write_err = |source: io::Error| IdentityError::WriteSession {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_vec_pretty(identity)
        .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).map_err(write_err)?;
    file.write_all(&json).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    fs::rename(&temp_path, path).map_err(write_err)?;

    Ok(())
}
