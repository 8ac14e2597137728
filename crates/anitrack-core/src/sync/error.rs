//! Watchlist sync errors and user notifications

use std::fmt;

use thiserror::Error;

use crate::storage::StoreError;

/// Remote store call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    Load,
    Create,
    Delete,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            RemoteOperation::Load => "load watchlist",
            RemoteOperation::Create => "add to watchlist",
            RemoteOperation::Delete => "remove from watchlist",
        };
        f.write_str(verb)
    }
}

/// Errors returned by the watchlist sync controller
#[derive(Error, Debug)]
pub enum SyncError {
    /// A mutation was attempted with nobody signed in
    #[error("Please log in to track anime")]
    Unauthenticated,

    /// The user id cannot address a watchlist
    #[error("Invalid user id '{0}'")]
    InvalidUserId(String),

    /// The store rejected or failed a call; local state was left unchanged
    #[error("Failed to {operation}: {source}")]
    RemoteCallFailed {
        operation: RemoteOperation,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    pub(crate) fn remote(operation: RemoteOperation, source: StoreError) -> Self {
        SyncError::RemoteCallFailed { operation, source }
    }

    /// Whether retrying the same call later can succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            SyncError::RemoteCallFailed { source, .. } => source.is_recoverable(),
            SyncError::Unauthenticated | SyncError::InvalidUserId(_) => false,
        }
    }

    /// What the user can do about a failed store call
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            SyncError::RemoteCallFailed { source, .. } => source.recovery_suggestion(),
            _ => None,
        }
    }

    /// Notification to show for this error
    pub fn to_notification(&self) -> Notification {
        match (self, self.recovery_suggestion()) {
            (SyncError::Unauthenticated, _) => Notification::blocking(self.to_string()),
            (_, Some(hint)) => Notification::error(format!("{}. {}", self, hint)),
            (_, None) => Notification::error(self.to_string()),
        }
    }
}

/// How urgently a notification should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Status-line message
    Info,
    /// Recoverable failure
    Error,
    /// Must be acknowledged before continuing
    Blocking,
}

/// A user-visible message emitted by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Blocking,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.level == NotificationLevel::Blocking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_is_blocking() {
        let n = SyncError::Unauthenticated.to_notification();
        assert!(n.is_blocking());
        assert_eq!(n.message, "Please log in to track anime");
    }

    #[test]
    fn test_remote_failure_message() {
        let err = SyncError::remote(
            RemoteOperation::Delete,
            StoreError::Unavailable("connection reset".to_string()),
        );
        let n = err.to_notification();

        assert_eq!(n.level, NotificationLevel::Error);
        assert!(n.message.contains("remove from watchlist"));
        assert!(n.message.contains("connection reset"));
        assert!(n.message.ends_with("Check that the store is reachable and try again."));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_malformed_document_has_hint_but_is_not_recoverable() {
        let err = SyncError::remote(
            RemoteOperation::Load,
            StoreError::MalformedDocument {
                doc_id: "abc".to_string(),
                details: "missing title".to_string(),
            },
        );

        assert!(!err.is_recoverable());
        assert_eq!(
            err.recovery_suggestion(),
            Some("Remove the broken entry from your watchlist and add it again.")
        );
    }

    #[test]
    fn test_invalid_user_id_has_no_hint() {
        let err = SyncError::InvalidUserId("a/b".to_string());
        assert!(err.recovery_suggestion().is_none());
        assert_eq!(err.to_notification().message, "Invalid user id 'a/b'");
    }
}
