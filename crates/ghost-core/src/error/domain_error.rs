//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{Handle, HandleParseError};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid handle: {0}")]
    InvalidHandle(#[from] HandleParseError),

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Cannot open a chat with yourself ({0})")]
    SelfChat(Handle),

    // =========================================================================
    // State Errors
    // =========================================================================
    #[error("No chat is open")]
    NoOpenChat,

    // =========================================================================
    // Collaborator Errors (wrapped)
    // =========================================================================
    #[error("Online snapshot unavailable: {0}")]
    SnapshotUnavailable(String),
}

impl DomainError {
    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidHandle(_) => "INVALID_HANDLE",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::SelfChat(_) => "SELF_CHAT",
            Self::NoOpenChat => "NO_OPEN_CHAT",
            Self::SnapshotUnavailable(_) => "SNAPSHOT_UNAVAILABLE",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidHandle(_) | Self::EmptyMessage | Self::SelfChat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::EmptyMessage.code(), "EMPTY_MESSAGE");
        assert_eq!(DomainError::NoOpenChat.code(), "NO_OPEN_CHAT");
        assert_eq!(
            DomainError::from(HandleParseError::NotNumeric).code(),
            "INVALID_HANDLE"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(DomainError::EmptyMessage.is_validation());
        assert!(DomainError::InvalidHandle(HandleParseError::Empty).is_validation());
        assert!(!DomainError::NoOpenChat.is_validation());
        assert!(!DomainError::SnapshotUnavailable("timeout".to_string()).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::SelfChat(Handle::parse("1234567").unwrap());
        assert_eq!(err.to_string(), "Cannot open a chat with yourself (1234567)");

        let err = DomainError::InvalidHandle(HandleParseError::NotNumeric);
        assert_eq!(err.to_string(), "Invalid handle: handle must contain only digits");
    }
}
