//! Application error types
//!
//! Unified error handling for the client binary. Library crates keep their own
//! error enums; they are folded into `AppError` at the edge.

use crate::config::ConfigError;
use crate::telemetry::TracingError;
use ghost_core::DomainError;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Startup errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracing error: {0}")]
    Tracing(#[from] TracingError),

    #[error("No identity: set GHOSTCHAT_IDENTITY or GHOSTCHAT_TELEGRAM_ID")]
    MissingIdentity,

    // Collaborator errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {0}")]
    Api(String),

    // Realtime errors
    #[error("Session closed")]
    SessionClosed,

    // Input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get a stable error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Tracing(_) => "TRACING_ERROR",
            Self::MissingIdentity => "MISSING_IDENTITY",
            Self::Authentication(_) => "AUTHENTICATION_FAILED",
            Self::Api(_) => "API_ERROR",
            Self::SessionClosed => "SESSION_CLOSED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the user can fix this by changing input
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::InvalidInput(_) => true,
            Self::Domain(e) => e.is_validation(),
            _ => false,
        }
    }

    /// Create an invalid input error
    #[must_use]
    pub fn invalid_input(msg: impl fmt::Display) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
