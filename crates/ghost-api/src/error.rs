//! API client error types

use ghost_common::AppError;
use ghost_core::DomainError;
use thiserror::Error;

/// REST client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the response body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Base URL could not be combined with a path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Check if the server rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

impl From<ApiError> for DomainError {
    fn from(err: ApiError) -> Self {
        DomainError::SnapshotUnavailable(err.to_string())
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            AppError::Authentication(err.to_string())
        } else {
            AppError::Api(err.to_string())
        }
    }
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;
