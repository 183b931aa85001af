//! # ghost-api
//!
//! Client for the REST collaborator: authentication by external id and the
//! one-shot online snapshot consumed by the realtime layer.

mod client;
mod error;
mod models;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use models::{AuthRequest, OnlineSnapshot, UserProfile};
