//! Request and response bodies of the REST collaborator

use ghost_core::Handle;
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/telegram`
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<String>,
    /// Signed init data, validated server-side when no id is given
    #[serde(skip_serializing_if = "String::is_empty")]
    pub init_data: String,
}

impl AuthRequest {
    /// Authenticate by a known external id
    pub fn by_id(telegram_id: impl Into<String>) -> Self {
        Self {
            telegram_id: Some(telegram_id.into()),
            init_data: String::new(),
        }
    }

    /// Authenticate by signed init data
    pub fn by_init_data(init_data: impl Into<String>) -> Self {
        Self {
            telegram_id: None,
            init_data: init_data.into(),
        }
    }
}

/// User profile as returned by the authentication endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub telegram_id: String,
    /// The pseudonymous handle used on the realtime connection
    pub anonymous_id: Handle,
    pub name: Option<String>,
    pub status: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default = "default_notifications")]
    pub notifications_enabled: bool,
    pub created_at: String,
}

fn default_notifications() -> bool {
    true
}

/// Body of `GET /online`
///
/// Kept as raw strings: one malformed entry must not discard the whole snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnlineSnapshot {
    pub online: Vec<String>,
}

impl OnlineSnapshot {
    /// Valid handles in the snapshot; malformed entries are skipped
    pub fn handles(&self) -> Vec<Handle> {
        self.online
            .iter()
            .filter_map(|raw| match Handle::parse(raw) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::debug!(entry = %raw, error = %e, "Skipping malformed snapshot entry");
                    None
                }
            })
            .collect()
    }
}
