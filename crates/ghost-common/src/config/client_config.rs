//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use ghost_core::Handle;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    /// External id used to authenticate against the REST collaborator
    pub telegram_id: Option<String>,
    /// Pre-assigned handle; skips authentication when set
    pub identity: Option<Handle>,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// REST collaborator configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    pub timeout: Duration,
}

/// Realtime session timers and relay address
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Relay base URL; the endpoint is `<ws_url>/ws/<identity>`
    pub ws_url: String,
    pub reconnect_delay: Duration,
    pub heartbeat_interval: Duration,
    pub typing_throttle: Duration,
    pub typing_idle: Duration,
    pub typing_expiry: Duration,
    /// Capacity of the UI event channel
    pub event_buffer: usize,
}

impl RealtimeConfig {
    /// Build the connection endpoint for an identity
    #[must_use]
    pub fn endpoint(&self, identity: &Handle) -> String {
        format!("{}/ws/{}", self.ws_url.trim_end_matches('/'), identity)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            reconnect_delay: Duration::from_millis(default_reconnect_delay_ms()),
            heartbeat_interval: Duration::from_millis(default_heartbeat_interval_ms()),
            typing_throttle: Duration::from_millis(default_typing_throttle_ms()),
            typing_idle: Duration::from_millis(default_typing_idle_ms()),
            typing_expiry: Duration::from_millis(default_typing_expiry_ms()),
            event_buffer: default_event_buffer(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "ghostchat".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_url() -> String {
    "http://127.0.0.1:8001/api".to_string()
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:8001".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_typing_throttle_ms() -> u64 {
    2_000
}

fn default_typing_idle_ms() -> u64 {
    3_000
}

fn default_typing_expiry_ms() -> u64 {
    3_000
}

fn default_event_buffer() -> usize {
    256
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(s) => match s.to_lowercase().as_str() {
                "production" => Environment::Production,
                "staging" => Environment::Staging,
                "development" => Environment::Development,
                _ => return Err(ConfigError::InvalidValue("APP_ENV", s)),
            },
            None => default_env(),
        };

        let identity = lookup("GHOSTCHAT_IDENTITY")
            .map(|s| {
                Handle::parse(s.trim()).map_err(|e| {
                    ConfigError::InvalidValue("GHOSTCHAT_IDENTITY", format!("{s}: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ApiConfig {
                base_url: lookup("GHOSTCHAT_API_URL").unwrap_or_else(default_api_url),
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "GHOSTCHAT_HTTP_TIMEOUT_SECS",
                    default_http_timeout_secs(),
                )?),
            },
            realtime: RealtimeConfig {
                ws_url: lookup("GHOSTCHAT_WS_URL").unwrap_or_else(default_ws_url),
                reconnect_delay: millis_or(&lookup, "GHOSTCHAT_RECONNECT_DELAY_MS", default_reconnect_delay_ms())?,
                heartbeat_interval: millis_or(&lookup, "GHOSTCHAT_HEARTBEAT_INTERVAL_MS", default_heartbeat_interval_ms())?,
                typing_throttle: millis_or(&lookup, "GHOSTCHAT_TYPING_THROTTLE_MS", default_typing_throttle_ms())?,
                typing_idle: millis_or(&lookup, "GHOSTCHAT_TYPING_IDLE_MS", default_typing_idle_ms())?,
                typing_expiry: millis_or(&lookup, "GHOSTCHAT_TYPING_EXPIRY_MS", default_typing_expiry_ms())?,
                event_buffer: non_zero_or(&lookup, "GHOSTCHAT_EVENT_BUFFER", default_event_buffer())?,
            },
            telegram_id: lookup("GHOSTCHAT_TELEGRAM_ID").filter(|s| !s.trim().is_empty()),
            identity,
        })
    }
}

/// Parse an optional variable, falling back to a default only when it is absent
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Parse a variable that must be non-zero
fn non_zero_or<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::InvalidValue(key, "must be greater than zero".to_string())),
        value => Ok(value),
    }
}

/// Parse a non-zero millisecond duration
fn millis_or<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::InvalidValue(key, "must be greater than zero".to_string())),
        ms => Ok(Duration::from_millis(ms)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
