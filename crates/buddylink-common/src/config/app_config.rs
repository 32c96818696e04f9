//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub presence: PresenceConfig,
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub worker_id: u16,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
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

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// PostgreSQL configuration. Absent means the in-memory store is used.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// What to do when a user who is already online authenticates again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPolicy {
    /// The newer connection takes over; the displaced one is told and closed
    #[default]
    Replace,
    /// The second handshake is refused while the first session is live
    Reject,
}

impl FromStr for SessionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "reject" => Ok(Self::Reject),
            other => Err(ConfigError::InvalidValue("SESSION_POLICY", other.to_string())),
        }
    }
}

/// Session registry and presence settings
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub session_policy: SessionPolicy,
    /// How often the gateway pings each connection
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
    /// A connection that sends nothing for this long is dropped
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Bounded outbound queue per connection
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl PresenceConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    /// Never shorter than one heartbeat interval
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs).max(self.heartbeat_interval())
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            session_policy: SessionPolicy::default(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            idle_timeout_secs: default_idle_timeout(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

/// Instant-messaging settings
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_message_max_length")]
    pub max_length: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            max_length: default_message_max_length(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "buddylink".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    90
}

fn default_outbound_buffer() -> usize {
    100
}

fn default_message_max_length() -> usize {
    2000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            }),
            _ => None,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_or(&lookup, "APP_ENV", Environment::default)?,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_required(&lookup, "GATEWAY_PORT")?,
            },
            database,
            presence: PresenceConfig {
                sweep_interval_secs: parse_or(&lookup, "SWEEP_INTERVAL_SECS", default_sweep_interval)?,
                session_policy: parse_or(&lookup, "SESSION_POLICY", SessionPolicy::default)?,
                heartbeat_interval_secs: parse_or(
                    &lookup,
                    "HEARTBEAT_INTERVAL_SECS",
                    default_heartbeat_interval,
                )?,
                idle_timeout_secs: parse_or(&lookup, "IDLE_TIMEOUT_SECS", default_idle_timeout)?,
                outbound_buffer: parse_or(&lookup, "OUTBOUND_BUFFER", default_outbound_buffer)?,
            },
            messaging: MessagingConfig {
                max_length: parse_or(&lookup, "MESSAGE_MAX_LENGTH", default_message_max_length)?,
            },
            worker_id: parse_or(&lookup, "WORKER_ID", || 0)?,
        })
    }
}

fn parse_required<F, T>(lookup: &F, key: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key).ok_or(ConfigError::MissingVar(key))?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key, raw))
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
