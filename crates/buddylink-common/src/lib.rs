//! # buddylink-common
//!
//! Shared utilities: configuration, application errors and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, MessagingConfig,
    PresenceConfig, ServerConfig, SessionPolicy,
};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
