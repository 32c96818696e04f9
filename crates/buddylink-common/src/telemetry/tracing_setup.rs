//! Tracing and logging setup
//!
//! `RUST_LOG` wins when set. Otherwise the buddylink crates log at the
//! configured level and the infrastructure crates are held at `warn`.

use crate::config::Environment;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Crates that are noisy at debug level
const QUIET_TARGETS: &[&str] = &["sqlx", "tower_http", "hyper", "tungstenite"];

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for buddylink crates when `RUST_LOG` is unset
    pub level: Level,
    /// JSON lines instead of human-readable output
    pub json: bool,
    /// Log span open/close (service calls are `#[instrument]`ed)
    pub span_events: bool,
    pub file_line: bool,
    /// Let `sqlx`, `tower_http` and friends log at `level` too
    pub verbose_deps: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            verbose_deps: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            file_line: false,
            ..Self::default()
        }
    }

    /// Production output for production, development output otherwise
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        if env.is_production() {
            Self::production()
        } else {
            Self::development()
        }
    }

    /// Filter used when `RUST_LOG` is unset, e.g. `debug,sqlx=warn,...`
    pub fn default_directives(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        if self.verbose_deps {
            return level;
        }

        std::iter::once(level)
            .chain(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber with [`TracingConfig::default`]
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::default())
}

/// Install the global subscriber; a second call reports `AlreadyInitialized`
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let layer = fmt::layer()
        .with_target(true)
        .with_file(config.file_line)
        .with_line_number(config.file_line)
        .with_span_events(config.span_events());

    let layer = if config.json {
        layer.json().flatten_event(true).boxed()
    } else {
        layer.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
