//! Gateway server entry point
//!
//! ```bash
//! GATEWAY_PORT=8080 cargo run -p buddylink-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use buddylink_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    let tracing_config = match &config {
        Ok(c) => TracingConfig::for_environment(c.app.env),
        Err(_) => TracingConfig::development(),
    };
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.gateway.address(),
        policy = ?config.presence.session_policy,
        "Configuration loaded"
    );

    if let Err(e) = buddylink_gateway::server::run(config).await {
        error!(error = %e, code = e.error_code(), "Gateway stopped");
        std::process::exit(1);
    }
}
