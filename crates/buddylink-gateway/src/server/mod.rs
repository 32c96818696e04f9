//! Gateway server setup
//!
//! Routes, state wiring and the serve loop.

mod handler;
mod state;
mod sweeper;

pub use handler::{gateway_handler, GatewayQuery};
pub use state::GatewayState;
pub use sweeper::spawn_sweeper;

use crate::connection::SessionRegistry;
use axum::{routing::get, Router};
use buddylink_common::{AppConfig, AppError};
use buddylink_db::MemoryStore;
use buddylink_service::ServiceContext;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire the store, services and registry from configuration
///
/// Without `DATABASE_URL` the gateway runs on an empty in-memory store.
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    let service_context = match &config.database {
        Some(database) => {
            tracing::info!("Connecting to PostgreSQL...");
            let db_config = buddylink_db::DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                min_connections: database.min_connections,
                ..Default::default()
            };
            let pool = buddylink_db::create_pool(&db_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            buddylink_db::run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            tracing::info!("PostgreSQL connection established");

            ServiceContext::postgres(pool, config.worker_id, config.messaging.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using an in-memory store");
            ServiceContext::in_memory(
                Arc::new(MemoryStore::new()),
                config.worker_id,
                config.messaging.clone(),
            )
        }
    };

    Ok(GatewayState::new(
        service_context,
        SessionRegistry::new_shared(),
        config,
    ))
}

/// Serve on an already bound listener until the server stops
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Server(e.to_string()))?;

    let sweeper = spawn_sweeper(state.clone());
    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    let result = axum::serve(listener, create_app(state))
        .await
        .map_err(|e| AppError::Server(e.to_string()));

    sweeper.abort();
    result
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();
    let state = create_gateway_state(config).await?;

    tracing::info!("Starting Gateway server on {}", addr);
    let listener = TcpListener::bind(&addr).await.map_err(|e| AppError::Bind {
        addr: addr.clone(),
        reason: e.to_string(),
    })?;

    serve(listener, state).await
}
