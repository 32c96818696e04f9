//! Gateway state
//!
//! Shared by every connection handler through axum's `State`.

use crate::connection::SessionRegistry;
use buddylink_common::AppConfig;
use buddylink_service::ServiceContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    registry: Arc<SessionRegistry>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        registry: Arc<SessionRegistry>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            registry,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Shared handle, for background tasks
    pub fn registry_handle(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("config", &"AppConfig")
            .finish()
    }
}
