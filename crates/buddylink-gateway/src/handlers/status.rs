//! `status:update` handler

use buddylink_core::entities::PresenceStatus;
use buddylink_service::{PresenceService, StatusUpdateRequest};
use std::sync::Arc;

use super::HandlerResult;
use crate::broadcast::PresenceFanout;
use crate::connection::Connection;
use crate::server::GatewayState;

pub struct StatusHandler;

impl StatusHandler {
    /// Persist the new status and announce it to online buddies
    ///
    /// Unknown statuses are dropped; there is no error event for them.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: StatusUpdateRequest,
    ) -> HandlerResult<()> {
        let user_id = connection.user_id();

        let status: PresenceStatus = match request.status.parse() {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "Ignoring status update");
                return Ok(());
            }
        };

        let ctx = state.service_context();
        if let Err(e) = PresenceService::new(ctx).set_status(user_id, status).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to persist status");
            return Ok(());
        }

        if let Err(e) = PresenceFanout::new(ctx, state.registry())
            .announce(user_id, connection.username(), status)
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Status fan-out failed");
        }

        Ok(())
    }
}
