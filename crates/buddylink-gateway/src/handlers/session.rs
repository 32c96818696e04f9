//! Connect and disconnect
//!
//! Registering a connection marks the user online and tells their buddies;
//! losing the connection that owns the user does the reverse. A connection
//! that was displaced by a newer one leaves presence alone when it goes.

use buddylink_common::SessionPolicy;
use buddylink_core::entities::PresenceStatus;
use buddylink_service::PresenceService;
use std::sync::Arc;

use crate::broadcast::PresenceFanout;
use crate::connection::Connection;
use crate::events::SessionReplacedEvent;
use crate::protocol::{CloseCode, GatewayMessage, ServerEvent};
use crate::server::GatewayState;

pub struct SessionHandler;

impl SessionHandler {
    /// Register the connection and announce the user online
    ///
    /// Returns false when the session policy refused the connection; it
    /// has then been asked to close and was never registered.
    pub async fn connect(state: &GatewayState, connection: &Arc<Connection>) -> bool {
        let user_id = connection.user_id();

        if state.config().presence.session_policy == SessionPolicy::Reject {
            if let Err(owner) = state.registry().register_exclusive(connection.clone()) {
                tracing::info!(
                    user_id = %user_id,
                    connection_id = %connection.connection_id(),
                    owner = %owner.connection_id,
                    "Rejecting second session"
                );
                connection.close(CloseCode::SessionRejected);
                return false;
            }
        } else if let Some(displaced) = state.registry().register(connection.clone()) {
            if let Some(old) = state.registry().connection(&displaced.connection_id) {
                let notice = GatewayMessage::new(
                    ServerEvent::SessionReplaced,
                    &SessionReplacedEvent {
                        connection_id: connection.connection_id().to_string(),
                    },
                );
                let _ = old.try_send(notice);
                old.close(CloseCode::SessionReplaced);
            }
            tracing::info!(
                user_id = %user_id,
                displaced = %displaced.connection_id,
                "Session replaced"
            );
        }

        Self::publish(state, connection, PresenceStatus::Online).await;

        tracing::info!(
            connection_id = %connection.connection_id(),
            user_id = %user_id,
            "Session established"
        );
        true
    }

    pub async fn disconnect(state: &GatewayState, connection: &Connection) {
        let Some(user_id) = state.registry().unregister(connection.connection_id()) else {
            tracing::debug!(
                connection_id = %connection.connection_id(),
                "Connection no longer owned its user, presence unchanged"
            );
            return;
        };

        Self::publish(state, connection, PresenceStatus::Offline).await;

        tracing::info!(
            connection_id = %connection.connection_id(),
            user_id = %user_id,
            "Session ended"
        );
    }

    async fn publish(state: &GatewayState, connection: &Connection, status: PresenceStatus) {
        let ctx = state.service_context();
        let user_id = connection.user_id();

        if let Err(e) = PresenceService::new(ctx).set_status(user_id, status).await {
            tracing::warn!(user_id = %user_id, status = %status, error = %e, "Failed to persist presence");
        }

        match PresenceFanout::new(ctx, state.registry())
            .announce(user_id, connection.username(), status)
            .await
        {
            Ok(reached) => tracing::debug!(user_id = %user_id, status = %status, reached, "Presence fan-out"),
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Presence fan-out failed"),
        }
    }
}
