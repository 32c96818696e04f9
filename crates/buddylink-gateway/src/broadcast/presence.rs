//! Presence fan-out
//!
//! A status change goes to the acting user's mutual buddies only, and only
//! to those with a live connection. Offline buddies are skipped silently.
//! Delivery is best effort: a full or closed outbound queue drops the event.

use buddylink_core::entities::PresenceStatus;
use buddylink_core::Snowflake;
use buddylink_service::{PresenceService, ServiceContext, ServiceResult};

use crate::connection::SessionRegistry;
use crate::events::BuddyStatusEvent;
use crate::protocol::{GatewayMessage, ServerEvent};

pub struct PresenceFanout<'a> {
    ctx: &'a ServiceContext,
    registry: &'a SessionRegistry,
}

impl<'a> PresenceFanout<'a> {
    pub fn new(ctx: &'a ServiceContext, registry: &'a SessionRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Push `buddy:status` to every online buddy of `user_id`
    ///
    /// Returns how many buddies the event was queued for.
    pub async fn announce(
        &self,
        user_id: Snowflake,
        username: &str,
        status: PresenceStatus,
    ) -> ServiceResult<usize> {
        let buddies = PresenceService::new(self.ctx).buddies_of(user_id).await?;

        let message = GatewayMessage::new(
            ServerEvent::BuddyStatus,
            &BuddyStatusEvent {
                user_id,
                username: username.to_string(),
                status,
            },
        );

        let mut reached = 0;
        for buddy in &buddies {
            let Some(connection) = self.registry.lookup(buddy.id) else {
                continue;
            };
            match connection.try_send(message.clone()) {
                Ok(()) => reached += 1,
                Err(e) => tracing::debug!(
                    user_id = %user_id,
                    buddy_id = %buddy.id,
                    error = %e,
                    "Dropped buddy:status"
                ),
            }
        }

        tracing::trace!(
            user_id = %user_id,
            status = %status,
            buddies = buddies.len(),
            reached,
            "Presence announced"
        );

        Ok(reached)
    }
}
