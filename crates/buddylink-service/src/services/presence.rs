//! Presence service
//!
//! Resolves the identity claimed at handshake, persists the presence column
//! and answers who a user's buddies are. Pushing `buddy:status` to sockets
//! happens in the gateway.

use buddylink_core::entities::{PresenceStatus, User};
use buddylink_core::Snowflake;
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Confirm the claimed id belongs to a real account
    #[instrument(skip(self))]
    pub async fn authenticate(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    /// Case-insensitive username lookup
    #[instrument(skip(self))]
    pub async fn resolve_username(&self, username: &str) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", username))
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, user_id: Snowflake, status: PresenceStatus) -> ServiceResult<()> {
        self.ctx.user_repo().set_status(user_id, status).await?;
        debug!(user_id = %user_id, status = %status, "Presence persisted");
        Ok(())
    }

    /// Users with an accepted buddy edge in both directions
    #[instrument(skip(self))]
    pub async fn buddies_of(&self, user_id: Snowflake) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.relationship_repo().mutual_buddies(user_id).await?)
    }
}
