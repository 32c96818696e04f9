//! User model -> entity

use buddylink_core::entities::{PresenceStatus, User};
use buddylink_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        let status = model.status.parse().unwrap_or_else(|_| {
            tracing::warn!(user_id = model.id, status = %model.status, "Unknown stored status");
            PresenceStatus::Offline
        });

        User {
            id: Snowflake::new(model.id),
            username: model.username,
            status,
            last_seen: model.last_seen,
        }
    }
}
