//! Message model -> entity

use buddylink_core::entities::{Message, MessageKind};
use buddylink_core::value_objects::Snowflake;

use crate::models::MessageModel;

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        let kind = match model.kind.as_str() {
            "channel" => MessageKind::Channel,
            _ => MessageKind::Im,
        };

        Message {
            id: Snowflake::new(model.id),
            from_user_id: Snowflake::new(model.from_user_id),
            to_user_id: Snowflake::new(model.to_user_id),
            content: model.content,
            kind,
            attachment_ids: model.attachment_ids.into_iter().map(Snowflake::new).collect(),
            created_at: model.created_at,
            deleted: model.deleted,
        }
    }
}
