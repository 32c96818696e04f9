//! Attachment model -> entity

use buddylink_core::entities::Attachment;
use buddylink_core::value_objects::Snowflake;

use crate::models::AttachmentModel;

impl From<AttachmentModel> for Attachment {
    fn from(model: AttachmentModel) -> Self {
        Attachment {
            id: Snowflake::new(model.id),
            owner_id: Snowflake::new(model.owner_id),
            message_id: model.message_id.map(Snowflake::new),
            file_name: model.file_name,
            mime_type: model.mime_type,
            size: model.size,
        }
    }
}
