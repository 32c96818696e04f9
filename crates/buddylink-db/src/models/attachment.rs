//! Attachment row

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AttachmentModel {
    pub id: i64,
    pub owner_id: i64,
    pub message_id: Option<i64>,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
}
