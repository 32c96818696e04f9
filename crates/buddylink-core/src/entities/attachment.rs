//! Attachment metadata

use crate::value_objects::Snowflake;

/// Uploaded file metadata
///
/// Uploading happens outside this core. Delivery only checks ownership and
/// links the attachment to the message it was sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub message_id: Option<Snowflake>,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
}

impl Attachment {
    pub fn new(
        id: Snowflake,
        owner_id: Snowflake,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            id,
            owner_id,
            message_id: None,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.message_id.is_some()
    }
}
