//! Message entity

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Where a message was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// One-to-one instant message
    #[default]
    Im,
    /// Channel post (written by the channel collaborator, never by this core)
    Channel,
}

impl MessageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Im => "im",
            Self::Channel => "channel",
        }
    }
}

/// A persisted message
///
/// Immutable once created. Only `deleted` changes afterwards, and that flag is
/// owned by the mail/IM UI, not by the delivery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub from_user_id: Snowflake,
    pub to_user_id: Snowflake,
    pub content: String,
    pub kind: MessageKind,
    pub attachment_ids: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
}

impl Message {
    /// Create a new instant message
    ///
    /// `created_at` is truncated to microseconds, the precision of a
    /// `TIMESTAMPTZ` column, so the stored timestamp equals the one pushed live.
    pub fn new_im(
        id: Snowflake,
        from_user_id: Snowflake,
        to_user_id: Snowflake,
        content: String,
        attachment_ids: Vec<Snowflake>,
    ) -> Self {
        Self {
            id,
            from_user_id,
            to_user_id,
            content,
            kind: MessageKind::Im,
            attachment_ids,
            created_at: Utc::now().trunc_subsecs(6),
            deleted: false,
        }
    }

    /// Whether this message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: Snowflake, b: Snowflake) -> bool {
        (self.from_user_id == a && self.to_user_id == b)
            || (self.from_user_id == b && self.to_user_id == a)
    }

    #[inline]
    pub fn has_attachments(&self) -> bool {
        !self.attachment_ids.is_empty()
    }
}
