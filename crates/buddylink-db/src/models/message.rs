//! Message row
//!
//! `attachment_ids` is aggregated from the attachments table by the queries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub content: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub attachment_ids: Vec<i64>,
}
