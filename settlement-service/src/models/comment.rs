//! Comment/log entry appended alongside workflow operations.

use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Uuid,
    pub content: String,
    pub author_id: String,
    pub author_role: Role,
    pub annexure_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub is_private: bool,
    pub created_utc: DateTime<Utc>,
}
