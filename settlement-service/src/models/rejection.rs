//! Rejection record attached to a reviewed file group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    pub rejection_id: Uuid,
    pub annexure_id: Uuid,
    pub group_id: Uuid,
    pub reason: String,
    pub rejected_by: String,
    pub recorded_utc: DateTime<Utc>,
}
