//! Audit trail entries. Append-only: entries are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity types carrying a workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Annexure,
    Invoice,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Annexure => "annexure",
            EntityType::Invoice => "invoice",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "invoice" => EntityType::Invoice,
            _ => EntityType::Annexure,
        }
    }
}

/// One recorded status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub audit_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub actor_id: String,
    pub note: Option<String>,
    pub recorded_utc: DateTime<Utc>,
}
