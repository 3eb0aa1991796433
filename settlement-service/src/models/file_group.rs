//! File group model for settlement-service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// First-stage review status of a file group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileGroupStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl FileGroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileGroupStatus::Pending => "pending",
            FileGroupStatus::UnderReview => "under_review",
            FileGroupStatus::Approved => "approved",
            FileGroupStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "under_review" => FileGroupStatus::UnderReview,
            "approved" => FileGroupStatus::Approved,
            "rejected" => FileGroupStatus::Rejected,
            _ => FileGroupStatus::Pending,
        }
    }
}

/// The subset of an annexure's line items sharing one file/vehicle entry;
/// the unit of first-stage review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileGroup {
    pub group_id: Uuid,
    pub annexure_id: Uuid,
    pub file_number: String,
    pub status: FileGroupStatus,
    pub rejection_reason: Option<String>,
}
