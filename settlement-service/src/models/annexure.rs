//! Annexure model for settlement-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Annexure workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnexureStatus {
    Draft,
    PendingReviewer1,
    PartiallyApproved,
    HasRejections,
    PendingReviewer2,
    RejectedByReviewer2,
    Approved,
}

impl AnnexureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnexureStatus::Draft => "draft",
            AnnexureStatus::PendingReviewer1 => "pending_reviewer_1",
            AnnexureStatus::PartiallyApproved => "partially_approved",
            AnnexureStatus::HasRejections => "has_rejections",
            AnnexureStatus::PendingReviewer2 => "pending_reviewer_2",
            AnnexureStatus::RejectedByReviewer2 => "rejected_by_reviewer_2",
            AnnexureStatus::Approved => "approved",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "pending_reviewer_1" => AnnexureStatus::PendingReviewer1,
            "partially_approved" => AnnexureStatus::PartiallyApproved,
            "has_rejections" => AnnexureStatus::HasRejections,
            "pending_reviewer_2" => AnnexureStatus::PendingReviewer2,
            "rejected_by_reviewer_2" => AnnexureStatus::RejectedByReviewer2,
            "approved" => AnnexureStatus::Approved,
            _ => AnnexureStatus::Draft,
        }
    }

    pub const ALL: [AnnexureStatus; 7] = [
        AnnexureStatus::Draft,
        AnnexureStatus::PendingReviewer1,
        AnnexureStatus::PartiallyApproved,
        AnnexureStatus::HasRejections,
        AnnexureStatus::PendingReviewer2,
        AnnexureStatus::RejectedByReviewer2,
        AnnexureStatus::Approved,
    ];

    /// Statuses from which the owning submitter may delete the annexure.
    pub fn deletable(&self) -> bool {
        matches!(
            self,
            AnnexureStatus::Draft
                | AnnexureStatus::HasRejections
                | AnnexureStatus::RejectedByReviewer2
        )
    }
}

/// A vendor-submitted batch of line items grouped for settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annexure {
    pub annexure_id: Uuid,
    pub name: String,
    pub status: AnnexureStatus,
    pub vendor_id: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}
