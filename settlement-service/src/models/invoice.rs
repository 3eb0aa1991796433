//! Invoice model for settlement-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice workflow status. Parallel to the annexure graph but distinct:
/// it adds a reviewer-1 rejection state and a post-approval payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    PendingReviewer1,
    RejectedByReviewer1,
    PendingReviewer2,
    RejectedByReviewer2,
    Approved,
    PaymentApproved,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::PendingReviewer1 => "pending_reviewer_1",
            InvoiceStatus::RejectedByReviewer1 => "rejected_by_reviewer_1",
            InvoiceStatus::PendingReviewer2 => "pending_reviewer_2",
            InvoiceStatus::RejectedByReviewer2 => "rejected_by_reviewer_2",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::PaymentApproved => "payment_approved",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "pending_reviewer_1" => InvoiceStatus::PendingReviewer1,
            "rejected_by_reviewer_1" => InvoiceStatus::RejectedByReviewer1,
            "pending_reviewer_2" => InvoiceStatus::PendingReviewer2,
            "rejected_by_reviewer_2" => InvoiceStatus::RejectedByReviewer2,
            "approved" => InvoiceStatus::Approved,
            "payment_approved" => InvoiceStatus::PaymentApproved,
            _ => InvoiceStatus::Draft,
        }
    }

    pub const ALL: [InvoiceStatus; 7] = [
        InvoiceStatus::Draft,
        InvoiceStatus::PendingReviewer1,
        InvoiceStatus::RejectedByReviewer1,
        InvoiceStatus::PendingReviewer2,
        InvoiceStatus::RejectedByReviewer2,
        InvoiceStatus::Approved,
        InvoiceStatus::PaymentApproved,
    ];
}

/// The financial settlement document derived from an approved annexure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub reference_number: String,
    pub status: InvoiceStatus,
    pub annexure_id: Option<Uuid>,
    pub vendor_id: String,
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub grand_total: Decimal,
    pub created_utc: DateTime<Utc>,
}
