//! Line item (LR) model for settlement-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review status of a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    Pending,
    Verified,
    Wrong,
    Approved,
    Rejected,
}

impl LineItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemStatus::Pending => "pending",
            LineItemStatus::Verified => "verified",
            LineItemStatus::Wrong => "wrong",
            LineItemStatus::Approved => "approved",
            LineItemStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "verified" => LineItemStatus::Verified,
            "wrong" => LineItemStatus::Wrong,
            "approved" => LineItemStatus::Approved,
            "rejected" => LineItemStatus::Rejected,
            _ => LineItemStatus::Pending,
        }
    }
}

/// A single shipment's transport record (LR), the smallest unit carried
/// through the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub line_item_id: Uuid,
    pub lr_number: String,
    pub file_number: String,
    pub status: LineItemStatus,
    pub offered_price: Decimal,
    pub settled_price: Decimal,
    pub extra_cost: Decimal,
    pub line_price: Decimal,
    pub pod_url: Option<String>,
    pub annexure_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub is_invoiced: bool,
    pub rejection_reason: Option<String>,
}

impl LineItem {
    /// True when the item carries a usable proof-of-delivery link.
    pub fn has_pod(&self) -> bool {
        self.pod_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}
