//! Invoice materialization from an annexure's line items.
//!
//! Generation is gated on completeness: every line item needs a
//! proof-of-delivery link, and any file group carrying extra costs needs a
//! supporting document. Violations accumulate so the caller sees every
//! offending record at once instead of fixing them one by one.

use crate::models::{Annexure, Invoice, InvoiceStatus, LineItem};
use crate::repository::RepoOp;
use crate::services::collaborators::DocumentStore;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use settlement_core::error::AppError;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Settled total for one file group, denormalized onto its items.
#[derive(Debug, Clone)]
pub struct GroupSettlement {
    pub file_number: String,
    pub settled_total: Decimal,
}

/// The computed outcome of a successful generation, ready to be folded
/// into the caller's transactional batch.
#[derive(Debug, Clone)]
pub struct InvoicePlan {
    pub invoice: Invoice,
    pub settlements: Vec<GroupSettlement>,
}

impl InvoicePlan {
    /// Repository ops persisting this plan: per-group settled prices, the
    /// invoice row, and the invoice back-links on every line item.
    pub fn ops(&self, annexure_id: Uuid) -> Vec<RepoOp> {
        let mut ops = Vec::with_capacity(self.settlements.len() + 2);
        for settlement in &self.settlements {
            ops.push(RepoOp::SetGroupSettledPrice {
                annexure_id,
                file_number: settlement.file_number.clone(),
                settled_price: settlement.settled_total,
            });
        }
        ops.push(RepoOp::CreateInvoice(self.invoice.clone()));
        ops.push(RepoOp::MarkItemsInvoiced {
            annexure_id,
            invoice_id: self.invoice.invoice_id,
        });
        ops
    }
}

/// Reference number: first three letters of the vendor id uppercased,
/// the current date, and a random three-digit suffix.
fn reference_number(vendor_id: &str) -> String {
    let prefix: String = vendor_id
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("{}-{}-{:03}", prefix, date, suffix)
}

/// Validate the annexure's line items and compute the invoice.
///
/// Nothing is persisted here; the returned [`InvoicePlan`] is committed by
/// the caller in the same transaction as the annexure's own mutation.
pub async fn generate(
    annexure: &Annexure,
    items: &[LineItem],
    documents: &dyn DocumentStore,
) -> Result<InvoicePlan, AppError> {
    if items.is_empty() {
        return Err(AppError::ValidationFailed {
            message: format!(
                "Invoice generation blocked for annexure '{}'",
                annexure.name
            ),
            violations: vec!["annexure has no line items to invoice".to_string()],
        });
    }

    // Group by file number; BTreeMap keeps violation reports ordered.
    let mut by_file: BTreeMap<&str, Vec<&LineItem>> = BTreeMap::new();
    for item in items {
        by_file.entry(item.file_number.as_str()).or_default().push(item);
    }

    let mut violations = Vec::new();

    for item in items {
        if !item.has_pod() {
            violations.push(format!(
                "LR {} is missing a proof-of-delivery link",
                item.lr_number
            ));
        }
    }

    for (file_number, group_items) in &by_file {
        let has_extra_cost = group_items.iter().any(|i| !i.extra_cost.is_zero());
        if has_extra_cost
            && !documents
                .has_extra_cost_document(annexure.annexure_id, file_number)
                .await
                .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?
        {
            violations.push(format!(
                "File {} carries extra costs without a supporting document",
                file_number
            ));
        }
    }

    if !violations.is_empty() {
        return Err(AppError::ValidationFailed {
            message: format!(
                "Invoice generation blocked for annexure '{}'",
                annexure.name
            ),
            violations,
        });
    }

    let mut settlements = Vec::with_capacity(by_file.len());
    let mut subtotal = Decimal::ZERO;
    for (file_number, group_items) in &by_file {
        let settled_total: Decimal = group_items.iter().map(|i| i.line_price).sum();
        subtotal += settled_total;
        settlements.push(GroupSettlement {
            file_number: file_number.to_string(),
            settled_total,
        });
    }

    let tax_total = Decimal::ZERO;
    let invoice = Invoice {
        invoice_id: Uuid::new_v4(),
        reference_number: reference_number(&annexure.vendor_id),
        status: InvoiceStatus::Draft,
        annexure_id: Some(annexure.annexure_id),
        vendor_id: annexure.vendor_id.clone(),
        subtotal,
        tax_total,
        grand_total: subtotal + tax_total,
        created_utc: Utc::now(),
    };

    Ok(InvoicePlan {
        invoice,
        settlements,
    })
}
