//! Construction of append-only audit trail entries.

use crate::models::{Annexure, AnnexureStatus, AuditEntry, EntityType, Invoice, InvoiceStatus};
use chrono::Utc;
use uuid::Uuid;

/// Build an audit entry for a committed status transition.
pub fn entry(
    entity_type: EntityType,
    entity_id: Uuid,
    from_status: &str,
    to_status: &str,
    actor_id: &str,
    note: Option<String>,
) -> AuditEntry {
    AuditEntry {
        audit_id: Uuid::new_v4(),
        entity_type,
        entity_id,
        from_status: from_status.to_string(),
        to_status: to_status.to_string(),
        actor_id: actor_id.to_string(),
        note,
        recorded_utc: Utc::now(),
    }
}

pub fn annexure_entry(
    annexure: &Annexure,
    to: AnnexureStatus,
    actor_id: &str,
    note: Option<String>,
) -> AuditEntry {
    entry(
        EntityType::Annexure,
        annexure.annexure_id,
        annexure.status.as_str(),
        to.as_str(),
        actor_id,
        note,
    )
}

pub fn invoice_entry(
    invoice: &Invoice,
    to: InvoiceStatus,
    actor_id: &str,
    note: Option<String>,
) -> AuditEntry {
    entry(
        EntityType::Invoice,
        invoice.invoice_id,
        invoice.status.as_str(),
        to.as_str(),
        actor_id,
        note,
    )
}
