//! Transactional repository seam for settlement-service.
//!
//! The orchestration logic depends only on [`SettlementRepository`]: a
//! snapshot read plus a batch of typed mutations executed atomically.
//! Adapters: [`PgRepository`] (Postgres via sqlx) and [`InMemoryRepository`]
//! (mutex-held maps, used by tests and as the no-database fallback).

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

use crate::models::{
    Annexure, AnnexureStatus, AuditEntry, Comment, EntityType, FileGroup, FileGroupStatus,
    Invoice, InvoiceStatus, LineItem, LineItemStatus, Rejection,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use settlement_core::error::AppError;
use uuid::Uuid;

/// An annexure together with the committed state of its children and any
/// linked invoice, read as one consistent view.
#[derive(Debug, Clone)]
pub struct AnnexureSnapshot {
    pub annexure: Annexure,
    pub groups: Vec<FileGroup>,
    pub items: Vec<LineItem>,
    pub invoice: Option<Invoice>,
}

impl AnnexureSnapshot {
    pub fn group(&self, group_id: Uuid) -> Option<&FileGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    pub fn items_in_group(&self, group_id: Uuid) -> Vec<&LineItem> {
        self.items
            .iter()
            .filter(|i| i.group_id == Some(group_id))
            .collect()
    }
}

/// One mutation inside a transactional batch.
///
/// `RecomputeAnnexureStatus` is special: the adapter re-reads the sibling
/// group statuses inside its own transaction, derives the parent status,
/// and appends an audit entry only when the status actually changed. Two
/// concurrent reviewers acting on the same annexure therefore serialize on
/// the parent row instead of racing a stale snapshot.
#[derive(Debug, Clone)]
pub enum RepoOp {
    UpdateAnnexureStatus {
        annexure_id: Uuid,
        status: AnnexureStatus,
    },
    RecomputeAnnexureStatus {
        annexure_id: Uuid,
        actor_id: String,
        note: Option<String>,
    },
    UpdateFileGroup {
        group_id: Uuid,
        status: FileGroupStatus,
        rejection_reason: Option<String>,
    },
    UpdateLineItemsInGroup {
        group_id: Uuid,
        status: LineItemStatus,
        rejection_reason: Option<String>,
    },
    SetGroupSettledPrice {
        annexure_id: Uuid,
        file_number: String,
        settled_price: Decimal,
    },
    MarkItemsInvoiced {
        annexure_id: Uuid,
        invoice_id: Uuid,
    },
    CreateInvoice(Invoice),
    UpdateInvoiceStatus {
        invoice_id: Uuid,
        status: InvoiceStatus,
    },
    AppendAudit(AuditEntry),
    CreateRejection(Rejection),
    /// Clear annexure/group/invoice links and zero the financial fields of
    /// every line item attached to the annexure.
    UnlinkLineItems {
        annexure_id: Uuid,
    },
    UnlinkInvoice {
        invoice_id: Uuid,
    },
    DeleteFileGroups {
        annexure_id: Uuid,
    },
    DeleteComments {
        annexure_id: Uuid,
    },
    DeleteAnnexure {
        annexure_id: Uuid,
    },
}

/// Abstract transactional repository the orchestrator is built against.
#[async_trait]
pub trait SettlementRepository: Send + Sync {
    /// Load an annexure with its groups, items and linked invoice.
    async fn annexure_snapshot(
        &self,
        annexure_id: Uuid,
    ) -> Result<Option<AnnexureSnapshot>, AppError>;

    async fn get_annexure(&self, annexure_id: Uuid) -> Result<Option<Annexure>, AppError>;

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError>;

    /// Ordered transition history for one entity.
    async fn audit_entries(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<AuditEntry>, AppError>;

    async fn rejections_for(&self, annexure_id: Uuid) -> Result<Vec<Rejection>, AppError>;

    async fn comments_for(&self, annexure_id: Uuid) -> Result<Vec<Comment>, AppError>;

    async fn create_comment(&self, comment: Comment) -> Result<(), AppError>;

    /// Apply a batch of mutations atomically: either every op commits or
    /// none do.
    async fn execute(&self, ops: Vec<RepoOp>) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
