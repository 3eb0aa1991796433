//! In-memory repository: mutex-held maps with copy-on-write batches.
//!
//! Used by the integration tests and as the fallback store when no
//! database is configured. A batch is applied to a clone of the store and
//! swapped in only when every op succeeds, so failed batches roll back.

use crate::models::{
    Annexure, AuditEntry, Comment, EntityType, FileGroup, Invoice, LineItem, Rejection,
};
use crate::repository::{AnnexureSnapshot, RepoOp, SettlementRepository};
use crate::services::{aggregation, audit_trail};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use settlement_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
struct Store {
    annexures: HashMap<Uuid, Annexure>,
    groups: HashMap<Uuid, FileGroup>,
    items: HashMap<Uuid, LineItem>,
    invoices: HashMap<Uuid, Invoice>,
    audits: Vec<AuditEntry>,
    rejections: Vec<Rejection>,
    comments: Vec<Comment>,
}

pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().expect("repository store poisoned")
    }

    // Seeding helpers for tests and local runs.

    pub fn insert_annexure(&self, annexure: Annexure) {
        self.lock().annexures.insert(annexure.annexure_id, annexure);
    }

    pub fn insert_file_group(&self, group: FileGroup) {
        self.lock().groups.insert(group.group_id, group);
    }

    pub fn insert_line_item(&self, item: LineItem) {
        self.lock().items.insert(item.line_item_id, item);
    }

    pub fn insert_invoice(&self, invoice: Invoice) {
        self.lock().invoices.insert(invoice.invoice_id, invoice);
    }

    /// All line items, for asserting unlink semantics after deletes.
    pub fn all_line_items(&self) -> Vec<LineItem> {
        self.lock().items.values().cloned().collect()
    }

    pub fn invoice_for_annexure(&self, annexure_id: Uuid) -> Option<Invoice> {
        self.lock()
            .invoices
            .values()
            .find(|i| i.annexure_id == Some(annexure_id))
            .cloned()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(store: &mut Store, op: RepoOp) -> Result<(), AppError> {
    match op {
        RepoOp::UpdateAnnexureStatus {
            annexure_id,
            status,
        } => {
            let annexure = store.annexures.get_mut(&annexure_id).ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Annexure {} not found", annexure_id))
            })?;
            annexure.status = status;
            annexure.updated_utc = Utc::now();
        }
        RepoOp::RecomputeAnnexureStatus {
            annexure_id,
            actor_id,
            note,
        } => {
            let statuses: Vec<_> = store
                .groups
                .values()
                .filter(|g| g.annexure_id == annexure_id)
                .map(|g| g.status)
                .collect();
            if statuses.is_empty() {
                return Ok(());
            }
            let derived = aggregation::derive_annexure_status(&statuses);
            let annexure = store.annexures.get_mut(&annexure_id).ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Annexure {} not found", annexure_id))
            })?;
            if annexure.status != derived {
                store.audits.push(audit_trail::entry(
                    EntityType::Annexure,
                    annexure_id,
                    annexure.status.as_str(),
                    derived.as_str(),
                    &actor_id,
                    note,
                ));
                annexure.status = derived;
                annexure.updated_utc = Utc::now();
            }
        }
        RepoOp::UpdateFileGroup {
            group_id,
            status,
            rejection_reason,
        } => {
            let group = store.groups.get_mut(&group_id).ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("File group {} not found", group_id))
            })?;
            group.status = status;
            group.rejection_reason = rejection_reason;
        }
        RepoOp::UpdateLineItemsInGroup {
            group_id,
            status,
            rejection_reason,
        } => {
            for item in store
                .items
                .values_mut()
                .filter(|i| i.group_id == Some(group_id))
            {
                item.status = status;
                item.rejection_reason = rejection_reason.clone();
            }
        }
        RepoOp::SetGroupSettledPrice {
            annexure_id,
            file_number,
            settled_price,
        } => {
            for item in store.items.values_mut().filter(|i| {
                i.annexure_id == Some(annexure_id) && i.file_number == file_number
            }) {
                item.settled_price = settled_price;
            }
        }
        RepoOp::MarkItemsInvoiced {
            annexure_id,
            invoice_id,
        } => {
            for item in store
                .items
                .values_mut()
                .filter(|i| i.annexure_id == Some(annexure_id))
            {
                item.invoice_id = Some(invoice_id);
                item.is_invoiced = true;
            }
        }
        RepoOp::CreateInvoice(invoice) => {
            store.invoices.insert(invoice.invoice_id, invoice);
        }
        RepoOp::UpdateInvoiceStatus { invoice_id, status } => {
            let invoice = store.invoices.get_mut(&invoice_id).ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id))
            })?;
            invoice.status = status;
        }
        RepoOp::AppendAudit(entry) => {
            store.audits.push(entry);
        }
        RepoOp::CreateRejection(rejection) => {
            store.rejections.push(rejection);
        }
        RepoOp::UnlinkLineItems { annexure_id } => {
            for item in store
                .items
                .values_mut()
                .filter(|i| i.annexure_id == Some(annexure_id))
            {
                item.annexure_id = None;
                item.group_id = None;
                item.invoice_id = None;
                item.is_invoiced = false;
                item.offered_price = Decimal::ZERO;
                item.settled_price = Decimal::ZERO;
                item.extra_cost = Decimal::ZERO;
                item.line_price = Decimal::ZERO;
            }
        }
        RepoOp::UnlinkInvoice { invoice_id } => {
            if let Some(invoice) = store.invoices.get_mut(&invoice_id) {
                invoice.annexure_id = None;
            }
        }
        RepoOp::DeleteFileGroups { annexure_id } => {
            store.groups.retain(|_, g| g.annexure_id != annexure_id);
        }
        RepoOp::DeleteComments { annexure_id } => {
            store
                .comments
                .retain(|c| c.annexure_id != Some(annexure_id));
        }
        RepoOp::DeleteAnnexure { annexure_id } => {
            store.annexures.remove(&annexure_id);
        }
    }
    Ok(())
}

#[async_trait]
impl SettlementRepository for InMemoryRepository {
    async fn annexure_snapshot(
        &self,
        annexure_id: Uuid,
    ) -> Result<Option<AnnexureSnapshot>, AppError> {
        let store = self.lock();
        let Some(annexure) = store.annexures.get(&annexure_id).cloned() else {
            return Ok(None);
        };
        let mut groups: Vec<FileGroup> = store
            .groups
            .values()
            .filter(|g| g.annexure_id == annexure_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.file_number.cmp(&b.file_number));
        let mut items: Vec<LineItem> = store
            .items
            .values()
            .filter(|i| i.annexure_id == Some(annexure_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.lr_number.cmp(&b.lr_number));
        let invoice = store
            .invoices
            .values()
            .find(|i| i.annexure_id == Some(annexure_id))
            .cloned();
        Ok(Some(AnnexureSnapshot {
            annexure,
            groups,
            items,
            invoice,
        }))
    }

    async fn get_annexure(&self, annexure_id: Uuid) -> Result<Option<Annexure>, AppError> {
        Ok(self.lock().annexures.get(&annexure_id).cloned())
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError> {
        Ok(self.lock().invoices.get(&invoice_id).cloned())
    }

    async fn audit_entries(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<AuditEntry>, AppError> {
        Ok(self
            .lock()
            .audits
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn rejections_for(&self, annexure_id: Uuid) -> Result<Vec<Rejection>, AppError> {
        Ok(self
            .lock()
            .rejections
            .iter()
            .filter(|r| r.annexure_id == annexure_id)
            .cloned()
            .collect())
    }

    async fn comments_for(&self, annexure_id: Uuid) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.annexure_id == Some(annexure_id))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: Comment) -> Result<(), AppError> {
        self.lock().comments.push(comment);
        Ok(())
    }

    async fn execute(&self, ops: Vec<RepoOp>) -> Result<(), AppError> {
        let mut store = self.lock();
        let mut staged = store.clone();
        for op in ops {
            apply(&mut staged, op)?;
        }
        *store = staged;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
