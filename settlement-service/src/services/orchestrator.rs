//! Workflow orchestration: the operation surface composing transition
//! validation, cascades, aggregation, invoice generation and the audit
//! trail into one atomic repository batch per call.
//!
//! Collaborator events (notifications, comments, change log) are emitted
//! only after the batch commits and never affect the operation outcome.

use crate::models::{
    Actor, Annexure, AnnexureStatus, EntityType, FileGroupStatus, Invoice, InvoiceStatus,
    LineItemStatus, Rejection, Role,
};
use crate::repository::{AnnexureSnapshot, RepoOp, SettlementRepository};
use crate::services::collaborators::{
    workflow_comment, ChangeLog, CommentLog, DocumentStore, Notification, NotificationKind,
    Notifier,
};
use crate::services::metrics::{INVOICES_GENERATED_TOTAL, TRANSITIONS_TOTAL, WORKFLOW_OPS_TOTAL};
use crate::services::{aggregation, audit_trail, invoice_generator, transition};
use chrono::Utc;
use settlement_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Pool addresses used when notifying a reviewer role rather than a
/// specific person. Resolution to real recipients happens downstream.
const REVIEWER_1_POOL: &str = "reviewer-1-pool";
const REVIEWER_2_POOL: &str = "reviewer-2-pool";

/// Outcome of a successful workflow operation.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub annexure: Annexure,
    pub invoice: Option<Invoice>,
}

pub struct WorkflowOrchestrator {
    repo: Arc<dyn SettlementRepository>,
    notifier: Arc<dyn Notifier>,
    comments: Arc<dyn CommentLog>,
    changes: Arc<dyn ChangeLog>,
    documents: Arc<dyn DocumentStore>,
}

impl WorkflowOrchestrator {
    pub fn new(
        repo: Arc<dyn SettlementRepository>,
        notifier: Arc<dyn Notifier>,
        comments: Arc<dyn CommentLog>,
        changes: Arc<dyn ChangeLog>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            repo,
            notifier,
            comments,
            changes,
            documents,
        }
    }

    /// Submit a draft annexure for first-stage review.
    ///
    /// Invoice generation runs first as a pure validation-and-compute step;
    /// the status change, settled prices, invoice row, item back-links and
    /// audit entry then commit in one batch. A generation failure aborts
    /// the whole submission with nothing written.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id, actor_id = %actor.id))]
    pub async fn submit(
        &self,
        annexure_id: Uuid,
        actor: &Actor,
    ) -> Result<OperationOutcome, AppError> {
        let snap = self.load(annexure_id).await?;
        self.require_owner(&snap.annexure, actor)?;
        self.check_annexure_transition(actor, &snap, AnnexureStatus::PendingReviewer1)?;

        let mut ops = vec![RepoOp::UpdateAnnexureStatus {
            annexure_id,
            status: AnnexureStatus::PendingReviewer1,
        }];

        // A resubmission after rejection already carries an invoice; only
        // generate on the first pass.
        let mut invoice = snap.invoice.clone();
        if snap.invoice.is_none() {
            let plan = match invoice_generator::generate(
                &snap.annexure,
                &snap.items,
                self.documents.as_ref(),
            )
            .await
            {
                Ok(plan) => plan,
                Err(e) => {
                    INVOICES_GENERATED_TOTAL
                        .with_label_values(&["validation_failed"])
                        .inc();
                    self.count_op("submit", "denied");
                    return Err(e);
                }
            };
            ops.extend(plan.ops(annexure_id));
            INVOICES_GENERATED_TOTAL
                .with_label_values(&["generated"])
                .inc();
            invoice = Some(plan.invoice);
        }

        ops.push(RepoOp::AppendAudit(audit_trail::annexure_entry(
            &snap.annexure,
            AnnexureStatus::PendingReviewer1,
            &actor.id,
            Some("submitted for review".to_string()),
        )));

        self.repo.execute(ops).await?;
        self.count_transition(EntityType::Annexure, AnnexureStatus::PendingReviewer1.as_str());
        self.count_op("submit", "ok");
        info!(invoice = ?invoice.as_ref().map(|i| i.reference_number.clone()), "Annexure submitted");

        let annexure = self.committed(annexure_id).await?;
        self.emit_change(&snap.annexure, annexure.status);
        self.emit_notification(Notification {
            recipient_address: REVIEWER_1_POOL.to_string(),
            recipient_id: REVIEWER_1_POOL.to_string(),
            subject: format!("Annexure '{}' submitted for review", annexure.name),
            body: format!(
                "Vendor {} submitted annexure '{}' for first-stage review.",
                annexure.vendor_id, annexure.name
            ),
            kind: NotificationKind::SubmittedForReview,
            related_entity_type: EntityType::Annexure,
            related_entity_id: annexure_id,
        });

        Ok(OperationOutcome { annexure, invoice })
    }

    /// Approve one file group, cascading to its line items and recomputing
    /// the annexure status in the same transaction.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id, group_id = %group_id))]
    pub async fn approve_file_group(
        &self,
        annexure_id: Uuid,
        group_id: Uuid,
        actor: &Actor,
    ) -> Result<OperationOutcome, AppError> {
        let snap = self.load(annexure_id).await?;
        let group = snap
            .group(group_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("File group {} not found", group_id)))?
            .clone();

        let predicted = self.predict_status(&snap, &[group_id], FileGroupStatus::Approved);
        self.check_annexure_transition(actor, &snap, predicted)?;

        let ops = vec![
            RepoOp::UpdateFileGroup {
                group_id,
                status: FileGroupStatus::Approved,
                rejection_reason: None,
            },
            RepoOp::UpdateLineItemsInGroup {
                group_id,
                status: LineItemStatus::Approved,
                rejection_reason: None,
            },
            RepoOp::RecomputeAnnexureStatus {
                annexure_id,
                actor_id: actor.id.clone(),
                note: Some(format!("file group {} approved", group.file_number)),
            },
        ];
        self.repo.execute(ops).await?;
        self.count_op("approve_file_group", "ok");

        let annexure = self.committed(annexure_id).await?;
        if annexure.status != snap.annexure.status {
            self.count_transition(EntityType::Annexure, annexure.status.as_str());
            self.emit_change(&snap.annexure, annexure.status);
        }
        info!(file_number = %group.file_number, "File group approved");

        Ok(OperationOutcome {
            annexure,
            invoice: snap.invoice,
        })
    }

    /// Reject one file group with a reason, cascading the rejection to its
    /// line items and forcing the annexure into `HasRejections`.
    #[instrument(skip(self, actor, reason), fields(annexure_id = %annexure_id, group_id = %group_id))]
    pub async fn reject_file_group(
        &self,
        annexure_id: Uuid,
        group_id: Uuid,
        actor: &Actor,
        reason: String,
    ) -> Result<OperationOutcome, AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "A rejection reason is required"
            )));
        }

        let snap = self.load(annexure_id).await?;
        let group = snap
            .group(group_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("File group {} not found", group_id)))?
            .clone();

        self.check_annexure_transition(actor, &snap, AnnexureStatus::HasRejections)?;

        let ops = vec![
            RepoOp::UpdateFileGroup {
                group_id,
                status: FileGroupStatus::Rejected,
                rejection_reason: Some(reason.clone()),
            },
            RepoOp::UpdateLineItemsInGroup {
                group_id,
                status: LineItemStatus::Rejected,
                rejection_reason: Some(reason.clone()),
            },
            RepoOp::CreateRejection(Rejection {
                rejection_id: Uuid::new_v4(),
                annexure_id,
                group_id,
                reason: reason.clone(),
                rejected_by: actor.id.clone(),
                recorded_utc: Utc::now(),
            }),
            RepoOp::RecomputeAnnexureStatus {
                annexure_id,
                actor_id: actor.id.clone(),
                note: Some(format!("file group {} rejected", group.file_number)),
            },
        ];
        self.repo.execute(ops).await?;
        self.count_op("reject_file_group", "ok");

        let annexure = self.committed(annexure_id).await?;
        if annexure.status != snap.annexure.status {
            self.count_transition(EntityType::Annexure, annexure.status.as_str());
            self.emit_change(&snap.annexure, annexure.status);
        }
        info!(file_number = %group.file_number, "File group rejected");

        self.emit_comment(
            format!("File {} rejected: {}", group.file_number, reason),
            actor,
            Some(annexure_id),
        );
        self.emit_notification(Notification {
            recipient_address: annexure.vendor_id.clone(),
            recipient_id: annexure.vendor_id.clone(),
            subject: format!("File {} of '{}' was rejected", group.file_number, annexure.name),
            body: reason,
            kind: NotificationKind::GroupRejected,
            related_entity_type: EntityType::Annexure,
            related_entity_id: annexure_id,
        });

        Ok(OperationOutcome {
            annexure,
            invoice: snap.invoice,
        })
    }

    /// Approve several file groups of one annexure in a single pass with a
    /// single status recomputation.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id, groups = group_ids.len()))]
    pub async fn bulk_approve_file_groups(
        &self,
        annexure_id: Uuid,
        group_ids: &[Uuid],
        actor: &Actor,
    ) -> Result<OperationOutcome, AppError> {
        if group_ids.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "No file groups given to approve"
            )));
        }

        let snap = self.load(annexure_id).await?;
        for group_id in group_ids {
            if snap.group(*group_id).is_none() {
                return Err(AppError::NotFound(anyhow::anyhow!(
                    "File group {} does not belong to annexure {}",
                    group_id,
                    annexure_id
                )));
            }
        }

        let predicted = self.predict_status(&snap, group_ids, FileGroupStatus::Approved);
        self.check_annexure_transition(actor, &snap, predicted)?;

        let mut ops = Vec::with_capacity(group_ids.len() * 2 + 1);
        for group_id in group_ids {
            ops.push(RepoOp::UpdateFileGroup {
                group_id: *group_id,
                status: FileGroupStatus::Approved,
                rejection_reason: None,
            });
            ops.push(RepoOp::UpdateLineItemsInGroup {
                group_id: *group_id,
                status: LineItemStatus::Approved,
                rejection_reason: None,
            });
        }
        ops.push(RepoOp::RecomputeAnnexureStatus {
            annexure_id,
            actor_id: actor.id.clone(),
            note: Some(format!("{} file groups approved", group_ids.len())),
        });
        self.repo.execute(ops).await?;
        self.count_op("bulk_approve_file_groups", "ok");

        let annexure = self.committed(annexure_id).await?;
        if annexure.status != snap.annexure.status {
            self.count_transition(EntityType::Annexure, annexure.status.as_str());
            self.emit_change(&snap.annexure, annexure.status);
        }
        info!(approved = group_ids.len(), "File groups bulk approved");

        Ok(OperationOutcome {
            annexure,
            invoice: snap.invoice,
        })
    }

    /// Hand the annexure to the second reviewer. Guarded twice, and
    /// independently: every file group AND every line item must be
    /// approved. Group-level aggregation alone is not trusted here.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id))]
    pub async fn forward_to_reviewer2(
        &self,
        annexure_id: Uuid,
        actor: &Actor,
    ) -> Result<OperationOutcome, AppError> {
        let snap = self.load(annexure_id).await?;
        self.check_annexure_transition(actor, &snap, AnnexureStatus::PendingReviewer2)?;

        if !aggregation::all_groups_approved(&snap.groups)
            || !aggregation::all_items_approved(&snap.items)
        {
            let mut blockers: Vec<String> = snap
                .groups
                .iter()
                .filter(|g| g.status != FileGroupStatus::Approved)
                .map(|g| format!("file group {} is {}", g.file_number, g.status.as_str()))
                .collect();
            blockers.extend(
                aggregation::unapproved_items(&snap.items)
                    .iter()
                    .map(|i| format!("LR {} is {}", i.lr_number, i.status.as_str())),
            );
            if snap.groups.is_empty() {
                blockers.push("annexure has no file groups".to_string());
            }
            if snap.items.is_empty() {
                blockers.push("annexure has no line items".to_string());
            }
            self.count_op("forward_to_reviewer2", "denied");
            return Err(AppError::PreconditionFailed {
                message: format!(
                    "Annexure '{}' cannot be forwarded until every file group and line item is approved",
                    snap.annexure.name
                ),
                blockers,
            });
        }

        self.repo
            .execute(vec![
                RepoOp::UpdateAnnexureStatus {
                    annexure_id,
                    status: AnnexureStatus::PendingReviewer2,
                },
                RepoOp::AppendAudit(audit_trail::annexure_entry(
                    &snap.annexure,
                    AnnexureStatus::PendingReviewer2,
                    &actor.id,
                    Some("forwarded to second reviewer".to_string()),
                )),
            ])
            .await?;
        self.count_transition(EntityType::Annexure, AnnexureStatus::PendingReviewer2.as_str());
        self.count_op("forward_to_reviewer2", "ok");

        let annexure = self.committed(annexure_id).await?;
        self.emit_change(&snap.annexure, annexure.status);
        self.emit_notification(Notification {
            recipient_address: REVIEWER_2_POOL.to_string(),
            recipient_id: REVIEWER_2_POOL.to_string(),
            subject: format!("Annexure '{}' awaiting final review", annexure.name),
            body: format!(
                "Annexure '{}' passed first-stage review and awaits final approval.",
                annexure.name
            ),
            kind: NotificationKind::ForwardedToReviewer2,
            related_entity_type: EntityType::Annexure,
            related_entity_id: annexure_id,
        });

        Ok(OperationOutcome {
            annexure,
            invoice: snap.invoice,
        })
    }

    /// Final approval by the second reviewer. If a linked invoice sits in
    /// `PendingReviewer2` it advances to `Approved` inside the same
    /// transaction; any other invoice state is left untouched.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id))]
    pub async fn final_approve(
        &self,
        annexure_id: Uuid,
        actor: &Actor,
    ) -> Result<OperationOutcome, AppError> {
        let snap = self.load(annexure_id).await?;
        self.check_annexure_transition(actor, &snap, AnnexureStatus::Approved)?;

        let mut ops = vec![
            RepoOp::UpdateAnnexureStatus {
                annexure_id,
                status: AnnexureStatus::Approved,
            },
            RepoOp::AppendAudit(audit_trail::annexure_entry(
                &snap.annexure,
                AnnexureStatus::Approved,
                &actor.id,
                Some("final approval".to_string()),
            )),
        ];

        let mut synced_invoice = snap.invoice.clone();
        if let Some(invoice) = &snap.invoice {
            if invoice.status == InvoiceStatus::PendingReviewer2 {
                ops.push(RepoOp::UpdateInvoiceStatus {
                    invoice_id: invoice.invoice_id,
                    status: InvoiceStatus::Approved,
                });
                ops.push(RepoOp::AppendAudit(audit_trail::invoice_entry(
                    invoice,
                    InvoiceStatus::Approved,
                    &actor.id,
                    Some("synchronized with annexure approval".to_string()),
                )));
                let mut updated = invoice.clone();
                updated.status = InvoiceStatus::Approved;
                synced_invoice = Some(updated);
            }
        }

        self.repo.execute(ops).await?;
        self.count_transition(EntityType::Annexure, AnnexureStatus::Approved.as_str());
        self.count_op("final_approve", "ok");

        let annexure = self.committed(annexure_id).await?;
        self.emit_change(&snap.annexure, annexure.status);
        self.emit_notification(Notification {
            recipient_address: annexure.vendor_id.clone(),
            recipient_id: annexure.vendor_id.clone(),
            subject: format!("Annexure '{}' approved", annexure.name),
            body: format!("Annexure '{}' received final approval.", annexure.name),
            kind: NotificationKind::FinalApproved,
            related_entity_type: EntityType::Annexure,
            related_entity_id: annexure_id,
        });

        Ok(OperationOutcome {
            annexure,
            invoice: synced_invoice,
        })
    }

    /// Final rejection by the second reviewer.
    #[instrument(skip(self, actor, reason), fields(annexure_id = %annexure_id))]
    pub async fn final_reject(
        &self,
        annexure_id: Uuid,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<OperationOutcome, AppError> {
        let snap = self.load(annexure_id).await?;
        self.check_annexure_transition(actor, &snap, AnnexureStatus::RejectedByReviewer2)?;

        self.repo
            .execute(vec![
                RepoOp::UpdateAnnexureStatus {
                    annexure_id,
                    status: AnnexureStatus::RejectedByReviewer2,
                },
                RepoOp::AppendAudit(audit_trail::annexure_entry(
                    &snap.annexure,
                    AnnexureStatus::RejectedByReviewer2,
                    &actor.id,
                    reason.clone(),
                )),
            ])
            .await?;
        self.count_transition(
            EntityType::Annexure,
            AnnexureStatus::RejectedByReviewer2.as_str(),
        );
        self.count_op("final_reject", "ok");

        let annexure = self.committed(annexure_id).await?;
        self.emit_change(&snap.annexure, annexure.status);
        let body = reason.unwrap_or_else(|| "Rejected at final review.".to_string());
        self.emit_notification(Notification {
            recipient_address: annexure.vendor_id.clone(),
            recipient_id: annexure.vendor_id.clone(),
            subject: format!("Annexure '{}' rejected at final review", annexure.name),
            body: body.clone(),
            kind: NotificationKind::FinalRejected,
            related_entity_type: EntityType::Annexure,
            related_entity_id: annexure_id,
        });
        self.emit_notification(Notification {
            recipient_address: REVIEWER_1_POOL.to_string(),
            recipient_id: REVIEWER_1_POOL.to_string(),
            subject: format!("Annexure '{}' rejected at final review", annexure.name),
            body,
            kind: NotificationKind::FinalRejected,
            related_entity_type: EntityType::Annexure,
            related_entity_id: annexure_id,
        });

        Ok(OperationOutcome {
            annexure,
            invoice: snap.invoice,
        })
    }

    /// Return a rejected annexure to draft so the submitter can rework it.
    /// Rejected groups and their items reset to pending.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id))]
    pub async fn return_to_draft(
        &self,
        annexure_id: Uuid,
        actor: &Actor,
    ) -> Result<OperationOutcome, AppError> {
        let snap = self.load(annexure_id).await?;
        self.require_owner(&snap.annexure, actor)?;
        self.check_annexure_transition(actor, &snap, AnnexureStatus::Draft)?;

        let mut ops = Vec::new();
        for group in snap
            .groups
            .iter()
            .filter(|g| g.status == FileGroupStatus::Rejected)
        {
            ops.push(RepoOp::UpdateFileGroup {
                group_id: group.group_id,
                status: FileGroupStatus::Pending,
                rejection_reason: None,
            });
            ops.push(RepoOp::UpdateLineItemsInGroup {
                group_id: group.group_id,
                status: LineItemStatus::Pending,
                rejection_reason: None,
            });
        }
        ops.push(RepoOp::UpdateAnnexureStatus {
            annexure_id,
            status: AnnexureStatus::Draft,
        });
        ops.push(RepoOp::AppendAudit(audit_trail::annexure_entry(
            &snap.annexure,
            AnnexureStatus::Draft,
            &actor.id,
            Some("returned to draft for rework".to_string()),
        )));
        self.repo.execute(ops).await?;
        self.count_transition(EntityType::Annexure, AnnexureStatus::Draft.as_str());
        self.count_op("return_to_draft", "ok");

        let annexure = self.committed(annexure_id).await?;
        self.emit_change(&snap.annexure, annexure.status);

        Ok(OperationOutcome {
            annexure,
            invoice: snap.invoice,
        })
    }

    /// Delete an annexure while still in a pre-commit status. Children are
    /// unlinked and removed before the parent; attachment cleanup happens
    /// after commit and a failure there surfaces as a distinct partial
    /// failure rather than a rollback.
    #[instrument(skip(self, actor), fields(annexure_id = %annexure_id, actor_id = %actor.id))]
    pub async fn delete(&self, annexure_id: Uuid, actor: &Actor) -> Result<(), AppError> {
        let snap = self.load(annexure_id).await?;
        self.require_owner(&snap.annexure, actor)?;

        if !snap.annexure.status.deletable() {
            self.count_op("delete", "denied");
            return Err(AppError::PreconditionFailed {
                message: format!(
                    "Annexure '{}' cannot be deleted while {}",
                    snap.annexure.name,
                    snap.annexure.status.as_str()
                ),
                blockers: vec![format!("status is {}", snap.annexure.status.as_str())],
            });
        }

        let mut ops = vec![RepoOp::UnlinkLineItems { annexure_id }];
        if let Some(invoice) = &snap.invoice {
            ops.push(RepoOp::UnlinkInvoice {
                invoice_id: invoice.invoice_id,
            });
        }
        ops.push(RepoOp::DeleteFileGroups { annexure_id });
        ops.push(RepoOp::DeleteComments { annexure_id });
        ops.push(RepoOp::DeleteAnnexure { annexure_id });
        self.repo.execute(ops).await?;
        self.count_op("delete", "ok");
        info!(name = %snap.annexure.name, "Annexure deleted");

        if let Err(e) = self.documents.delete_documents_for(annexure_id).await {
            warn!(error = %e, "Attachment cleanup failed after annexure delete");
            return Err(AppError::PartialFailure {
                message: format!(
                    "Annexure '{}' was deleted but its attachments were not cleaned up: {}",
                    snap.annexure.name, e
                ),
                committed: "annexure, file groups, line item links, comments".to_string(),
            });
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    async fn load(&self, annexure_id: Uuid) -> Result<AnnexureSnapshot, AppError> {
        self.repo
            .annexure_snapshot(annexure_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Annexure {} not found", annexure_id)))
    }

    /// Re-read the committed annexure after a batch, so callers see the
    /// status the transaction actually produced.
    async fn committed(&self, annexure_id: Uuid) -> Result<Annexure, AppError> {
        self.repo
            .get_annexure(annexure_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Annexure {} not found", annexure_id)))
    }

    fn require_owner(&self, annexure: &Annexure, actor: &Actor) -> Result<(), AppError> {
        if actor.role != Role::Submitter || actor.id != annexure.vendor_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only the owning submitter may perform this operation on '{}'",
                annexure.name
            )));
        }
        Ok(())
    }

    fn check_annexure_transition(
        &self,
        actor: &Actor,
        snap: &AnnexureSnapshot,
        target: AnnexureStatus,
    ) -> Result<(), AppError> {
        let current = snap.annexure.status;
        if !transition::can_transition_annexure(actor.role, current, target) {
            return Err(AppError::TransitionDenied(format!(
                "Role {} may not move annexure '{}' from {} to {}",
                actor.role.as_str(),
                snap.annexure.name,
                current.as_str(),
                target.as_str()
            )));
        }
        Ok(())
    }

    /// Aggregate status the annexure would hold after setting the given
    /// groups to `status`. The in-transaction recompute makes the final
    /// call; this prediction only feeds the transition check.
    fn predict_status(
        &self,
        snap: &AnnexureSnapshot,
        group_ids: &[Uuid],
        status: FileGroupStatus,
    ) -> AnnexureStatus {
        let statuses: Vec<FileGroupStatus> = snap
            .groups
            .iter()
            .map(|g| {
                if group_ids.contains(&g.group_id) {
                    status
                } else {
                    g.status
                }
            })
            .collect();
        aggregation::derive_annexure_status(&statuses)
    }

    fn count_op(&self, operation: &str, outcome: &str) {
        WORKFLOW_OPS_TOTAL
            .with_label_values(&[operation, outcome])
            .inc();
    }

    fn count_transition(&self, entity_type: EntityType, to_status: &str) {
        TRANSITIONS_TOTAL
            .with_label_values(&[entity_type.as_str(), to_status])
            .inc();
    }

    /// Fire-and-forget notification; failures are logged, never surfaced.
    fn emit_notification(&self, notification: Notification) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(notification).await {
                warn!(error = %e, "Notification delivery failed");
            }
        });
    }

    fn emit_comment(&self, content: String, actor: &Actor, annexure_id: Option<Uuid>) {
        let comments = Arc::clone(&self.comments);
        let comment = workflow_comment(content, &actor.id, actor.role, annexure_id, None, false);
        tokio::spawn(async move {
            if let Err(e) = comments.append(comment).await {
                warn!(error = %e, "Comment append failed");
            }
        });
    }

    fn emit_change(&self, before: &Annexure, after: AnnexureStatus) {
        let changes = Arc::clone(&self.changes);
        let entity_id = before.annexure_id;
        let old_value = before.status.as_str();
        let new_value = after.as_str();
        let message = format!("annexure '{}' status changed", before.name);
        tokio::spawn(async move {
            if let Err(e) = changes
                .record_change(EntityType::Annexure, entity_id, old_value, new_value, &message)
                .await
            {
                warn!(error = %e, "Change log write failed");
            }
        });
    }
}
