//! Shared test harness: an orchestrator wired to the in-memory repository
//! with recording collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use settlement_service::models::{
    Actor, Annexure, AnnexureStatus, FileGroup, FileGroupStatus, Invoice, InvoiceStatus,
    LineItem, LineItemStatus, Role,
};
use settlement_service::repository::{InMemoryRepository, SettlementRepository};
use settlement_service::services::collaborators::{
    CollaboratorError, InMemoryDocumentStore, LoggingChangeLog, Notification, Notifier,
    RepoCommentLog,
};
use settlement_service::services::WorkflowOrchestrator;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const VENDOR_ID: &str = "acme-logistics";

/// Notifier that records every notification for assertions.
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError> {
        self.sent
            .lock()
            .expect("notifier poisoned")
            .push(notification);
        Ok(())
    }
}

pub struct TestApp {
    pub repo: Arc<InMemoryRepository>,
    pub orchestrator: WorkflowOrchestrator,
    pub notifier: Arc<RecordingNotifier>,
    pub documents: Arc<InMemoryDocumentStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_documents(InMemoryDocumentStore::new())
    }

    /// Harness whose attachment deletions fail, for the partial-failure
    /// path of delete.
    pub fn with_failing_attachments() -> Self {
        Self::with_documents(InMemoryDocumentStore::failing_deletes())
    }

    fn with_documents(documents: InMemoryDocumentStore) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let documents = Arc::new(documents);
        let repo_dyn: Arc<dyn SettlementRepository> = repo.clone();
        let orchestrator = WorkflowOrchestrator::new(
            repo_dyn.clone(),
            notifier.clone(),
            Arc::new(RepoCommentLog::new(repo_dyn)),
            Arc::new(LoggingChangeLog),
            documents.clone(),
        );
        Self {
            repo,
            orchestrator,
            notifier,
            documents,
        }
    }

    /// Let spawned fire-and-forget tasks run before asserting on them.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    pub fn seed_annexure(&self, name: &str, status: AnnexureStatus) -> Uuid {
        let annexure_id = Uuid::new_v4();
        self.repo.insert_annexure(Annexure {
            annexure_id,
            name: name.to_string(),
            status,
            vendor_id: VENDOR_ID.to_string(),
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        });
        annexure_id
    }

    pub fn seed_group(
        &self,
        annexure_id: Uuid,
        file_number: &str,
        status: FileGroupStatus,
    ) -> Uuid {
        let group_id = Uuid::new_v4();
        self.repo.insert_file_group(FileGroup {
            group_id,
            annexure_id,
            file_number: file_number.to_string(),
            status,
            rejection_reason: None,
        });
        group_id
    }

    pub fn seed_item(&self, spec: ItemSpec) -> Uuid {
        let line_item_id = Uuid::new_v4();
        self.repo.insert_line_item(LineItem {
            line_item_id,
            lr_number: spec.lr_number.to_string(),
            file_number: spec.file_number.to_string(),
            status: spec.status,
            offered_price: spec.line_price,
            settled_price: Decimal::ZERO,
            extra_cost: spec.extra_cost,
            line_price: spec.line_price,
            pod_url: spec.pod_url.map(str::to_string),
            annexure_id: Some(spec.annexure_id),
            group_id: Some(spec.group_id),
            invoice_id: None,
            is_invoiced: false,
            rejection_reason: None,
        });
        line_item_id
    }

    pub fn seed_invoice(&self, annexure_id: Uuid, status: InvoiceStatus) -> Uuid {
        let invoice_id = Uuid::new_v4();
        self.repo.insert_invoice(Invoice {
            invoice_id,
            reference_number: format!("ACM-20260801-{}", &invoice_id.to_string()[..3]),
            status,
            annexure_id: Some(annexure_id),
            vendor_id: VENDOR_ID.to_string(),
            subtotal: Decimal::from(575),
            tax_total: Decimal::ZERO,
            grand_total: Decimal::from(575),
            created_utc: Utc::now(),
        });
        invoice_id
    }

    /// The reference scenario: two files, 3 LRs at 100/200/150 in file A
    /// and 2 LRs at 50/75 in file B, all with PODs and no extra cost.
    pub fn seed_complete_annexure(&self, status: AnnexureStatus) -> SeededAnnexure {
        let annexure_id = self.seed_annexure("AX-2026-001", status);
        let group_a = self.seed_group(annexure_id, "FILE-A", FileGroupStatus::Pending);
        let group_b = self.seed_group(annexure_id, "FILE-B", FileGroupStatus::Pending);

        let mut items = Vec::new();
        for (lr, price) in [("LR-001", 100u32), ("LR-002", 200), ("LR-003", 150)] {
            items.push(self.seed_item(ItemSpec::new(
                annexure_id,
                group_a,
                "FILE-A",
                lr,
                Decimal::from(price),
            )));
        }
        for (lr, price) in [("LR-004", 50u32), ("LR-005", 75)] {
            items.push(self.seed_item(ItemSpec::new(
                annexure_id,
                group_b,
                "FILE-B",
                lr,
                Decimal::from(price),
            )));
        }

        SeededAnnexure {
            annexure_id,
            group_a,
            group_b,
            items,
        }
    }
}

pub struct SeededAnnexure {
    pub annexure_id: Uuid,
    pub group_a: Uuid,
    pub group_b: Uuid,
    pub items: Vec<Uuid>,
}

pub struct ItemSpec<'a> {
    pub annexure_id: Uuid,
    pub group_id: Uuid,
    pub file_number: &'a str,
    pub lr_number: &'a str,
    pub line_price: Decimal,
    pub extra_cost: Decimal,
    pub pod_url: Option<&'a str>,
    pub status: LineItemStatus,
}

impl<'a> ItemSpec<'a> {
    pub fn new(
        annexure_id: Uuid,
        group_id: Uuid,
        file_number: &'a str,
        lr_number: &'a str,
        line_price: Decimal,
    ) -> Self {
        Self {
            annexure_id,
            group_id,
            file_number,
            lr_number,
            line_price,
            extra_cost: Decimal::ZERO,
            pod_url: Some("https://pods.example/scan.pdf"),
            status: LineItemStatus::Pending,
        }
    }

    pub fn without_pod(mut self) -> Self {
        self.pod_url = None;
        self
    }

    pub fn with_extra_cost(mut self, extra: Decimal) -> Self {
        self.extra_cost = extra;
        self
    }
}

pub fn submitter() -> Actor {
    Actor::new(VENDOR_ID, Role::Submitter)
}

pub fn reviewer1() -> Actor {
    Actor::new("reviewer-one", Role::Reviewer1)
}

pub fn reviewer2() -> Actor {
    Actor::new("reviewer-two", Role::Reviewer2)
}
