//! Collaborator boundaries the orchestrator emits to after commit.
//!
//! Notification, comment-log and change-log delivery are best-effort side
//! channels: failures are logged and never abort the primary mutation.
//! The document store is the one collaborator consulted for correctness
//! (the extra-cost gate in invoice generation).

use crate::models::{Comment, EntityType, Role};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Store error: {0}")]
    StoreFailed(String),
}

/// Notification template kinds emitted by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    SubmittedForReview,
    GroupRejected,
    ForwardedToReviewer2,
    FinalApproved,
    FinalRejected,
}

/// One notification handed to the delivery side channel.
#[derive(Debug, Clone)]
pub struct Notification {
    pub recipient_address: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub kind: NotificationKind,
    pub related_entity_type: EntityType,
    pub related_entity_id: Uuid,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait CommentLog: Send + Sync {
    async fn append(&self, comment: Comment) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait ChangeLog: Send + Sync {
    async fn record_change(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
        old_value: &str,
        new_value: &str,
        message: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Document attachments scoped to an annexure (blob mechanics out of scope).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether a supporting document for extra costs exists, keyed by file
    /// number.
    async fn has_extra_cost_document(
        &self,
        annexure_id: Uuid,
        file_number: &str,
    ) -> Result<bool, CollaboratorError>;

    /// Remove every attachment scoped to the annexure.
    async fn delete_documents_for(&self, annexure_id: Uuid) -> Result<(), CollaboratorError>;
}

/// Logging notifier used when no delivery transport is wired up.
pub struct LoggingNotifier {
    send_count: AtomicU64,
}

impl LoggingNotifier {
    pub fn new() -> Self {
        Self {
            send_count: AtomicU64::new(0),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

impl Default for LoggingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            recipient = %notification.recipient_address,
            subject = %notification.subject,
            kind = ?notification.kind,
            entity_id = %notification.related_entity_id,
            "[LOG] Notification would be sent"
        );

        Ok(())
    }
}

/// Change log that writes to the tracing pipeline.
pub struct LoggingChangeLog;

#[async_trait]
impl ChangeLog for LoggingChangeLog {
    async fn record_change(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
        old_value: &str,
        new_value: &str,
        message: &str,
    ) -> Result<(), CollaboratorError> {
        tracing::info!(
            entity_type = entity_type.as_str(),
            entity_id = %entity_id,
            old_value,
            new_value,
            "{}",
            message
        );
        Ok(())
    }
}

/// In-memory document store; doubles as the default (empty) store and the
/// test fixture for the extra-cost gate.
pub struct InMemoryDocumentStore {
    // (annexure_id, file_number) pairs that carry an extra-cost document
    docs: Mutex<HashSet<(Uuid, String)>>,
    fail_deletes: bool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(HashSet::new()),
            fail_deletes: false,
        }
    }

    /// A store whose deletions fail, for exercising the partial-failure
    /// path of the delete operation.
    pub fn failing_deletes() -> Self {
        Self {
            docs: Mutex::new(HashSet::new()),
            fail_deletes: true,
        }
    }

    pub fn put_extra_cost_document(&self, annexure_id: Uuid, file_number: &str) {
        self.docs
            .lock()
            .expect("document store poisoned")
            .insert((annexure_id, file_number.to_string()));
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn has_extra_cost_document(
        &self,
        annexure_id: Uuid,
        file_number: &str,
    ) -> Result<bool, CollaboratorError> {
        Ok(self
            .docs
            .lock()
            .expect("document store poisoned")
            .contains(&(annexure_id, file_number.to_string())))
    }

    async fn delete_documents_for(&self, annexure_id: Uuid) -> Result<(), CollaboratorError> {
        if self.fail_deletes {
            return Err(CollaboratorError::StoreFailed(
                "attachment backend unavailable".to_string(),
            ));
        }
        self.docs
            .lock()
            .expect("document store poisoned")
            .retain(|(a, _)| *a != annexure_id);
        Ok(())
    }
}

/// Comment log persisting through the settlement repository.
pub struct RepoCommentLog {
    repo: std::sync::Arc<dyn crate::repository::SettlementRepository>,
}

impl RepoCommentLog {
    pub fn new(repo: std::sync::Arc<dyn crate::repository::SettlementRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CommentLog for RepoCommentLog {
    async fn append(&self, comment: Comment) -> Result<(), CollaboratorError> {
        self.repo
            .create_comment(comment)
            .await
            .map_err(|e| CollaboratorError::StoreFailed(e.to_string()))
    }
}

/// Comment text for a reviewer action, mirrored into the comment log.
pub fn workflow_comment(
    content: String,
    author_id: &str,
    author_role: Role,
    annexure_id: Option<Uuid>,
    invoice_id: Option<Uuid>,
    is_private: bool,
) -> Comment {
    Comment {
        comment_id: Uuid::new_v4(),
        content,
        author_id: author_id.to_string(),
        author_role,
        annexure_id,
        invoice_id,
        is_private,
        created_utc: chrono::Utc::now(),
    }
}
