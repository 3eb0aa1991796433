//! Postgres adapter for the settlement repository.

use crate::models::{
    Annexure, AnnexureStatus, AuditEntry, Comment, EntityType, FileGroup, FileGroupStatus,
    Invoice, InvoiceStatus, LineItem, LineItemStatus, Rejection, Role,
};
use crate::repository::{AnnexureSnapshot, RepoOp, SettlementRepository};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::{aggregation, audit_trail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use settlement_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct AnnexureRow {
    annexure_id: Uuid,
    name: String,
    status: String,
    vendor_id: String,
    created_utc: DateTime<Utc>,
    updated_utc: DateTime<Utc>,
}

impl From<AnnexureRow> for Annexure {
    fn from(row: AnnexureRow) -> Self {
        Annexure {
            annexure_id: row.annexure_id,
            name: row.name,
            status: AnnexureStatus::from_string(&row.status),
            vendor_id: row.vendor_id,
            created_utc: row.created_utc,
            updated_utc: row.updated_utc,
        }
    }
}

#[derive(FromRow)]
struct FileGroupRow {
    group_id: Uuid,
    annexure_id: Uuid,
    file_number: String,
    status: String,
    rejection_reason: Option<String>,
}

impl From<FileGroupRow> for FileGroup {
    fn from(row: FileGroupRow) -> Self {
        FileGroup {
            group_id: row.group_id,
            annexure_id: row.annexure_id,
            file_number: row.file_number,
            status: FileGroupStatus::from_string(&row.status),
            rejection_reason: row.rejection_reason,
        }
    }
}

#[derive(FromRow)]
struct LineItemRow {
    line_item_id: Uuid,
    lr_number: String,
    file_number: String,
    status: String,
    offered_price: Decimal,
    settled_price: Decimal,
    extra_cost: Decimal,
    line_price: Decimal,
    pod_url: Option<String>,
    annexure_id: Option<Uuid>,
    group_id: Option<Uuid>,
    invoice_id: Option<Uuid>,
    is_invoiced: bool,
    rejection_reason: Option<String>,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            line_item_id: row.line_item_id,
            lr_number: row.lr_number,
            file_number: row.file_number,
            status: LineItemStatus::from_string(&row.status),
            offered_price: row.offered_price,
            settled_price: row.settled_price,
            extra_cost: row.extra_cost,
            line_price: row.line_price,
            pod_url: row.pod_url,
            annexure_id: row.annexure_id,
            group_id: row.group_id,
            invoice_id: row.invoice_id,
            is_invoiced: row.is_invoiced,
            rejection_reason: row.rejection_reason,
        }
    }
}

#[derive(FromRow)]
struct InvoiceRow {
    invoice_id: Uuid,
    reference_number: String,
    status: String,
    annexure_id: Option<Uuid>,
    vendor_id: String,
    subtotal: Decimal,
    tax_total: Decimal,
    grand_total: Decimal,
    created_utc: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            invoice_id: row.invoice_id,
            reference_number: row.reference_number,
            status: InvoiceStatus::from_string(&row.status),
            annexure_id: row.annexure_id,
            vendor_id: row.vendor_id,
            subtotal: row.subtotal,
            tax_total: row.tax_total,
            grand_total: row.grand_total,
            created_utc: row.created_utc,
        }
    }
}

#[derive(FromRow)]
struct AuditRow {
    audit_id: Uuid,
    entity_type: String,
    entity_id: Uuid,
    from_status: String,
    to_status: String,
    actor_id: String,
    note: Option<String>,
    recorded_utc: DateTime<Utc>,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        AuditEntry {
            audit_id: row.audit_id,
            entity_type: EntityType::from_string(&row.entity_type),
            entity_id: row.entity_id,
            from_status: row.from_status,
            to_status: row.to_status,
            actor_id: row.actor_id,
            note: row.note,
            recorded_utc: row.recorded_utc,
        }
    }
}

#[derive(FromRow)]
struct RejectionRow {
    rejection_id: Uuid,
    annexure_id: Uuid,
    group_id: Uuid,
    reason: String,
    rejected_by: String,
    recorded_utc: DateTime<Utc>,
}

impl From<RejectionRow> for Rejection {
    fn from(row: RejectionRow) -> Self {
        Rejection {
            rejection_id: row.rejection_id,
            annexure_id: row.annexure_id,
            group_id: row.group_id,
            reason: row.reason,
            rejected_by: row.rejected_by,
            recorded_utc: row.recorded_utc,
        }
    }
}

#[derive(FromRow)]
struct CommentRow {
    comment_id: Uuid,
    content: String,
    author_id: String,
    author_role: String,
    annexure_id: Option<Uuid>,
    invoice_id: Option<Uuid>,
    is_private: bool,
    created_utc: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            comment_id: row.comment_id,
            content: row.content,
            author_id: row.author_id,
            author_role: Role::from_string(&row.author_role),
            annexure_id: row.annexure_id,
            invoice_id: row.invoice_id,
            is_private: row.is_private,
            created_utc: row.created_utc,
        }
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS annexures (
        annexure_id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        status TEXT NOT NULL,
        vendor_id TEXT NOT NULL,
        created_utc TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_utc TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS file_groups (
        group_id UUID PRIMARY KEY,
        annexure_id UUID NOT NULL REFERENCES annexures (annexure_id),
        file_number TEXT NOT NULL,
        status TEXT NOT NULL,
        rejection_reason TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        invoice_id UUID PRIMARY KEY,
        reference_number TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL,
        annexure_id UUID REFERENCES annexures (annexure_id),
        vendor_id TEXT NOT NULL,
        subtotal NUMERIC NOT NULL DEFAULT 0,
        tax_total NUMERIC NOT NULL DEFAULT 0,
        grand_total NUMERIC NOT NULL DEFAULT 0,
        created_utc TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS line_items (
        line_item_id UUID PRIMARY KEY,
        lr_number TEXT NOT NULL UNIQUE,
        file_number TEXT NOT NULL,
        status TEXT NOT NULL,
        offered_price NUMERIC NOT NULL DEFAULT 0,
        settled_price NUMERIC NOT NULL DEFAULT 0,
        extra_cost NUMERIC NOT NULL DEFAULT 0,
        line_price NUMERIC NOT NULL DEFAULT 0,
        pod_url TEXT,
        annexure_id UUID REFERENCES annexures (annexure_id),
        group_id UUID REFERENCES file_groups (group_id),
        invoice_id UUID REFERENCES invoices (invoice_id),
        is_invoiced BOOLEAN NOT NULL DEFAULT FALSE,
        rejection_reason TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_entries (
        audit_id UUID PRIMARY KEY,
        entity_type TEXT NOT NULL,
        entity_id UUID NOT NULL,
        from_status TEXT NOT NULL,
        to_status TEXT NOT NULL,
        actor_id TEXT NOT NULL,
        note TEXT,
        recorded_utc TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rejections (
        rejection_id UUID PRIMARY KEY,
        annexure_id UUID NOT NULL,
        group_id UUID NOT NULL,
        reason TEXT NOT NULL,
        rejected_by TEXT NOT NULL,
        recorded_utc TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        comment_id UUID PRIMARY KEY,
        content TEXT NOT NULL,
        author_id TEXT NOT NULL,
        author_role TEXT NOT NULL,
        annexure_id UUID,
        invoice_id UUID,
        is_private BOOLEAN NOT NULL DEFAULT FALSE,
        created_utc TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

impl PgRepository {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "settlement-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the workflow tables when they do not exist yet.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        info!("Ensuring settlement schema");
        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Schema setup failed: {}", e)))?;
        }
        Ok(())
    }

    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        op: RepoOp,
    ) -> Result<(), AppError> {
        match op {
            RepoOp::UpdateAnnexureStatus {
                annexure_id,
                status,
            } => {
                sqlx::query(
                    "UPDATE annexures SET status = $2, updated_utc = NOW() WHERE annexure_id = $1",
                )
                .bind(annexure_id)
                .bind(status.as_str())
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::RecomputeAnnexureStatus {
                annexure_id,
                actor_id,
                note,
            } => {
                // Lock the parent row so two concurrent recomputes for the
                // same annexure serialize instead of racing each other.
                let current: Option<String> = sqlx::query_scalar(
                    "SELECT status FROM annexures WHERE annexure_id = $1 FOR UPDATE",
                )
                .bind(annexure_id)
                .fetch_optional(&mut **tx)
                .await?;
                let Some(current) = current else {
                    return Err(AppError::NotFound(anyhow::anyhow!(
                        "Annexure {} not found",
                        annexure_id
                    )));
                };

                let group_statuses: Vec<String> = sqlx::query_scalar(
                    "SELECT status FROM file_groups WHERE annexure_id = $1",
                )
                .bind(annexure_id)
                .fetch_all(&mut **tx)
                .await?;
                if group_statuses.is_empty() {
                    return Ok(());
                }

                let statuses: Vec<FileGroupStatus> = group_statuses
                    .iter()
                    .map(|s| FileGroupStatus::from_string(s))
                    .collect();
                let derived = aggregation::derive_annexure_status(&statuses);
                if derived.as_str() != current {
                    sqlx::query(
                        "UPDATE annexures SET status = $2, updated_utc = NOW() WHERE annexure_id = $1",
                    )
                    .bind(annexure_id)
                    .bind(derived.as_str())
                    .execute(&mut **tx)
                    .await?;

                    let entry = audit_trail::entry(
                        EntityType::Annexure,
                        annexure_id,
                        &current,
                        derived.as_str(),
                        &actor_id,
                        note,
                    );
                    Self::insert_audit(tx, &entry).await?;
                }
            }
            RepoOp::UpdateFileGroup {
                group_id,
                status,
                rejection_reason,
            } => {
                sqlx::query(
                    "UPDATE file_groups SET status = $2, rejection_reason = $3 WHERE group_id = $1",
                )
                .bind(group_id)
                .bind(status.as_str())
                .bind(rejection_reason)
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::UpdateLineItemsInGroup {
                group_id,
                status,
                rejection_reason,
            } => {
                sqlx::query(
                    "UPDATE line_items SET status = $2, rejection_reason = $3 WHERE group_id = $1",
                )
                .bind(group_id)
                .bind(status.as_str())
                .bind(rejection_reason)
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::SetGroupSettledPrice {
                annexure_id,
                file_number,
                settled_price,
            } => {
                sqlx::query(
                    "UPDATE line_items SET settled_price = $3 WHERE annexure_id = $1 AND file_number = $2",
                )
                .bind(annexure_id)
                .bind(file_number)
                .bind(settled_price)
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::MarkItemsInvoiced {
                annexure_id,
                invoice_id,
            } => {
                sqlx::query(
                    "UPDATE line_items SET invoice_id = $2, is_invoiced = TRUE WHERE annexure_id = $1",
                )
                .bind(annexure_id)
                .bind(invoice_id)
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::CreateInvoice(invoice) => {
                sqlx::query(
                    r#"
                    INSERT INTO invoices (invoice_id, reference_number, status, annexure_id,
                        vendor_id, subtotal, tax_total, grand_total, created_utc)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(invoice.invoice_id)
                .bind(&invoice.reference_number)
                .bind(invoice.status.as_str())
                .bind(invoice.annexure_id)
                .bind(&invoice.vendor_id)
                .bind(invoice.subtotal)
                .bind(invoice.tax_total)
                .bind(invoice.grand_total)
                .bind(invoice.created_utc)
                .execute(&mut **tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                        AppError::Conflict(anyhow::anyhow!(
                            "Invoice reference '{}' already exists",
                            invoice.reference_number
                        ))
                    }
                    _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)),
                })?;
            }
            RepoOp::UpdateInvoiceStatus { invoice_id, status } => {
                sqlx::query("UPDATE invoices SET status = $2 WHERE invoice_id = $1")
                    .bind(invoice_id)
                    .bind(status.as_str())
                    .execute(&mut **tx)
                    .await?;
            }
            RepoOp::AppendAudit(entry) => {
                Self::insert_audit(tx, &entry).await?;
            }
            RepoOp::CreateRejection(rejection) => {
                sqlx::query(
                    r#"
                    INSERT INTO rejections (rejection_id, annexure_id, group_id, reason, rejected_by, recorded_utc)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(rejection.rejection_id)
                .bind(rejection.annexure_id)
                .bind(rejection.group_id)
                .bind(&rejection.reason)
                .bind(&rejection.rejected_by)
                .bind(rejection.recorded_utc)
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::UnlinkLineItems { annexure_id } => {
                sqlx::query(
                    r#"
                    UPDATE line_items
                    SET annexure_id = NULL, group_id = NULL, invoice_id = NULL,
                        is_invoiced = FALSE, offered_price = 0, settled_price = 0,
                        extra_cost = 0, line_price = 0
                    WHERE annexure_id = $1
                    "#,
                )
                .bind(annexure_id)
                .execute(&mut **tx)
                .await?;
            }
            RepoOp::UnlinkInvoice { invoice_id } => {
                sqlx::query("UPDATE invoices SET annexure_id = NULL WHERE invoice_id = $1")
                    .bind(invoice_id)
                    .execute(&mut **tx)
                    .await?;
            }
            RepoOp::DeleteFileGroups { annexure_id } => {
                sqlx::query("DELETE FROM file_groups WHERE annexure_id = $1")
                    .bind(annexure_id)
                    .execute(&mut **tx)
                    .await?;
            }
            RepoOp::DeleteComments { annexure_id } => {
                sqlx::query("DELETE FROM comments WHERE annexure_id = $1")
                    .bind(annexure_id)
                    .execute(&mut **tx)
                    .await?;
            }
            RepoOp::DeleteAnnexure { annexure_id } => {
                sqlx::query("DELETE FROM annexures WHERE annexure_id = $1")
                    .bind(annexure_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }
        Ok(())
    }

    async fn insert_audit(
        tx: &mut Transaction<'_, Postgres>,
        entry: &AuditEntry,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries (audit_id, entity_type, entity_id, from_status, to_status, actor_id, note, recorded_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.audit_id)
        .bind(entry.entity_type.as_str())
        .bind(entry.entity_id)
        .bind(&entry.from_status)
        .bind(&entry.to_status)
        .bind(&entry.actor_id)
        .bind(&entry.note)
        .bind(entry.recorded_utc)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettlementRepository for PgRepository {
    #[instrument(skip(self), fields(annexure_id = %annexure_id))]
    async fn annexure_snapshot(
        &self,
        annexure_id: Uuid,
    ) -> Result<Option<AnnexureSnapshot>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["annexure_snapshot"])
            .start_timer();

        let annexure = sqlx::query_as::<_, AnnexureRow>(
            "SELECT annexure_id, name, status, vendor_id, created_utc, updated_utc FROM annexures WHERE annexure_id = $1",
        )
        .bind(annexure_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(annexure) = annexure else {
            timer.observe_duration();
            return Ok(None);
        };

        let groups = sqlx::query_as::<_, FileGroupRow>(
            "SELECT group_id, annexure_id, file_number, status, rejection_reason FROM file_groups WHERE annexure_id = $1 ORDER BY file_number",
        )
        .bind(annexure_id)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT line_item_id, lr_number, file_number, status, offered_price, settled_price,
                extra_cost, line_price, pod_url, annexure_id, group_id, invoice_id, is_invoiced,
                rejection_reason
            FROM line_items WHERE annexure_id = $1 ORDER BY lr_number
            "#,
        )
        .bind(annexure_id)
        .fetch_all(&self.pool)
        .await?;

        let invoice = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, reference_number, status, annexure_id, vendor_id, subtotal,
                tax_total, grand_total, created_utc
            FROM invoices WHERE annexure_id = $1
            "#,
        )
        .bind(annexure_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(Some(AnnexureSnapshot {
            annexure: annexure.into(),
            groups: groups.into_iter().map(Into::into).collect(),
            items: items.into_iter().map(Into::into).collect(),
            invoice: invoice.map(Into::into),
        }))
    }

    async fn get_annexure(&self, annexure_id: Uuid) -> Result<Option<Annexure>, AppError> {
        let annexure = sqlx::query_as::<_, AnnexureRow>(
            "SELECT annexure_id, name, status, vendor_id, created_utc, updated_utc FROM annexures WHERE annexure_id = $1",
        )
        .bind(annexure_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(annexure.map(Into::into))
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, reference_number, status, annexure_id, vendor_id, subtotal,
                tax_total, grand_total, created_utc
            FROM invoices WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice.map(Into::into))
    }

    async fn audit_entries(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT audit_id, entity_type, entity_id, from_status, to_status, actor_id, note, recorded_utc
            FROM audit_entries
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY recorded_utc
            "#,
        )
        .bind(entity_type.as_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn rejections_for(&self, annexure_id: Uuid) -> Result<Vec<Rejection>, AppError> {
        let rows = sqlx::query_as::<_, RejectionRow>(
            r#"
            SELECT rejection_id, annexure_id, group_id, reason, rejected_by, recorded_utc
            FROM rejections WHERE annexure_id = $1 ORDER BY recorded_utc
            "#,
        )
        .bind(annexure_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn comments_for(&self, annexure_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT comment_id, content, author_id, author_role, annexure_id, invoice_id, is_private, created_utc
            FROM comments WHERE annexure_id = $1 ORDER BY created_utc
            "#,
        )
        .bind(annexure_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_comment(&self, comment: Comment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO comments (comment_id, content, author_id, author_role, annexure_id, invoice_id, is_private, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(comment.comment_id)
        .bind(&comment.content)
        .bind(&comment.author_id)
        .bind(comment.author_role.as_str())
        .bind(comment.annexure_id)
        .bind(comment.invoice_id)
        .bind(comment.is_private)
        .bind(comment.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, ops), fields(ops = ops.len()))]
    async fn execute(&self, ops: Vec<RepoOp>) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["execute_batch"])
            .start_timer();

        let mut tx = self.pool.begin().await?;
        for op in ops {
            Self::apply(&mut tx, op).await?;
        }
        tx.commit().await?;

        timer.observe_duration();
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}
