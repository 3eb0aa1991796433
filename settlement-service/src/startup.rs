//! Application startup and lifecycle management.
//!
//! Wires the repository, collaborators and orchestrator into an axum
//! router and owns the HTTP server lifecycle.

use crate::config::SettlementConfig;
use crate::handlers::workflow;
use crate::repository::{InMemoryRepository, PgRepository, SettlementRepository};
use crate::services::collaborators::{
    ChangeLog, DocumentStore, InMemoryDocumentStore, LoggingChangeLog, LoggingNotifier, Notifier,
    RepoCommentLog,
};
use crate::services::{get_metrics, WorkflowOrchestrator};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use settlement_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: SettlementConfig,
    pub repo: Arc<dyn SettlementRepository>,
    pub orchestrator: Arc<WorkflowOrchestrator>,
}

/// Health check endpoint for liveness probes.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.repo.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "settlement-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "settlement-service",
                "error": e.to_string()
            })),
        ),
    }
}

/// Readiness check endpoint.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.repo.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SettlementConfig) -> Result<Self, AppError> {
        let repo: Arc<dyn SettlementRepository> = if config.database.enabled {
            let pg = PgRepository::new(
                &config.database.url,
                config.database.max_connections,
                config.database.min_connections,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to PostgreSQL: {}", e);
                e
            })?;
            pg.ensure_schema().await?;
            Arc::new(pg)
        } else {
            tracing::info!("Database disabled, running on the in-memory store");
            Arc::new(InMemoryRepository::new())
        };

        let notifier: Arc<dyn Notifier> = Arc::new(LoggingNotifier::new());
        let changes: Arc<dyn ChangeLog> = Arc::new(LoggingChangeLog);
        let documents: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let comments = Arc::new(RepoCommentLog::new(Arc::clone(&repo)));

        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            Arc::clone(&repo),
            notifier,
            comments,
            changes,
            documents,
        ));

        let state = AppState {
            config: config.clone(),
            repo,
            orchestrator,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/metrics", get(metrics_endpoint))
            .route("/api/annexures/:id/submit", post(workflow::submit))
            .route(
                "/api/annexures/:id/groups/:group_id/approve",
                post(workflow::approve_file_group),
            )
            .route(
                "/api/annexures/:id/groups/:group_id/reject",
                post(workflow::reject_file_group),
            )
            .route(
                "/api/annexures/:id/groups/bulk-approve",
                post(workflow::bulk_approve_file_groups),
            )
            .route(
                "/api/annexures/:id/forward",
                post(workflow::forward_to_reviewer2),
            )
            .route(
                "/api/annexures/:id/final-approve",
                post(workflow::final_approve),
            )
            .route(
                "/api/annexures/:id/final-reject",
                post(workflow::final_reject),
            )
            .route(
                "/api/annexures/:id/return-to-draft",
                post(workflow::return_to_draft),
            )
            .route(
                "/api/annexures/:id",
                axum::routing::delete(workflow::delete_annexure),
            )
            .route("/api/annexures/:id/history", get(workflow::annexure_history))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the HTTP server until the shutdown future resolves.
    pub async fn run_until_shutdown<F>(self, shutdown: F) -> Result<(), AppError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = Self::router(self.state);
        tracing::info!(port = self.port, "settlement-service listening");
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
