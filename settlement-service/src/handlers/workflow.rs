//! Thin request layer over the workflow orchestrator.
//!
//! Handlers translate JSON payloads into orchestrator calls and return the
//! orchestrator's structured errors verbatim via `AppError::into_response`.

use crate::models::{Actor, EntityType, Role};
use crate::services::metrics::ERRORS_TOTAL;
use crate::services::OperationOutcome;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use settlement_core::error::AppError;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ActorPayload {
    pub actor_id: String,
    pub actor_role: Role,
}

impl ActorPayload {
    fn actor(&self) -> Actor {
        Actor::new(self.actor_id.clone(), self.actor_role)
    }
}

#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    pub actor_id: String,
    pub actor_role: Role,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkApprovePayload {
    pub actor_id: String,
    pub actor_role: Role,
    pub group_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct FinalRejectPayload {
    pub actor_id: String,
    pub actor_role: Role,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Count the error by type before it leaves the request layer.
fn counted(error: AppError) -> AppError {
    let error_type = match &error {
        AppError::TransitionDenied(_) => "transition_denied",
        AppError::PreconditionFailed { .. } => "precondition_failed",
        AppError::ValidationFailed { .. } => "validation_failed",
        AppError::PartialFailure { .. } => "partial_failure",
        AppError::BadRequest(_) => "bad_request",
        AppError::NotFound(_) => "not_found",
        AppError::Forbidden(_) => "forbidden",
        AppError::Conflict(_) => "conflict",
        AppError::DatabaseError(_) => "db_error",
        _ => "internal_error",
    };
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
    error
}

fn outcome_response(outcome: OperationOutcome) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "annexure": outcome.annexure,
        "invoice": outcome.invoice,
    }))
}

pub async fn submit(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<ActorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .orchestrator
        .submit(annexure_id, &payload.actor())
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn approve_file_group(
    State(state): State<AppState>,
    Path((annexure_id, group_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ActorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .orchestrator
        .approve_file_group(annexure_id, group_id, &payload.actor())
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn reject_file_group(
    State(state): State<AppState>,
    Path((annexure_id, group_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RejectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::new(payload.actor_id.clone(), payload.actor_role);
    let outcome = state
        .orchestrator
        .reject_file_group(annexure_id, group_id, &actor, payload.reason)
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn bulk_approve_file_groups(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<BulkApprovePayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::new(payload.actor_id.clone(), payload.actor_role);
    let outcome = state
        .orchestrator
        .bulk_approve_file_groups(annexure_id, &payload.group_ids, &actor)
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn forward_to_reviewer2(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<ActorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .orchestrator
        .forward_to_reviewer2(annexure_id, &payload.actor())
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn final_approve(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<ActorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .orchestrator
        .final_approve(annexure_id, &payload.actor())
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn final_reject(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<FinalRejectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::new(payload.actor_id.clone(), payload.actor_role);
    let outcome = state
        .orchestrator
        .final_reject(annexure_id, &actor, payload.reason)
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn return_to_draft(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<ActorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .orchestrator
        .return_to_draft(annexure_id, &payload.actor())
        .await
        .map_err(counted)?;
    Ok(outcome_response(outcome))
}

pub async fn delete_annexure(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
    Json(payload): Json<ActorPayload>,
) -> Result<impl IntoResponse, AppError> {
    state
        .orchestrator
        .delete(annexure_id, &payload.actor())
        .await
        .map_err(counted)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn annexure_history(
    State(state): State<AppState>,
    Path(annexure_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state
        .repo
        .audit_entries(EntityType::Annexure, annexure_id)
        .await
        .map_err(counted)?;
    Ok(Json(json!({ "success": true, "history": entries })))
}
