// ABOUTME: HTTP request handlers for inspection checklists
// ABOUTME: Partner draft lifecycle, evidences and checklist reads per vehicle

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::auth::CurrentUser;
use super::db::DbState;
use super::error::{ApiResult, AppError};
use super::response::{created, ok};
use autohub_checklists::ChecklistSaveInput;
use autohub_core::UserRole;

#[derive(Debug, Deserialize)]
pub struct ChecklistQuery {
    /// Required unless the caller is the partner
    pub partner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceRequest {
    pub item_key: String,
    pub storage_path: String,
}

pub async fn start_inspection(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Partner {} starting inspection of {}",
        current_user.id, vehicle_id
    );

    let detail = db
        .checklist_storage
        .start_inspection(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(detail))
}

pub async fn get_checklist(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
    Query(query): Query<ChecklistQuery>,
) -> ApiResult<impl IntoResponse> {
    let partner_id = match (query.partner_id, current_user.role) {
        (Some(partner_id), _) => partner_id,
        (None, UserRole::Partner) => current_user.id.clone(),
        (None, _) => {
            return Err(AppError::Validation(
                "partner_id is required".to_string(),
            ))
        }
    };

    let detail = db
        .checklist_storage
        .get_checklist(&current_user.actor(), &vehicle_id, &partner_id)
        .await?;
    Ok(ok(detail))
}

pub async fn save_checklist(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
    Json(input): Json<ChecklistSaveInput>,
) -> ApiResult<impl IntoResponse> {
    let detail = db
        .checklist_storage
        .save_checklist(&current_user.actor(), &vehicle_id, input)
        .await?;
    Ok(ok(detail))
}

pub async fn add_evidence(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
    Json(request): Json<EvidenceRequest>,
) -> ApiResult<impl IntoResponse> {
    let evidence = db
        .checklist_storage
        .add_evidence(
            &current_user.actor(),
            &vehicle_id,
            &request.item_key,
            &request.storage_path,
        )
        .await?;
    Ok(created(evidence))
}

pub async fn remove_evidence(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path((vehicle_id, evidence_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    db.checklist_storage
        .remove_evidence(&current_user.actor(), &vehicle_id, &evidence_id)
        .await?;
    Ok(ok(serde_json::json!({ "message": "Evidence removed" })))
}

pub async fn submit_checklist(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Partner {} submitting checklist for {}",
        current_user.id, vehicle_id
    );

    let detail = db
        .checklist_storage
        .submit_checklist(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(detail))
}

pub async fn list_vehicle_checklists(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let checklists = db
        .checklist_storage
        .list_vehicle_checklists(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(checklists))
}
