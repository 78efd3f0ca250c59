// ABOUTME: HTTP request handlers for collection scheduling
// ABOUTME: Define, price, reschedule, accept and reject pickups

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::auth::CurrentUser;
use super::db::DbState;
use super::error::ApiResult;
use super::response::{created, ok};
use autohub_collections::{CollectionFilter, CollectionStatus, DefineCollectionInput};

#[derive(Debug, Deserialize)]
pub struct CollectionListQuery {
    pub client_id: Option<String>,
    pub status: Option<CollectionStatus>,
}

/// Scopes the cleanup to one client when set
#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    pub client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeeRequest {
    pub fee: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn list_collections(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Query(query): Query<CollectionListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = CollectionFilter {
        client_id: query.client_id,
        status: query.status,
    };

    let collections = db
        .collections
        .list_collections(&current_user.actor(), filter)
        .await?;
    Ok(ok(collections))
}

pub async fn define_collection(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<DefineCollectionInput>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Client {} defining collection for {} vehicles",
        current_user.id,
        input.vehicle_ids.len()
    );

    let result = db
        .collections
        .define_collection(&current_user.actor(), input, today())
        .await?;
    Ok(created(result))
}

pub async fn cleanup_orphans(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Query(request): Query<CleanupRequest>,
) -> ApiResult<impl IntoResponse> {
    let removed = db
        .collections
        .cleanup_orphans(&current_user.actor(), request.client_id.as_deref())
        .await?;
    Ok(ok(serde_json::json!({ "removed": removed })))
}

pub async fn get_collection(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(collection_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let detail = db
        .collections
        .get_collection(&current_user.actor(), &collection_id)
        .await?;
    Ok(ok(detail))
}

pub async fn set_collection_fee(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(collection_id): Path<String>,
    Json(request): Json<FeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let summary = db
        .collections
        .set_collection_fee(&current_user.actor(), &collection_id, request.fee)
        .await?;
    Ok(ok(summary))
}

pub async fn propose_new_date(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(collection_id): Path<String>,
    Json(request): Json<DateRequest>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "{} {} moving collection {} to {}",
        current_user.role, current_user.id, collection_id, request.date
    );

    let summary = db
        .collections
        .propose_new_date(&current_user.actor(), &collection_id, request.date, today())
        .await?;
    Ok(ok(summary))
}

pub async fn accept_collection(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(collection_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let summary = db
        .collections
        .accept_collection(&current_user.actor(), &collection_id)
        .await?;
    Ok(ok(summary))
}

pub async fn reject_collection(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(collection_id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<impl IntoResponse> {
    let summary = db
        .collections
        .reject_collection(&current_user.actor(), &collection_id, request.reason)
        .await?;
    Ok(ok(summary))
}
