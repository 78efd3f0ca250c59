// ABOUTME: HTTP request handlers for quotes and services
// ABOUTME: Partner drafting, admin and client reviews, and service execution

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::auth::CurrentUser;
use super::db::DbState;
use super::error::ApiResult;
use super::pagination::{PaginatedResponse, PaginationParams};
use super::response::{created, ok};
use autohub_quotes::{
    AdminDecision, ClientDecision, QuoteCreateInput, QuoteFilter, QuoteItemInput, QuoteStatus,
};

#[derive(Debug, Deserialize)]
pub struct QuoteListQuery {
    pub partner_id: Option<String>,
    pub client_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<QuoteStatus>,
}

pub async fn list_quotes(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Query(query): Query<QuoteListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let filter = QuoteFilter {
        partner_id: query.partner_id,
        client_id: query.client_id,
        vehicle_id: query.vehicle_id,
        status: query.status,
    };

    let (quotes, total) = db
        .budgets
        .list_quotes(
            &current_user.actor(),
            &filter,
            Some(pagination.limit()),
            Some(pagination.offset()),
        )
        .await?;

    Ok(ok(PaginatedResponse::new(quotes, &pagination, total)))
}

pub async fn create_quote(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<QuoteCreateInput>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Partner {} creating quote for vehicle {}",
        current_user.id, input.vehicle_id
    );

    let detail = db.budgets.create_quote(&current_user.actor(), input).await?;
    Ok(created(detail))
}

pub async fn get_quote(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(quote_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let detail = db.budgets.get_quote(&current_user.actor(), &quote_id).await?;
    Ok(ok(detail))
}

pub async fn add_item(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(quote_id): Path<String>,
    Json(input): Json<QuoteItemInput>,
) -> ApiResult<impl IntoResponse> {
    let detail = db
        .budgets
        .add_item(&current_user.actor(), &quote_id, input)
        .await?;
    Ok(created(detail))
}

pub async fn remove_item(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path((quote_id, item_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let detail = db
        .budgets
        .remove_item(&current_user.actor(), &quote_id, &item_id)
        .await?;
    Ok(ok(detail))
}

pub async fn submit_quote(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(quote_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Submitting quote {}", quote_id);

    let detail = db
        .budgets
        .submit_quote(&current_user.actor(), &quote_id)
        .await?;
    Ok(ok(detail))
}

pub async fn admin_review(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(quote_id): Path<String>,
    Json(decision): Json<AdminDecision>,
) -> ApiResult<impl IntoResponse> {
    info!("Admin {} reviewing quote {}", current_user.id, quote_id);

    let detail = db
        .budgets
        .admin_review(&current_user.actor(), &quote_id, decision)
        .await?;
    Ok(ok(detail))
}

pub async fn client_review(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(quote_id): Path<String>,
    Json(decision): Json<ClientDecision>,
) -> ApiResult<impl IntoResponse> {
    info!("Client {} reviewing quote {}", current_user.id, quote_id);

    let detail = db
        .budgets
        .client_review(&current_user.actor(), &quote_id, decision)
        .await?;
    Ok(ok(detail))
}

pub async fn start_service(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(service_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let service = db
        .budgets
        .start_service(&current_user.actor(), &service_id)
        .await?;
    Ok(ok(service))
}

pub async fn complete_service(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(service_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Completing service {}", service_id);

    let service = db
        .budgets
        .complete_service(&current_user.actor(), &service_id)
        .await?;
    Ok(ok(service))
}
