// ABOUTME: HTTP request handlers for vehicle operations
// ABOUTME: Registration, scoped listing, history, arrival and delivery

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
use autohub_vehicles::{
    VehicleCreateInput, VehicleFilter, VehicleScope, VehicleStatus, VehicleUpdateInput,
};

#[derive(Debug, Deserialize)]
pub struct VehicleListQuery {
    pub client_id: Option<String>,
    pub status: Option<VehicleStatus>,
    pub plate: Option<String>,
}

pub async fn list_vehicles(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Query(query): Query<VehicleListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Listing vehicles for {} {} (page: {})",
        current_user.role,
        current_user.id,
        pagination.page()
    );

    let scope = VehicleScope::for_actor(&current_user.actor());
    let filter = VehicleFilter {
        client_id: query.client_id,
        status: query.status,
        plate: query.plate,
    };

    let (vehicles, total) = db
        .vehicle_storage
        .list_vehicles_paginated(
            &scope,
            &filter,
            Some(pagination.limit()),
            Some(pagination.offset()),
        )
        .await?;

    Ok(ok(PaginatedResponse::new(vehicles, &pagination, total)))
}

pub async fn create_vehicle(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<VehicleCreateInput>,
) -> ApiResult<impl IntoResponse> {
    info!("Registering vehicle {}", input.plate);

    let vehicle = db
        .vehicle_storage
        .create_vehicle(&current_user.actor(), input)
        .await?;
    Ok(created(vehicle))
}

/// Dashboard counts per status, within the actor's scope
pub async fn status_counts(
    State(db): State<DbState>,
    current_user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let scope = VehicleScope::for_actor(&current_user.actor());
    let counts = db.vehicle_storage.status_counts(&scope).await?;
    Ok(ok(counts))
}

pub async fn get_vehicle(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let vehicle = db
        .vehicle_storage
        .get_vehicle_for(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(vehicle))
}

pub async fn update_vehicle(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
    Json(input): Json<VehicleUpdateInput>,
) -> ApiResult<impl IntoResponse> {
    info!("Updating vehicle {}", vehicle_id);

    let vehicle = db
        .vehicle_storage
        .update_vehicle(&current_user.actor(), &vehicle_id, input)
        .await?;
    Ok(ok(vehicle))
}

pub async fn delete_vehicle(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Deleting vehicle {}", vehicle_id);

    db.vehicle_storage
        .delete_vehicle(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(serde_json::json!({ "message": "Vehicle deleted" })))
}

pub async fn vehicle_history(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    db.vehicle_storage
        .get_vehicle_for(&current_user.actor(), &vehicle_id)
        .await?;

    let history = db.vehicle_storage.history(&vehicle_id).await?;
    Ok(ok(history))
}

pub async fn confirm_arrival(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Confirming arrival of vehicle {}", vehicle_id);

    let vehicle = db
        .collections
        .confirm_arrival(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(vehicle))
}

pub async fn mark_delivered(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(vehicle_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Delivering vehicle {}", vehicle_id);

    let vehicle = db
        .vehicle_storage
        .mark_delivered(&current_user.actor(), &vehicle_id)
        .await?;
    Ok(ok(vehicle))
}
