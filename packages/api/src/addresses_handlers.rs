// ABOUTME: HTTP request handlers for client addresses
// ABOUTME: Lists and registers pickup addresses

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::auth::CurrentUser;
use super::db::DbState;
use super::error::ApiResult;
use super::response::{created, ok};
use autohub_vehicles::AddressCreateInput;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    /// Defaults to the acting user
    pub client_id: Option<String>,
}

pub async fn list_addresses(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Query(query): Query<AddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user.actor();
    let client_id = query.client_id.unwrap_or_else(|| actor.id.clone());

    let addresses = db.address_storage.list_addresses(&actor, &client_id).await?;
    Ok(ok(addresses))
}

pub async fn create_address(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<AddressCreateInput>,
) -> ApiResult<impl IntoResponse> {
    info!("Creating address for client {}", current_user.id);

    let address = db
        .address_storage
        .create_address(&current_user.actor(), input)
        .await?;
    Ok(created(address))
}
