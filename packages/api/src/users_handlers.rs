// ABOUTME: HTTP request handlers for user operations
// ABOUTME: User administration and client-specialist links

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
use super::pagination::{PaginatedResponse, PaginationParams};
use super::response::{created, ok};
use autohub_core::UserRole;
use autohub_security::{ensure_admin, UserCreateInput};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

pub async fn create_user(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Json(input): Json<UserCreateInput>,
) -> ApiResult<impl IntoResponse> {
    ensure_admin(&current_user.actor())?;
    info!("Creating {} user {}", input.role, input.email);

    let user = db.user_storage.create_user(input).await?;
    Ok(created(user))
}

pub async fn list_users(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Query(query): Query<UserListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    ensure_admin(&current_user.actor())?;

    let (users, total) = db
        .user_storage
        .list_users_paginated(
            query.role,
            Some(pagination.limit()),
            Some(pagination.offset()),
        )
        .await?;

    Ok(ok(PaginatedResponse::new(users, &pagination, total)))
}

/// The user behind the identity headers
pub async fn get_me(
    State(db): State<DbState>,
    current_user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let user = db
        .user_storage
        .get_user(&current_user.id)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    if user.role != current_user.role {
        return Err(AppError::Unauthorized);
    }
    Ok(ok(user))
}

pub async fn link_specialist(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path((client_id, specialist_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    ensure_admin(&current_user.actor())?;
    info!("Linking specialist {} to client {}", specialist_id, client_id);

    db.user_storage
        .link_specialist(&client_id, &specialist_id)
        .await?;
    Ok(created(serde_json::json!({
        "client_id": client_id,
        "specialist_id": specialist_id,
    })))
}

pub async fn unlink_specialist(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path((client_id, specialist_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    ensure_admin(&current_user.actor())?;
    info!(
        "Unlinking specialist {} from client {}",
        specialist_id, client_id
    );

    db.user_storage
        .unlink_specialist(&client_id, &specialist_id)
        .await?;
    Ok(ok(serde_json::json!({ "message": "Specialist unlinked" })))
}

/// Clients a specialist follows; specialists may only list their own
pub async fn list_specialist_clients(
    State(db): State<DbState>,
    current_user: CurrentUser,
    Path(specialist_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let actor = current_user.actor();
    if !actor.is_admin() && actor.id != specialist_id {
        return Err(AppError::forbidden(
            "Specialists can only list their own clients",
        ));
    }

    let clients = db
        .user_storage
        .list_specialist_clients(&specialist_id)
        .await?;
    Ok(ok(clients))
}
