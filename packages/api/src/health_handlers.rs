// ABOUTME: Health check endpoint
// ABOUTME: Reports service liveness and database reachability

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use super::db::DbState;
use super::error::ApiResult;
use super::response::ok;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    database: bool,
}

pub async fn health(State(db): State<DbState>) -> ApiResult<impl IntoResponse> {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&db.pool)
        .await
        .is_ok();

    Ok(ok(Health {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
