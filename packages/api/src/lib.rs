// ABOUTME: HTTP API layer for AutoHub providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod addresses_handlers;
pub mod auth;
pub mod checklists_handlers;
pub mod collections_handlers;
pub mod db;
pub mod error;
pub mod health_handlers;
pub mod pagination;
pub mod quotes_handlers;
pub mod response;
pub mod users_handlers;
pub mod vehicles_handlers;

pub use auth::{CurrentUser, USER_ID_HEADER, USER_ROLE_HEADER};
pub use db::DbState;
pub use error::{ApiResult, AppError};

/// Creates the users API router
pub fn create_users_router() -> Router<DbState> {
    Router::new()
        .route("/", get(users_handlers::list_users))
        .route("/", post(users_handlers::create_user))
        .route("/me", get(users_handlers::get_me))
        .route(
            "/{client_id}/specialists/{specialist_id}",
            post(users_handlers::link_specialist),
        )
        .route(
            "/{client_id}/specialists/{specialist_id}",
            delete(users_handlers::unlink_specialist),
        )
        .route(
            "/specialists/{specialist_id}/clients",
            get(users_handlers::list_specialist_clients),
        )
}

/// Creates the addresses API router
pub fn create_addresses_router() -> Router<DbState> {
    Router::new()
        .route("/", get(addresses_handlers::list_addresses))
        .route("/", post(addresses_handlers::create_address))
}

/// Creates the vehicles API router, including the per-vehicle checklist routes
pub fn create_vehicles_router() -> Router<DbState> {
    Router::new()
        .route("/", get(vehicles_handlers::list_vehicles))
        .route("/", post(vehicles_handlers::create_vehicle))
        .route("/counts", get(vehicles_handlers::status_counts))
        .route("/{id}", get(vehicles_handlers::get_vehicle))
        .route("/{id}", put(vehicles_handlers::update_vehicle))
        .route("/{id}", delete(vehicles_handlers::delete_vehicle))
        .route("/{id}/history", get(vehicles_handlers::vehicle_history))
        .route(
            "/{id}/confirm-arrival",
            post(vehicles_handlers::confirm_arrival),
        )
        .route("/{id}/deliver", post(vehicles_handlers::mark_delivered))
        // Inspection checklists
        .route(
            "/{id}/checklist/start",
            post(checklists_handlers::start_inspection),
        )
        .route("/{id}/checklist", get(checklists_handlers::get_checklist))
        .route("/{id}/checklist", put(checklists_handlers::save_checklist))
        .route(
            "/{id}/checklist/evidences",
            post(checklists_handlers::add_evidence),
        )
        .route(
            "/{id}/checklist/evidences/{evidence_id}",
            delete(checklists_handlers::remove_evidence),
        )
        .route(
            "/{id}/checklist/submit",
            post(checklists_handlers::submit_checklist),
        )
        .route(
            "/{id}/checklists",
            get(checklists_handlers::list_vehicle_checklists),
        )
}

/// Creates the collections API router
pub fn create_collections_router() -> Router<DbState> {
    Router::new()
        .route("/", get(collections_handlers::list_collections))
        .route("/define", post(collections_handlers::define_collection))
        .route("/cleanup", post(collections_handlers::cleanup_orphans))
        .route("/{id}", get(collections_handlers::get_collection))
        .route("/{id}/fee", put(collections_handlers::set_collection_fee))
        .route("/{id}/date", put(collections_handlers::propose_new_date))
        .route("/{id}/accept", post(collections_handlers::accept_collection))
        .route("/{id}/reject", post(collections_handlers::reject_collection))
}

/// Creates the quotes API router
pub fn create_quotes_router() -> Router<DbState> {
    Router::new()
        .route("/", get(quotes_handlers::list_quotes))
        .route("/", post(quotes_handlers::create_quote))
        .route("/{id}", get(quotes_handlers::get_quote))
        .route("/{id}/items", post(quotes_handlers::add_item))
        .route(
            "/{id}/items/{item_id}",
            delete(quotes_handlers::remove_item),
        )
        .route("/{id}/submit", post(quotes_handlers::submit_quote))
        .route("/{id}/admin-review", post(quotes_handlers::admin_review))
        .route("/{id}/client-review", post(quotes_handlers::client_review))
}

/// Creates the services API router
pub fn create_services_router() -> Router<DbState> {
    Router::new()
        .route("/{id}/start", post(quotes_handlers::start_service))
        .route("/{id}/complete", post(quotes_handlers::complete_service))
}

/// Full API surface under `/api`, bound to `db`
pub fn create_app(db: DbState) -> Router {
    Router::new()
        .route("/api/health", get(health_handlers::health))
        .nest("/api/users", create_users_router())
        .nest("/api/addresses", create_addresses_router())
        .nest("/api/vehicles", create_vehicles_router())
        .nest("/api/collections", create_collections_router())
        .nest("/api/quotes", create_quotes_router())
        .nest("/api/services", create_services_router())
        .with_state(db)
}
