// ABOUTME: Budget workflow from partner draft to executed services
// ABOUTME: Admin and client reviews, partial item rejection and cascading statuses

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::storage::{self, QuoteStorage};
use super::types::{
    AdminDecision, ClientDecision, Quote, QuoteCreateInput, QuoteDetail, QuoteFilter,
    QuoteItemInput, QuoteItemStatus, QuoteStatus, Service, ServiceStatus,
};
use autohub_core::{generate_id, Actor, UserRole};
use autohub_security::{ensure_admin, ensure_client_access};
use autohub_storage::StorageError;
use autohub_vehicles::{row_to_vehicle, transition_vehicles, VehicleScope, VehicleStatus};

/// Vehicle statuses in which a partner may open a quote
const QUOTABLE: [VehicleStatus; 3] = [
    VehicleStatus::ArrivalConfirmed,
    VehicleStatus::InAnalysis,
    VehicleStatus::AnalysisFinished,
];

pub struct BudgetWorkflow {
    pool: SqlitePool,
    quotes: QuoteStorage,
}

impl BudgetWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            quotes: QuoteStorage::new(pool.clone()),
            pool,
        }
    }

    /// Open a draft quote for a vehicle in the yard
    pub async fn create_quote(
        &self,
        actor: &Actor,
        input: QuoteCreateInput,
    ) -> Result<QuoteDetail, StorageError> {
        actor.require_role(&[UserRole::Partner])?;

        let category = input.category.trim();
        if category.is_empty() {
            return Err(StorageError::Validation("Category cannot be empty".to_string()));
        }
        if input.estimated_days.is_some_and(|days| days < 0) {
            return Err(StorageError::Validation(
                "Estimated days cannot be negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM vehicles WHERE id = ?")
            .bind(&input.vehicle_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::not_found_or("Vehicle"))?;
        let vehicle = row_to_vehicle(&row)?;

        if !QUOTABLE.contains(&vehicle.status) {
            return Err(StorageError::InvalidState(format!(
                "Vehicle {} is {} and cannot be quoted",
                vehicle.plate, vehicle.status
            )));
        }

        let existing: Vec<QuoteStatus> =
            sqlx::query_scalar("SELECT status FROM quotes WHERE vehicle_id = ? AND partner_id = ?")
                .bind(&vehicle.id)
                .bind(&actor.id)
                .fetch_all(&mut *tx)
                .await?;
        if existing.iter().any(QuoteStatus::is_open) {
            return Err(StorageError::Conflict(format!(
                "Partner already has an open quote for vehicle {}",
                vehicle.plate
            )));
        }

        let quote_id = generate_id("quote");
        let now = Utc::now();

        debug!("Creating quote: {} (vehicle: {})", quote_id, vehicle.id);

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, vehicle_id, client_id, partner_id, category, status,
                total_value, estimated_days, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, '0', ?, ?, ?)
            "#,
        )
        .bind(&quote_id)
        .bind(&vehicle.id)
        .bind(&vehicle.client_id)
        .bind(&actor.id)
        .bind(category)
        .bind(QuoteStatus::Draft)
        .bind(input.estimated_days)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &input.items {
            storage::insert_item(&mut tx, &quote_id, item).await?;
        }
        let total = storage::refresh_total(&mut tx, &quote_id).await?;

        let detail = storage::load_detail(&mut tx, &quote_id).await?;
        tx.commit().await?;

        info!(
            "Quote {} created by partner {} with {} items (total {})",
            quote_id,
            actor.id,
            input.items.len(),
            total
        );
        Ok(detail)
    }

    pub async fn add_item(
        &self,
        actor: &Actor,
        quote_id: &str,
        input: QuoteItemInput,
    ) -> Result<QuoteDetail, StorageError> {
        let mut tx = self.pool.begin().await?;

        let quote = storage::load_quote(&mut tx, quote_id).await?;
        ensure_partner(actor, &quote)?;
        ensure_status(&quote, QuoteStatus::Draft)?;

        storage::insert_item(&mut tx, quote_id, &input).await?;
        storage::refresh_total(&mut tx, quote_id).await?;

        let detail = storage::load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn remove_item(
        &self,
        actor: &Actor,
        quote_id: &str,
        item_id: &str,
    ) -> Result<QuoteDetail, StorageError> {
        let mut tx = self.pool.begin().await?;

        let quote = storage::load_quote(&mut tx, quote_id).await?;
        ensure_partner(actor, &quote)?;
        ensure_status(&quote, QuoteStatus::Draft)?;

        let result = sqlx::query("DELETE FROM quote_items WHERE id = ? AND quote_id = ?")
            .bind(item_id)
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Quote item".to_string()));
        }
        storage::refresh_total(&mut tx, quote_id).await?;

        let detail = storage::load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Send a draft to the admin queue
    pub async fn submit_quote(
        &self,
        actor: &Actor,
        quote_id: &str,
    ) -> Result<QuoteDetail, StorageError> {
        let mut tx = self.pool.begin().await?;

        let quote = storage::load_quote(&mut tx, quote_id).await?;
        ensure_partner(actor, &quote)?;
        ensure_status(&quote, QuoteStatus::Draft)?;

        let items = storage::load_items(&mut tx, quote_id).await?;
        if items.is_empty() {
            return Err(StorageError::Validation(
                "A quote needs at least one item to be submitted".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query("UPDATE quotes SET status = ?, submitted_at = ?, updated_at = ? WHERE id = ?")
            .bind(QuoteStatus::PendingAdminApproval)
            .bind(now)
            .bind(now)
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;

        let detail = storage::load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        info!("Quote {} submitted for admin approval", quote_id);
        Ok(detail)
    }

    pub async fn admin_review(
        &self,
        actor: &Actor,
        quote_id: &str,
        decision: AdminDecision,
    ) -> Result<QuoteDetail, StorageError> {
        ensure_admin(actor)?;

        let mut tx = self.pool.begin().await?;

        let quote = storage::load_quote(&mut tx, quote_id).await?;
        ensure_status(&quote, QuoteStatus::PendingAdminApproval)?;

        match decision {
            AdminDecision::Approve => {
                storage::set_quote_status(&mut tx, quote_id, QuoteStatus::PendingClientApproval)
                    .await?;
            }
            AdminDecision::Reject { reason } => {
                reject_quote(&mut tx, quote_id, Some(reason.as_str())).await?;
            }
            AdminDecision::RequestChanges { notes } => {
                sqlx::query(
                    "UPDATE quotes SET status = ?, admin_notes = ?, updated_at = ? WHERE id = ?",
                )
                .bind(QuoteStatus::Draft)
                .bind(notes.trim())
                .bind(Utc::now())
                .bind(quote_id)
                .execute(&mut *tx)
                .await?;
            }
            AdminDecision::Partial {
                rejected_item_ids,
                reason,
            } => {
                let remaining =
                    reject_items(&mut tx, quote_id, &rejected_item_ids, reason.as_deref()).await?;
                if remaining == 0 {
                    reject_quote(&mut tx, quote_id, reason.as_deref()).await?;
                } else {
                    storage::set_quote_status(
                        &mut tx,
                        quote_id,
                        QuoteStatus::PendingClientApproval,
                    )
                    .await?;
                }
            }
        }

        let detail = storage::load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        info!(
            "Admin {} reviewed quote {}: {}",
            actor.id, quote_id, detail.quote.status
        );
        Ok(detail)
    }

    pub async fn client_review(
        &self,
        actor: &Actor,
        quote_id: &str,
        decision: ClientDecision,
    ) -> Result<QuoteDetail, StorageError> {
        actor.require_role(&[UserRole::Client])?;

        let mut tx = self.pool.begin().await?;

        let quote = storage::load_quote(&mut tx, quote_id).await?;
        if quote.client_id != actor.id {
            return Err(StorageError::Forbidden(format!(
                "Quote {} belongs to another client",
                quote_id
            )));
        }
        ensure_status(&quote, QuoteStatus::PendingClientApproval)?;

        match decision {
            ClientDecision::Approve => {
                approve_quote(&mut tx, &quote, &actor.id).await?;
            }
            ClientDecision::Reject { reason } => {
                reject_quote(&mut tx, quote_id, reason.as_deref()).await?;
            }
            ClientDecision::Partial {
                rejected_item_ids,
                reason,
            } => {
                let remaining =
                    reject_items(&mut tx, quote_id, &rejected_item_ids, reason.as_deref()).await?;
                if remaining == 0 {
                    reject_quote(&mut tx, quote_id, reason.as_deref()).await?;
                } else {
                    approve_quote(&mut tx, &quote, &actor.id).await?;
                }
            }
        }

        let detail = storage::load_detail(&mut tx, quote_id).await?;
        tx.commit().await?;

        info!(
            "Client {} reviewed quote {}: {} (total {})",
            actor.id, quote_id, detail.quote.status, detail.quote.total_value
        );
        Ok(detail)
    }

    pub async fn start_service(
        &self,
        actor: &Actor,
        service_id: &str,
    ) -> Result<Service, StorageError> {
        actor.require_role(&[UserRole::Partner, UserRole::Admin])?;

        let mut tx = self.pool.begin().await?;

        let service = storage::load_service(&mut tx, service_id).await?;
        ensure_service_owner(actor, &service)?;
        ensure_service_status(&service, ServiceStatus::Pending)?;

        let now = Utc::now();
        sqlx::query("UPDATE services SET status = ?, started_at = ?, updated_at = ? WHERE id = ?")
            .bind(ServiceStatus::InProgress)
            .bind(now)
            .bind(now)
            .bind(service_id)
            .execute(&mut *tx)
            .await?;

        transition_vehicles(
            &mut tx,
            std::slice::from_ref(&service.vehicle_id),
            &[VehicleStatus::BudgetApproved],
            VehicleStatus::ExecutionStarted,
            &actor.id,
            Some("execution started"),
        )
        .await?;

        let service = storage::load_service(&mut tx, service_id).await?;
        tx.commit().await?;

        info!("Service {} started", service_id);
        Ok(service)
    }

    /// Finish a service; the last one closes the quote and the vehicle's execution
    pub async fn complete_service(
        &self,
        actor: &Actor,
        service_id: &str,
    ) -> Result<Service, StorageError> {
        actor.require_role(&[UserRole::Partner, UserRole::Admin])?;

        let mut tx = self.pool.begin().await?;

        let service = storage::load_service(&mut tx, service_id).await?;
        ensure_service_owner(actor, &service)?;
        ensure_service_status(&service, ServiceStatus::InProgress)?;

        let now = Utc::now();
        sqlx::query(
            "UPDATE services SET status = ?, completed_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(ServiceStatus::Completed)
        .bind(now)
        .bind(now)
        .bind(service_id)
        .execute(&mut *tx)
        .await?;

        if storage::unfinished_services_for_quote(&mut tx, &service.quote_id).await? == 0 {
            storage::set_quote_status(&mut tx, &service.quote_id, QuoteStatus::Completed).await?;
            info!("Quote {} completed", service.quote_id);
        }

        if storage::unfinished_services_for_vehicle(&mut tx, &service.vehicle_id).await? == 0 {
            transition_vehicles(
                &mut tx,
                std::slice::from_ref(&service.vehicle_id),
                &[VehicleStatus::ExecutionStarted],
                VehicleStatus::ExecutionFinished,
                &actor.id,
                Some("all services completed"),
            )
            .await?;
        }

        let service = storage::load_service(&mut tx, service_id).await?;
        tx.commit().await?;

        info!("Service {} completed", service_id);
        Ok(service)
    }

    pub async fn get_quote(&self, actor: &Actor, quote_id: &str) -> Result<QuoteDetail, StorageError> {
        let detail = self.quotes.get_detail(quote_id).await?;
        self.ensure_visible(actor, &detail.quote).await?;
        Ok(detail)
    }

    pub async fn list_quotes(
        &self,
        actor: &Actor,
        filter: &QuoteFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Quote>, i64), StorageError> {
        let scope = VehicleScope::for_actor(actor);
        self.quotes
            .list_quotes_paginated(&scope, filter, limit, offset)
            .await
    }

    async fn ensure_visible(&self, actor: &Actor, quote: &Quote) -> Result<(), StorageError> {
        match actor.role {
            UserRole::Partner => ensure_partner(actor, quote),
            _ => ensure_client_access(&self.pool, actor, &quote.client_id).await,
        }
    }
}

fn ensure_partner(actor: &Actor, quote: &Quote) -> Result<(), StorageError> {
    if actor.role == UserRole::Partner && quote.partner_id == actor.id {
        Ok(())
    } else {
        Err(StorageError::Forbidden(format!(
            "Quote {} belongs to another partner",
            quote.id
        )))
    }
}

fn ensure_status(quote: &Quote, expected: QuoteStatus) -> Result<(), StorageError> {
    if quote.status == expected {
        Ok(())
    } else {
        Err(StorageError::InvalidState(format!(
            "Quote {} is {}, expected {}",
            quote.id, quote.status, expected
        )))
    }
}

fn ensure_service_owner(actor: &Actor, service: &Service) -> Result<(), StorageError> {
    if actor.is_admin() || service.partner_id == actor.id {
        Ok(())
    } else {
        Err(StorageError::Forbidden(format!(
            "Service {} belongs to another partner",
            service.id
        )))
    }
}

fn ensure_service_status(service: &Service, expected: ServiceStatus) -> Result<(), StorageError> {
    if service.status == expected {
        Ok(())
    } else {
        Err(StorageError::InvalidState(format!(
            "Service {} is {}, expected {}",
            service.id, service.status, expected
        )))
    }
}

/// Reject the listed items and return how many items remain in play
async fn reject_items(
    conn: &mut SqliteConnection,
    quote_id: &str,
    item_ids: &[String],
    reason: Option<&str>,
) -> Result<usize, StorageError> {
    if item_ids.is_empty() {
        return Err(StorageError::Validation(
            "Select at least one item to reject".to_string(),
        ));
    }

    let unknown = storage::unknown_items(conn, quote_id, item_ids).await?;
    if !unknown.is_empty() {
        return Err(StorageError::Validation(format!(
            "Items do not belong to quote {}: {}",
            quote_id,
            unknown.join(", ")
        )));
    }

    storage::set_item_status(
        conn,
        quote_id,
        Some(item_ids),
        QuoteItemStatus::Rejected,
        reason,
    )
    .await?;
    storage::refresh_total(conn, quote_id).await?;

    let remaining = storage::load_items(conn, quote_id)
        .await?
        .iter()
        .filter(|item| item.status != QuoteItemStatus::Rejected)
        .count();

    debug!(
        "Rejected {} items on quote {}, {} remaining",
        item_ids.len(),
        quote_id,
        remaining
    );
    Ok(remaining)
}

async fn reject_quote(
    conn: &mut SqliteConnection,
    quote_id: &str,
    reason: Option<&str>,
) -> Result<(), StorageError> {
    storage::set_item_status(conn, quote_id, None, QuoteItemStatus::Rejected, reason).await?;

    sqlx::query("UPDATE quotes SET status = ?, rejection_reason = ?, updated_at = ? WHERE id = ?")
        .bind(QuoteStatus::Rejected)
        .bind(reason)
        .bind(Utc::now())
        .bind(quote_id)
        .execute(&mut *conn)
        .await?;

    storage::refresh_total(conn, quote_id).await?;
    Ok(())
}

/// Approve remaining items, then create services and release the vehicle for execution
async fn approve_quote(
    conn: &mut SqliteConnection,
    quote: &Quote,
    actor_id: &str,
) -> Result<(), StorageError> {
    storage::approve_pending_items(conn, &quote.id).await?;

    let now = Utc::now();
    sqlx::query("UPDATE quotes SET status = ?, approved_at = ?, updated_at = ? WHERE id = ?")
        .bind(QuoteStatus::Approved)
        .bind(now)
        .bind(now)
        .bind(&quote.id)
        .execute(&mut *conn)
        .await?;

    storage::refresh_total(conn, &quote.id).await?;
    storage::sync_services(conn, quote).await?;

    transition_vehicles(
        conn,
        std::slice::from_ref(&quote.vehicle_id),
        &[VehicleStatus::AnalysisFinished],
        VehicleStatus::BudgetApproved,
        actor_id,
        Some("budget approved"),
    )
    .await?;

    Ok(())
}
