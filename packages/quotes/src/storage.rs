// ABOUTME: Quote storage layer using SQLite
// ABOUTME: Row mapping, item and service writes, total recomputation and scoped listing

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::types::{
    recompute_total, Quote, QuoteDetail, QuoteFilter, QuoteItem, QuoteItemInput, QuoteItemStatus,
    QuoteStatus, Service, ServiceStatus,
};
use autohub_core::{generate_id, line_total, parse_money, validate_quote_item};
use autohub_storage::{placeholders, StorageError};
use autohub_vehicles::VehicleScope;
use rust_decimal::Decimal;

pub struct QuoteStorage {
    pool: SqlitePool,
}

impl QuoteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_detail(&self, quote_id: &str) -> Result<QuoteDetail, StorageError> {
        let mut conn = self.pool.acquire().await?;
        load_detail(&mut conn, quote_id).await
    }

    /// List quotes visible in `scope` that match `filter`, newest first
    pub async fn list_quotes_paginated(
        &self,
        scope: &VehicleScope,
        filter: &QuoteFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Quote>, i64), StorageError> {
        debug!(
            "Fetching quotes (scope: {:?}, filter: {:?}, limit: {:?}, offset: {:?})",
            scope, filter, limit, offset
        );

        let mut count_builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM quotes q WHERE ");
        push_scope(&mut count_builder, scope);
        push_filter(&mut count_builder, filter);

        let count: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT q.* FROM quotes q WHERE ");
        push_scope(&mut builder, scope);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY q.created_at DESC");

        if let Some(lim) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(lim);
        }
        if let Some(off) = offset {
            builder.push(" OFFSET ");
            builder.push_bind(off);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        let quotes = rows.iter().map(row_to_quote).collect::<Result<Vec<_>, _>>()?;

        Ok((quotes, count))
    }
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: &VehicleScope) {
    match scope {
        VehicleScope::All => {
            builder.push("1 = 1");
        }
        VehicleScope::Client(client_id) => {
            builder.push("q.client_id = ");
            builder.push_bind(client_id.clone());
        }
        VehicleScope::Specialist(specialist_id) => {
            builder.push(
                "q.client_id IN (SELECT client_id FROM client_specialists WHERE specialist_id = ",
            );
            builder.push_bind(specialist_id.clone());
            builder.push(")");
        }
        VehicleScope::Partner(partner_id) => {
            builder.push("q.partner_id = ");
            builder.push_bind(partner_id.clone());
        }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &QuoteFilter) {
    if let Some(partner_id) = &filter.partner_id {
        builder.push(" AND q.partner_id = ");
        builder.push_bind(partner_id.clone());
    }
    if let Some(client_id) = &filter.client_id {
        builder.push(" AND q.client_id = ");
        builder.push_bind(client_id.clone());
    }
    if let Some(vehicle_id) = &filter.vehicle_id {
        builder.push(" AND q.vehicle_id = ");
        builder.push_bind(vehicle_id.clone());
    }
    if let Some(status) = filter.status {
        builder.push(" AND q.status = ");
        builder.push_bind(status);
    }
}

pub(crate) async fn load_quote(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<Quote, StorageError> {
    let row = sqlx::query("SELECT * FROM quotes WHERE id = ?")
        .bind(quote_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::not_found_or("Quote"))?;

    row_to_quote(&row)
}

pub(crate) async fn load_items(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<Vec<QuoteItem>, StorageError> {
    let rows = sqlx::query("SELECT * FROM quote_items WHERE quote_id = ? ORDER BY created_at, rowid")
        .bind(quote_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(row_to_item).collect()
}

pub(crate) async fn load_services(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<Vec<Service>, StorageError> {
    let rows = sqlx::query("SELECT * FROM services WHERE quote_id = ? ORDER BY created_at, rowid")
        .bind(quote_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(row_to_service).collect()
}

pub(crate) async fn load_service(
    conn: &mut SqliteConnection,
    service_id: &str,
) -> Result<Service, StorageError> {
    let row = sqlx::query("SELECT * FROM services WHERE id = ?")
        .bind(service_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::not_found_or("Service"))?;

    row_to_service(&row)
}

pub(crate) async fn load_detail(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<QuoteDetail, StorageError> {
    let quote = load_quote(conn, quote_id).await?;
    let items = load_items(conn, quote_id).await?;
    let services = load_services(conn, quote_id).await?;

    Ok(QuoteDetail {
        quote,
        items,
        services,
    })
}

pub(crate) async fn insert_item(
    conn: &mut SqliteConnection,
    quote_id: &str,
    input: &QuoteItemInput,
) -> Result<String, StorageError> {
    validate_quote_item(&input.description, input.quantity, input.unit_price)?;

    let item_id = generate_id("qitem");
    let total = line_total(input.quantity, input.unit_price)?;

    sqlx::query(
        r#"
        INSERT INTO quote_items (
            id, quote_id, description, quantity, unit_price, total_price, status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item_id)
    .bind(quote_id)
    .bind(input.description.trim())
    .bind(input.quantity)
    .bind(input.unit_price.to_string())
    .bind(total.to_string())
    .bind(QuoteItemStatus::Pending)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(item_id)
}

/// Recompute and store the quote total from its non-rejected items
pub(crate) async fn refresh_total(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<Decimal, StorageError> {
    let items = load_items(conn, quote_id).await?;
    let total = recompute_total(&items)?;

    sqlx::query("UPDATE quotes SET total_value = ?, updated_at = ? WHERE id = ?")
        .bind(total.to_string())
        .bind(Utc::now())
        .bind(quote_id)
        .execute(&mut *conn)
        .await?;

    debug!("Quote {} total is now {}", quote_id, total);
    Ok(total)
}

pub(crate) async fn set_quote_status(
    conn: &mut SqliteConnection,
    quote_id: &str,
    status: QuoteStatus,
) -> Result<(), StorageError> {
    sqlx::query("UPDATE quotes SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now())
        .bind(quote_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Set the status of the listed items; `None` targets every item of the quote
pub(crate) async fn set_item_status(
    conn: &mut SqliteConnection,
    quote_id: &str,
    item_ids: Option<&[String]>,
    status: QuoteItemStatus,
    reason: Option<&str>,
) -> Result<u64, StorageError> {
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE quote_items SET status = ");
    builder.push_bind(status);
    builder.push(", rejection_reason = ");
    builder.push_bind(reason.map(str::to_string));
    builder.push(" WHERE quote_id = ");
    builder.push_bind(quote_id.to_string());

    if let Some(ids) = item_ids {
        if ids.is_empty() {
            return Ok(0);
        }
        builder.push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");
    }

    let result = builder.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Approve every item still pending
pub(crate) async fn approve_pending_items(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<(), StorageError> {
    sqlx::query("UPDATE quote_items SET status = ? WHERE quote_id = ? AND status = ?")
        .bind(QuoteItemStatus::Approved)
        .bind(quote_id)
        .bind(QuoteItemStatus::Pending)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Create a pending service per approved item and cancel services of rejected items
pub(crate) async fn sync_services(
    conn: &mut SqliteConnection,
    quote: &Quote,
) -> Result<usize, StorageError> {
    let items = load_items(conn, &quote.id).await?;
    let now = Utc::now();
    let mut approved = 0;

    for item in &items {
        match item.status {
            QuoteItemStatus::Approved => {
                sqlx::query(
                    r#"
                    INSERT INTO services (
                        id, quote_id, quote_item_id, vehicle_id, partner_id, description,
                        status, created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(quote_item_id) DO UPDATE SET
                        description = excluded.description,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(generate_id("svc"))
                .bind(&quote.id)
                .bind(&item.id)
                .bind(&quote.vehicle_id)
                .bind(&quote.partner_id)
                .bind(&item.description)
                .bind(ServiceStatus::Pending)
                .bind(now)
                .bind(now)
                .execute(&mut *conn)
                .await?;
                approved += 1;
            }
            QuoteItemStatus::Rejected => {
                sqlx::query(
                    "UPDATE services SET status = ?, updated_at = ? WHERE quote_item_id = ? AND status != ?",
                )
                .bind(ServiceStatus::Cancelled)
                .bind(now)
                .bind(&item.id)
                .bind(ServiceStatus::Completed)
                .execute(&mut *conn)
                .await?;
            }
            QuoteItemStatus::Pending => {}
        }
    }

    debug!("Quote {} has {} services to execute", quote.id, approved);
    Ok(approved)
}

/// Count services of a vehicle that are neither completed nor cancelled
pub(crate) async fn unfinished_services_for_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: &str,
) -> Result<i64, StorageError> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM services WHERE vehicle_id = ? AND status NOT IN (?, ?)",
    )
    .bind(vehicle_id)
    .bind(ServiceStatus::Completed)
    .bind(ServiceStatus::Cancelled)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

pub(crate) async fn unfinished_services_for_quote(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> Result<i64, StorageError> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM services WHERE quote_id = ? AND status NOT IN (?, ?)",
    )
    .bind(quote_id)
    .bind(ServiceStatus::Completed)
    .bind(ServiceStatus::Cancelled)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// Ids among `item_ids` that do not belong to the quote
pub(crate) async fn unknown_items(
    conn: &mut SqliteConnection,
    quote_id: &str,
    item_ids: &[String],
) -> Result<Vec<String>, StorageError> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "SELECT id FROM quote_items WHERE quote_id = ? AND id IN ({})",
        placeholders(item_ids.len())
    );
    let mut select = sqlx::query_scalar::<_, String>(&query).bind(quote_id);
    for id in item_ids {
        select = select.bind(id);
    }
    let known = select.fetch_all(&mut *conn).await?;

    Ok(item_ids
        .iter()
        .filter(|id| !known.contains(id))
        .cloned()
        .collect())
}

pub(crate) fn row_to_quote(row: &sqlx::sqlite::SqliteRow) -> Result<Quote, StorageError> {
    let total: String = row.try_get("total_value")?;

    Ok(Quote {
        id: row.try_get("id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        client_id: row.try_get("client_id")?,
        partner_id: row.try_get("partner_id")?,
        category: row.try_get("category")?,
        status: row.try_get("status")?,
        total_value: parse_money(&total)?,
        estimated_days: row.try_get("estimated_days")?,
        admin_notes: row.try_get("admin_notes")?,
        rejection_reason: row.try_get("rejection_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        submitted_at: row.try_get("submitted_at")?,
        approved_at: row.try_get("approved_at")?,
    })
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<QuoteItem, StorageError> {
    let unit_price: String = row.try_get("unit_price")?;
    let total_price: String = row.try_get("total_price")?;

    Ok(QuoteItem {
        id: row.try_get("id")?,
        quote_id: row.try_get("quote_id")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        unit_price: parse_money(&unit_price)?,
        total_price: parse_money(&total_price)?,
        status: row.try_get("status")?,
        rejection_reason: row.try_get("rejection_reason")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> Result<Service, StorageError> {
    Ok(Service {
        id: row.try_get("id")?,
        quote_id: row.try_get("quote_id")?,
        quote_item_id: row.try_get("quote_item_id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        partner_id: row.try_get("partner_id")?,
        description: row.try_get("description")?,
        status: row.try_get("status")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
