// ABOUTME: Collection storage layer using SQLite
// ABOUTME: Row-level reads and writes on vehicle_collections and vehicle links

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::types::{
    CollectionDetail, CollectionFilter, CollectionStatus, CollectionSummary, VehicleCollection,
};
use autohub_core::{generate_id, parse_money};
use autohub_storage::{placeholders, StorageError};
use autohub_vehicles::{row_to_vehicle, CollectionMethod, Vehicle};

const SUMMARY_SELECT: &str = r#"
    SELECT c.*,
        (SELECT COUNT(*) FROM vehicles v WHERE v.collection_id = c.id) AS vehicle_count
    FROM vehicle_collections c
"#;

pub struct CollectionStorage {
    pool: SqlitePool,
}

impl CollectionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_summary(&self, collection_id: &str) -> Result<CollectionSummary, StorageError> {
        debug!("Fetching collection: {}", collection_id);

        let query = format!("{} WHERE c.id = ?", SUMMARY_SELECT);
        let row = sqlx::query(&query)
            .bind(collection_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::not_found_or("Collection"))?;

        row_to_summary(&row)
    }

    pub async fn get_detail(&self, collection_id: &str) -> Result<CollectionDetail, StorageError> {
        let summary = self.get_summary(collection_id).await?;

        let rows = sqlx::query("SELECT * FROM vehicles WHERE collection_id = ? ORDER BY plate")
            .bind(collection_id)
            .fetch_all(&self.pool)
            .await?;

        let vehicles = rows
            .iter()
            .map(row_to_vehicle)
            .collect::<Result<Vec<Vehicle>, _>>()?;

        Ok(CollectionDetail { summary, vehicles })
    }

    /// List collections, optionally restricted to a set of clients
    pub async fn list_summaries(
        &self,
        client_ids: Option<&[String]>,
        filter: &CollectionFilter,
    ) -> Result<Vec<CollectionSummary>, StorageError> {
        debug!("Fetching collections (filter: {:?})", filter);

        let mut builder = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
        builder.push(" WHERE 1 = 1");

        if let Some(ids) = client_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            builder.push(" AND c.client_id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(")");
        }
        if let Some(client_id) = &filter.client_id {
            builder.push(" AND c.client_id = ");
            builder.push_bind(client_id.clone());
        }
        if let Some(status) = filter.status {
            builder.push(" AND c.status = ");
            builder.push_bind(status);
        }
        builder.push(" ORDER BY c.collection_date, c.created_at");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_summary).collect()
    }
}

pub(crate) async fn get_collection(
    conn: &mut SqliteConnection,
    collection_id: &str,
) -> Result<VehicleCollection, StorageError> {
    let row = sqlx::query("SELECT * FROM vehicle_collections WHERE id = ?")
        .bind(collection_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::not_found_or("Collection"))?;

    row_to_collection(&row)
}

/// Look up a collection by its natural key
pub(crate) async fn find_by_key(
    conn: &mut SqliteConnection,
    client_id: &str,
    address_id: &str,
    date: NaiveDate,
) -> Result<Option<VehicleCollection>, StorageError> {
    let row = sqlx::query(
        r#"
        SELECT * FROM vehicle_collections
        WHERE client_id = ? AND address_id = ? AND collection_date = ?
        "#,
    )
    .bind(client_id)
    .bind(address_id)
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(row_to_collection).transpose()
}

pub(crate) async fn insert_collection(
    conn: &mut SqliteConnection,
    client_id: &str,
    address_id: &str,
    address_label: &str,
    date: NaiveDate,
) -> Result<String, StorageError> {
    let collection_id = generate_id("col");
    let now = Utc::now();

    debug!(
        "Creating collection: {} (client: {}, address: {}, date: {})",
        collection_id, client_id, address_id, date
    );

    sqlx::query(
        r#"
        INSERT INTO vehicle_collections (
            id, client_id, address_id, collection_address, collection_date,
            collection_fee_per_vehicle, status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?)
        "#,
    )
    .bind(&collection_id)
    .bind(client_id)
    .bind(address_id)
    .bind(address_label)
    .bind(date)
    .bind(CollectionStatus::Requested)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(collection_id)
}

/// Set status and fee together; `None` clears the fee
pub(crate) async fn set_status_and_fee(
    conn: &mut SqliteConnection,
    collection_id: &str,
    status: CollectionStatus,
    fee: Option<Decimal>,
) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        UPDATE vehicle_collections
        SET status = ?, collection_fee_per_vehicle = ?, rejection_reason = NULL, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(fee.map(|f| f.to_string()))
    .bind(Utc::now())
    .bind(collection_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn set_status(
    conn: &mut SqliteConnection,
    collection_id: &str,
    status: CollectionStatus,
    reason: Option<&str>,
) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE vehicle_collections SET status = ?, rejection_reason = ?, updated_at = ? WHERE id = ?",
    )
    .bind(status)
    .bind(reason)
    .bind(Utc::now())
    .bind(collection_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn set_date(
    conn: &mut SqliteConnection,
    collection_id: &str,
    date: NaiveDate,
) -> Result<(), StorageError> {
    sqlx::query("UPDATE vehicle_collections SET collection_date = ?, updated_at = ? WHERE id = ?")
        .bind(date)
        .bind(Utc::now())
        .bind(collection_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Ids of the vehicles currently linked to a collection
pub(crate) async fn linked_vehicle_ids(
    conn: &mut SqliteConnection,
    collection_id: &str,
) -> Result<Vec<String>, StorageError> {
    let ids = sqlx::query_scalar("SELECT id FROM vehicles WHERE collection_id = ? ORDER BY plate")
        .bind(collection_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ids)
}

/// Point vehicles at a pickup (or clear it for bring-to-yard)
pub(crate) async fn link_vehicles(
    conn: &mut SqliteConnection,
    vehicle_ids: &[String],
    method: Option<CollectionMethod>,
    address_id: Option<&str>,
    date: Option<NaiveDate>,
    collection_id: Option<&str>,
) -> Result<(), StorageError> {
    if vehicle_ids.is_empty() {
        return Ok(());
    }

    let query = format!(
        r#"
        UPDATE vehicles
        SET collection_method = ?, pickup_address_id = ?, estimated_arrival_date = ?,
            collection_id = ?, updated_at = ?
        WHERE id IN ({})
        "#,
        placeholders(vehicle_ids.len())
    );

    let mut update = sqlx::query(&query)
        .bind(method)
        .bind(address_id)
        .bind(date)
        .bind(collection_id)
        .bind(Utc::now());
    for id in vehicle_ids {
        update = update.bind(id);
    }
    update.execute(&mut *conn).await?;

    Ok(())
}

/// Move vehicles to a new date and collection, keeping method and address
pub(crate) async fn reschedule_vehicles(
    conn: &mut SqliteConnection,
    vehicle_ids: &[String],
    date: NaiveDate,
    collection_id: &str,
) -> Result<(), StorageError> {
    if vehicle_ids.is_empty() {
        return Ok(());
    }

    let query = format!(
        "UPDATE vehicles SET estimated_arrival_date = ?, collection_id = ?, updated_at = ? WHERE id IN ({})",
        placeholders(vehicle_ids.len())
    );

    let mut update = sqlx::query(&query)
        .bind(date)
        .bind(collection_id)
        .bind(Utc::now());
    for id in vehicle_ids {
        update = update.bind(id);
    }
    update.execute(&mut *conn).await?;

    Ok(())
}

/// Delete open collections that no vehicle references any more
pub(crate) async fn delete_orphans(
    conn: &mut SqliteConnection,
    client_id: Option<&str>,
) -> Result<u64, StorageError> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        DELETE FROM vehicle_collections
        WHERE status IN (
        "#,
    );
    let mut separated = builder.separated(", ");
    for status in CollectionStatus::OPEN {
        separated.push_bind(status);
    }
    separated.push_unseparated(")");
    builder.push(
        " AND NOT EXISTS (SELECT 1 FROM vehicles v WHERE v.collection_id = vehicle_collections.id)",
    );
    if let Some(client_id) = client_id {
        builder.push(" AND client_id = ");
        builder.push_bind(client_id.to_string());
    }

    let result = builder.build().execute(&mut *conn).await?;
    if result.rows_affected() > 0 {
        debug!("Removed {} orphan collections", result.rows_affected());
    }

    Ok(result.rows_affected())
}

fn row_to_collection(row: &sqlx::sqlite::SqliteRow) -> Result<VehicleCollection, StorageError> {
    let fee: Option<String> = row.try_get("collection_fee_per_vehicle")?;

    Ok(VehicleCollection {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        address_id: row.try_get("address_id")?,
        collection_address: row.try_get("collection_address")?,
        collection_date: row.try_get("collection_date")?,
        collection_fee_per_vehicle: fee.as_deref().map(parse_money).transpose()?,
        status: row.try_get("status")?,
        rejection_reason: row.try_get("rejection_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> Result<CollectionSummary, StorageError> {
    let collection = row_to_collection(row)?;
    let vehicle_count: i64 = row.try_get("vehicle_count")?;
    Ok(CollectionSummary::new(collection, vehicle_count))
}
