// ABOUTME: Vehicle status transitions shared by every workflow
// ABOUTME: Moves vehicles between statuses and records their history

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use super::types::VehicleStatus;
use autohub_core::generate_id;
use autohub_storage::{placeholders, StorageError};

/// Append a row to a vehicle's status history
pub async fn record_history(
    conn: &mut SqliteConnection,
    vehicle_id: &str,
    status: VehicleStatus,
    actor_id: Option<&str>,
    note: Option<&str>,
) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        INSERT INTO vehicle_history (id, vehicle_id, status, note, actor_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(generate_id("vhist"))
    .bind(vehicle_id)
    .bind(status)
    .bind(note)
    .bind(actor_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Move every vehicle in `ids` whose current status is in `allowed_from` to `to`.
///
/// Vehicles in any other status are left untouched. Returns the ids that moved,
/// in the order they were given.
pub async fn transition_vehicles(
    conn: &mut SqliteConnection,
    ids: &[String],
    allowed_from: &[VehicleStatus],
    to: VehicleStatus,
    actor_id: &str,
    note: Option<&str>,
) -> Result<Vec<String>, StorageError> {
    if ids.is_empty() || allowed_from.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "SELECT id FROM vehicles WHERE id IN ({}) AND status IN ({})",
        placeholders(ids.len()),
        placeholders(allowed_from.len())
    );

    let mut select = sqlx::query_scalar::<_, String>(&query);
    for id in ids {
        select = select.bind(id);
    }
    for status in allowed_from {
        select = select.bind(*status);
    }
    let eligible = select.fetch_all(&mut *conn).await?;

    let mut moved: Vec<String> = Vec::with_capacity(eligible.len());
    for id in ids {
        if eligible.contains(id) && !moved.contains(id) {
            moved.push(id.clone());
        }
    }

    let now = Utc::now();
    for vehicle_id in &moved {
        sqlx::query("UPDATE vehicles SET status = ?, updated_at = ? WHERE id = ?")
            .bind(to)
            .bind(now)
            .bind(vehicle_id)
            .execute(&mut *conn)
            .await?;

        record_history(conn, vehicle_id, to, Some(actor_id), note).await?;
    }

    debug!(
        "Transitioned {}/{} vehicles to {}",
        moved.len(),
        ids.len(),
        to
    );

    Ok(moved)
}
