// ABOUTME: Checklist storage layer using SQLite
// ABOUTME: Inspection lifecycle per (vehicle, partner) with item and evidence upserts

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::types::{
    count_anomalies, Checklist, ChecklistDetail, ChecklistEvidence, ChecklistItem,
    ChecklistSaveInput, ChecklistStatus,
};
use autohub_core::{generate_id, Actor, UserRole};
use autohub_security::ensure_client_access;
use autohub_storage::StorageError;
use autohub_vehicles::{transition_vehicles, VehicleStatus};

pub struct ChecklistStorage {
    pool: SqlitePool,
}

impl ChecklistStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or resume) the acting partner's draft and move the vehicle into analysis
    pub async fn start_inspection(
        &self,
        actor: &Actor,
        vehicle_id: &str,
    ) -> Result<ChecklistDetail, StorageError> {
        actor.require_role(&[UserRole::Partner])?;

        let mut tx = self.pool.begin().await?;

        let status: VehicleStatus = sqlx::query_scalar("SELECT status FROM vehicles WHERE id = ?")
            .bind(vehicle_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::not_found_or("Vehicle"))?;

        if let Some(existing) = find_checklist(&mut tx, vehicle_id, &actor.id).await? {
            if existing.status == ChecklistStatus::Submitted {
                return Err(StorageError::InvalidState(format!(
                    "Checklist for vehicle {} was already submitted",
                    vehicle_id
                )));
            }
        }

        if !matches!(
            status,
            VehicleStatus::ArrivalConfirmed | VehicleStatus::InAnalysis
        ) {
            return Err(StorageError::InvalidState(format!(
                "Vehicle {} is {} and cannot be inspected",
                vehicle_id, status
            )));
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO mechanics_checklist (
                id, vehicle_id, partner_id, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(vehicle_id, partner_id) DO NOTHING
            "#,
        )
        .bind(generate_id("chk"))
        .bind(vehicle_id)
        .bind(&actor.id)
        .bind(ChecklistStatus::Draft)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        transition_vehicles(
            &mut tx,
            &[vehicle_id.to_string()],
            &[VehicleStatus::ArrivalConfirmed],
            VehicleStatus::InAnalysis,
            &actor.id,
            Some("inspection started"),
        )
        .await?;

        let checklist = load_draft(&mut tx, vehicle_id, &actor.id).await?;
        let detail = load_detail(&mut tx, checklist).await?;
        tx.commit().await?;

        info!(
            "Partner {} started inspection of vehicle {}",
            actor.id, vehicle_id
        );
        Ok(detail)
    }

    /// Update the draft header and upsert its items by key
    pub async fn save_checklist(
        &self,
        actor: &Actor,
        vehicle_id: &str,
        input: ChecklistSaveInput,
    ) -> Result<ChecklistDetail, StorageError> {
        actor.require_role(&[UserRole::Partner])?;

        if input.odometer.is_some_and(|km| km < 0) {
            return Err(StorageError::Validation(
                "Odometer cannot be negative".to_string(),
            ));
        }
        if input.items.iter().any(|item| item.item_key.trim().is_empty()) {
            return Err(StorageError::Validation(
                "Checklist item keys cannot be empty".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let checklist = load_draft(&mut tx, vehicle_id, &actor.id).await?;

        sqlx::query(
            r#"
            UPDATE mechanics_checklist
            SET odometer = COALESCE(?, odometer),
                fuel_level = COALESCE(?, fuel_level),
                observations = COALESCE(?, observations),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.odometer)
        .bind(&input.fuel_level)
        .bind(&input.observations)
        .bind(Utc::now())
        .bind(&checklist.id)
        .execute(&mut *tx)
        .await?;

        for item in &input.items {
            sqlx::query(
                r#"
                INSERT INTO mechanics_checklist_items (id, checklist_id, item_key, item_status, notes)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(checklist_id, item_key) DO UPDATE SET
                    item_status = excluded.item_status,
                    notes = excluded.notes
                "#,
            )
            .bind(generate_id("chkitem"))
            .bind(&checklist.id)
            .bind(item.item_key.trim())
            .bind(item.item_status)
            .bind(&item.notes)
            .execute(&mut *tx)
            .await?;
        }

        debug!(
            "Saved checklist {} ({} items)",
            checklist.id,
            input.items.len()
        );

        let checklist = load_draft(&mut tx, vehicle_id, &actor.id).await?;
        let detail = load_detail(&mut tx, checklist).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Attach a stored photo to an item; the same path twice is ignored
    pub async fn add_evidence(
        &self,
        actor: &Actor,
        vehicle_id: &str,
        item_key: &str,
        storage_path: &str,
    ) -> Result<ChecklistEvidence, StorageError> {
        actor.require_role(&[UserRole::Partner])?;

        let item_key = item_key.trim();
        let storage_path = storage_path.trim();
        if item_key.is_empty() || storage_path.is_empty() {
            return Err(StorageError::Validation(
                "Evidence needs an item key and a storage path".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let checklist = load_draft(&mut tx, vehicle_id, &actor.id).await?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO mechanics_checklist_evidences (
                id, checklist_id, item_key, storage_path, created_at
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_id("chkev"))
        .bind(&checklist.id)
        .bind(item_key)
        .bind(storage_path)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT * FROM mechanics_checklist_evidences
            WHERE checklist_id = ? AND item_key = ? AND storage_path = ?
            "#,
        )
        .bind(&checklist.id)
        .bind(item_key)
        .bind(storage_path)
        .fetch_one(&mut *tx)
        .await?;
        let evidence = row_to_evidence(&row)?;

        tx.commit().await?;

        Ok(evidence)
    }

    pub async fn remove_evidence(
        &self,
        actor: &Actor,
        vehicle_id: &str,
        evidence_id: &str,
    ) -> Result<(), StorageError> {
        actor.require_role(&[UserRole::Partner])?;

        let mut tx = self.pool.begin().await?;

        let checklist = load_draft(&mut tx, vehicle_id, &actor.id).await?;
        let result =
            sqlx::query("DELETE FROM mechanics_checklist_evidences WHERE id = ? AND checklist_id = ?")
                .bind(evidence_id)
                .bind(&checklist.id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Evidence".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lock the draft and finish the vehicle's analysis
    pub async fn submit_checklist(
        &self,
        actor: &Actor,
        vehicle_id: &str,
    ) -> Result<ChecklistDetail, StorageError> {
        actor.require_role(&[UserRole::Partner])?;

        let mut tx = self.pool.begin().await?;

        let checklist = load_draft(&mut tx, vehicle_id, &actor.id).await?;
        let items = load_items(&mut tx, &checklist.id).await?;
        if items.is_empty() {
            return Err(StorageError::Validation(
                "A checklist needs at least one item to be submitted".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query(
            "UPDATE mechanics_checklist SET status = ?, submitted_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(ChecklistStatus::Submitted)
        .bind(now)
        .bind(now)
        .bind(&checklist.id)
        .execute(&mut *tx)
        .await?;

        if let Some(odometer) = checklist.odometer {
            sqlx::query("UPDATE vehicles SET current_odometer = ?, updated_at = ? WHERE id = ?")
                .bind(odometer)
                .bind(now)
                .bind(vehicle_id)
                .execute(&mut *tx)
                .await?;
        }

        transition_vehicles(
            &mut tx,
            &[vehicle_id.to_string()],
            &[VehicleStatus::InAnalysis],
            VehicleStatus::AnalysisFinished,
            &actor.id,
            Some("inspection submitted"),
        )
        .await?;

        let checklist = find_checklist(&mut tx, vehicle_id, &actor.id)
            .await?
            .ok_or_else(|| StorageError::NotFound("Checklist".to_string()))?;
        let detail = load_detail(&mut tx, checklist).await?;
        tx.commit().await?;

        info!(
            "Partner {} submitted checklist for vehicle {} ({} anomalies)",
            actor.id, vehicle_id, detail.anomalies
        );
        Ok(detail)
    }

    pub async fn get_checklist(
        &self,
        actor: &Actor,
        vehicle_id: &str,
        partner_id: &str,
    ) -> Result<ChecklistDetail, StorageError> {
        self.ensure_vehicle_access(actor, vehicle_id, Some(partner_id))
            .await?;

        let mut conn = self.pool.acquire().await?;
        let checklist = find_checklist(&mut conn, vehicle_id, partner_id)
            .await?
            .ok_or_else(|| StorageError::NotFound("Checklist".to_string()))?;

        load_detail(&mut conn, checklist).await
    }

    /// Every checklist of a vehicle; partners only see their own
    pub async fn list_vehicle_checklists(
        &self,
        actor: &Actor,
        vehicle_id: &str,
    ) -> Result<Vec<ChecklistDetail>, StorageError> {
        self.ensure_vehicle_access(actor, vehicle_id, None).await?;

        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            "SELECT * FROM mechanics_checklist WHERE vehicle_id = ? ORDER BY created_at",
        )
        .bind(vehicle_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut details = Vec::with_capacity(rows.len());
        for row in &rows {
            let checklist = row_to_checklist(row)?;
            if actor.role == UserRole::Partner && checklist.partner_id != actor.id {
                continue;
            }
            details.push(load_detail(&mut conn, checklist).await?);
        }

        Ok(details)
    }

    async fn ensure_vehicle_access(
        &self,
        actor: &Actor,
        vehicle_id: &str,
        partner_id: Option<&str>,
    ) -> Result<(), StorageError> {
        if actor.role == UserRole::Partner {
            return match partner_id {
                Some(partner_id) if partner_id != actor.id => Err(StorageError::Forbidden(
                    "Partners can only read their own checklists".to_string(),
                )),
                _ => Ok(()),
            };
        }

        let client_id: String = sqlx::query_scalar("SELECT client_id FROM vehicles WHERE id = ?")
            .bind(vehicle_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::not_found_or("Vehicle"))?;

        ensure_client_access(&self.pool, actor, &client_id).await
    }
}

async fn find_checklist(
    conn: &mut SqliteConnection,
    vehicle_id: &str,
    partner_id: &str,
) -> Result<Option<Checklist>, StorageError> {
    let row =
        sqlx::query("SELECT * FROM mechanics_checklist WHERE vehicle_id = ? AND partner_id = ?")
            .bind(vehicle_id)
            .bind(partner_id)
            .fetch_optional(&mut *conn)
            .await?;

    row.as_ref().map(row_to_checklist).transpose()
}

/// The partner's checklist for the vehicle, which must still be a draft
async fn load_draft(
    conn: &mut SqliteConnection,
    vehicle_id: &str,
    partner_id: &str,
) -> Result<Checklist, StorageError> {
    let checklist = find_checklist(conn, vehicle_id, partner_id)
        .await?
        .ok_or_else(|| StorageError::NotFound("Checklist".to_string()))?;

    if checklist.status != ChecklistStatus::Draft {
        return Err(StorageError::InvalidState(format!(
            "Checklist {} was already submitted",
            checklist.id
        )));
    }

    Ok(checklist)
}

async fn load_items(
    conn: &mut SqliteConnection,
    checklist_id: &str,
) -> Result<Vec<ChecklistItem>, StorageError> {
    let rows = sqlx::query(
        "SELECT * FROM mechanics_checklist_items WHERE checklist_id = ? ORDER BY item_key",
    )
    .bind(checklist_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_item).collect()
}

async fn load_detail(
    conn: &mut SqliteConnection,
    checklist: Checklist,
) -> Result<ChecklistDetail, StorageError> {
    let items = load_items(conn, &checklist.id).await?;

    let rows = sqlx::query(
        "SELECT * FROM mechanics_checklist_evidences WHERE checklist_id = ? ORDER BY created_at, rowid",
    )
    .bind(&checklist.id)
    .fetch_all(&mut *conn)
    .await?;
    let evidences = rows
        .iter()
        .map(row_to_evidence)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChecklistDetail {
        anomalies: count_anomalies(&items),
        checklist,
        items,
        evidences,
    })
}

fn row_to_checklist(row: &sqlx::sqlite::SqliteRow) -> Result<Checklist, StorageError> {
    Ok(Checklist {
        id: row.try_get("id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        partner_id: row.try_get("partner_id")?,
        status: row.try_get("status")?,
        odometer: row.try_get("odometer")?,
        fuel_level: row.try_get("fuel_level")?,
        observations: row.try_get("observations")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        submitted_at: row.try_get("submitted_at")?,
    })
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<ChecklistItem, StorageError> {
    Ok(ChecklistItem {
        id: row.try_get("id")?,
        checklist_id: row.try_get("checklist_id")?,
        item_key: row.try_get("item_key")?,
        item_status: row.try_get("item_status")?,
        notes: row.try_get("notes")?,
    })
}

fn row_to_evidence(row: &sqlx::sqlite::SqliteRow) -> Result<ChecklistEvidence, StorageError> {
    Ok(ChecklistEvidence {
        id: row.try_get("id")?,
        checklist_id: row.try_get("checklist_id")?,
        item_key: row.try_get("item_key")?,
        storage_path: row.try_get("storage_path")?,
        created_at: row.try_get("created_at")?,
    })
}
