// ABOUTME: Vehicle storage layer using SQLite
// ABOUTME: Handles vehicle CRUD, scoped listing, status counts and history

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::status::{record_history, transition_vehicles};
use super::types::{
    Vehicle, VehicleCreateInput, VehicleFilter, VehicleHistoryEntry, VehicleScope, VehicleStatus,
    VehicleUpdateInput,
};
use autohub_core::{
    generate_id, parse_money, validate_plate, validate_vehicle_year, Actor, UserRole,
};
use autohub_security::{ensure_admin, ensure_client_access};
use autohub_storage::{is_unique_violation, StorageError};

pub struct VehicleStorage {
    pool: SqlitePool,
}

impl VehicleStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a vehicle; clients register their own, admins register for any client
    pub async fn create_vehicle(
        &self,
        actor: &Actor,
        input: VehicleCreateInput,
    ) -> Result<Vehicle, StorageError> {
        actor.require_role(&[UserRole::Client, UserRole::Admin])?;

        let client_id = match actor.role {
            UserRole::Client => actor.id.clone(),
            _ => input.client_id.clone().ok_or_else(|| {
                StorageError::Validation("client_id is required".to_string())
            })?,
        };

        if actor.is_admin() {
            let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
                .bind(&client_id)
                .fetch_optional(&self.pool)
                .await?;
            match role.as_deref() {
                Some("client") => {}
                Some(_) => {
                    return Err(StorageError::Validation(format!(
                        "User {} is not a client",
                        client_id
                    )))
                }
                None => return Err(StorageError::NotFound("Client".to_string())),
            }
        }

        let plate = validate_plate(&input.plate)?;
        validate_vehicle_year(input.year)?;
        if input.brand.trim().is_empty() || input.model.trim().is_empty() {
            return Err(StorageError::Validation(
                "Brand and model are required".to_string(),
            ));
        }

        let vehicle_id = generate_id("veh");
        let now = Utc::now();
        let status = VehicleStatus::AwaitingCollectionDefinition;

        debug!("Creating vehicle: {} (plate: {})", vehicle_id, plate);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, client_id, plate, brand, model, year, color, fipe_value,
                current_odometer, fuel_level, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vehicle_id)
        .bind(&client_id)
        .bind(&plate)
        .bind(input.brand.trim())
        .bind(input.model.trim())
        .bind(input.year)
        .bind(&input.color)
        .bind(input.fipe_value.map(|v| v.to_string()))
        .bind(input.current_odometer)
        .bind(&input.fuel_level)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict(format!("Plate already registered: {}", plate))
            } else {
                StorageError::Sqlx(e)
            }
        })?;

        record_history(&mut tx, &vehicle_id, status, Some(&actor.id), Some("registered")).await?;

        tx.commit().await?;

        info!("Vehicle {} registered for client {}", vehicle_id, client_id);
        self.get_vehicle(&vehicle_id).await
    }

    pub async fn get_vehicle(&self, vehicle_id: &str) -> Result<Vehicle, StorageError> {
        debug!("Fetching vehicle: {}", vehicle_id);

        let row = sqlx::query("SELECT * FROM vehicles WHERE id = ?")
            .bind(vehicle_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::not_found_or("Vehicle"))?;

        row_to_vehicle(&row)
    }

    /// Fetch a vehicle after checking the actor may see it
    pub async fn get_vehicle_for(
        &self,
        actor: &Actor,
        vehicle_id: &str,
    ) -> Result<Vehicle, StorageError> {
        let vehicle = self.get_vehicle(vehicle_id).await?;
        self.ensure_visible(actor, &vehicle).await?;
        Ok(vehicle)
    }

    pub async fn ensure_visible(&self, actor: &Actor, vehicle: &Vehicle) -> Result<(), StorageError> {
        if actor.role != UserRole::Partner {
            return ensure_client_access(&self.pool, actor, &vehicle.client_id).await;
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM vehicles v WHERE v.id = ");
        builder.push_bind(vehicle.id.clone());
        builder.push(" AND ");
        push_scope(&mut builder, &VehicleScope::Partner(actor.id.clone()));

        let visible: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        if visible > 0 {
            Ok(())
        } else {
            Err(StorageError::Forbidden(format!(
                "partner {} has no work on vehicle {}",
                actor.id, vehicle.id
            )))
        }
    }

    /// List vehicles visible in `scope` that match `filter`
    pub async fn list_vehicles_paginated(
        &self,
        scope: &VehicleScope,
        filter: &VehicleFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Vehicle>, i64), StorageError> {
        debug!(
            "Fetching vehicles (scope: {:?}, filter: {:?}, limit: {:?}, offset: {:?})",
            scope, filter, limit, offset
        );

        let mut count_builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM vehicles v WHERE ");
        push_scope(&mut count_builder, scope);
        push_filter(&mut count_builder, filter);

        let count: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT v.* FROM vehicles v WHERE ");
        push_scope(&mut builder, scope);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY v.created_at DESC, v.plate");

        if let Some(lim) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(lim);
        }
        if let Some(off) = offset {
            builder.push(" OFFSET ");
            builder.push_bind(off);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;

        let vehicles = rows
            .iter()
            .map(row_to_vehicle)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((vehicles, count))
    }

    /// Update descriptive fields; status and collection fields are workflow-owned
    pub async fn update_vehicle(
        &self,
        actor: &Actor,
        vehicle_id: &str,
        input: VehicleUpdateInput,
    ) -> Result<Vehicle, StorageError> {
        debug!("Updating vehicle: {}", vehicle_id);

        actor.require_role(&[UserRole::Client, UserRole::Admin])?;
        let vehicle = self.get_vehicle_for(actor, vehicle_id).await?;

        if let Some(year) = input.year {
            validate_vehicle_year(year)?;
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE vehicles SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(brand) = input.brand {
            builder.push(", brand = ");
            builder.push_bind(brand);
        }
        if let Some(model) = input.model {
            builder.push(", model = ");
            builder.push_bind(model);
        }
        if let Some(year) = input.year {
            builder.push(", year = ");
            builder.push_bind(year);
        }
        if let Some(color) = input.color {
            builder.push(", color = ");
            builder.push_bind(color);
        }
        if let Some(fipe_value) = input.fipe_value {
            builder.push(", fipe_value = ");
            builder.push_bind(fipe_value.to_string());
        }
        if let Some(odometer) = input.current_odometer {
            builder.push(", current_odometer = ");
            builder.push_bind(odometer);
        }
        if let Some(fuel_level) = input.fuel_level {
            builder.push(", fuel_level = ");
            builder.push_bind(fuel_level);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(vehicle.id.clone());
        builder.build().execute(&self.pool).await?;

        self.get_vehicle(&vehicle.id).await
    }

    /// Delete a vehicle that has not entered any workflow yet
    pub async fn delete_vehicle(&self, actor: &Actor, vehicle_id: &str) -> Result<(), StorageError> {
        debug!("Deleting vehicle: {}", vehicle_id);

        actor.require_role(&[UserRole::Client, UserRole::Admin])?;
        let vehicle = self.get_vehicle_for(actor, vehicle_id).await?;

        if vehicle.status != VehicleStatus::AwaitingCollectionDefinition {
            return Err(StorageError::InvalidState(format!(
                "Vehicle {} cannot be deleted in status {}",
                vehicle.id, vehicle.status
            )));
        }

        sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(&vehicle.id)
            .execute(&self.pool)
            .await?;

        info!("Vehicle {} deleted by {}", vehicle.id, actor.id);
        Ok(())
    }

    /// Number of vehicles per status (every status is present, zero included)
    pub async fn status_counts(
        &self,
        scope: &VehicleScope,
    ) -> Result<BTreeMap<String, i64>, StorageError> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT v.status, COUNT(*) AS total FROM vehicles v WHERE ");
        push_scope(&mut builder, scope);
        builder.push(" GROUP BY v.status");

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut counts: BTreeMap<String, i64> = VehicleStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();

        for row in rows {
            let status: VehicleStatus = row.try_get("status")?;
            let total: i64 = row.try_get("total")?;
            counts.insert(status.as_str().to_string(), total);
        }

        Ok(counts)
    }

    /// Status history, oldest first
    pub async fn history(&self, vehicle_id: &str) -> Result<Vec<VehicleHistoryEntry>, StorageError> {
        debug!("Fetching history for vehicle: {}", vehicle_id);

        let rows = sqlx::query(
            "SELECT * FROM vehicle_history WHERE vehicle_id = ? ORDER BY created_at, rowid",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<VehicleHistoryEntry, StorageError> {
                Ok(VehicleHistoryEntry {
                    id: row.try_get("id")?,
                    vehicle_id: row.try_get("vehicle_id")?,
                    status: row.try_get("status")?,
                    note: row.try_get("note")?,
                    actor_id: row.try_get("actor_id")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    /// Hand the finished vehicle back to its owner
    pub async fn mark_delivered(&self, actor: &Actor, vehicle_id: &str) -> Result<Vehicle, StorageError> {
        ensure_admin(actor)?;
        let vehicle = self.get_vehicle(vehicle_id).await?;

        let mut tx = self.pool.begin().await?;
        let moved = transition_vehicles(
            &mut tx,
            std::slice::from_ref(&vehicle.id),
            &[VehicleStatus::ExecutionFinished],
            VehicleStatus::Delivered,
            &actor.id,
            Some("delivered to client"),
        )
        .await?;
        tx.commit().await?;

        if moved.is_empty() {
            return Err(StorageError::InvalidState(format!(
                "Vehicle {} is {} and cannot be delivered",
                vehicle.id, vehicle.status
            )));
        }

        info!("Vehicle {} delivered", vehicle.id);
        self.get_vehicle(&vehicle.id).await
    }
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: &VehicleScope) {
    match scope {
        VehicleScope::All => {
            builder.push("1 = 1");
        }
        VehicleScope::Client(client_id) => {
            builder.push("v.client_id = ");
            builder.push_bind(client_id.clone());
        }
        VehicleScope::Specialist(specialist_id) => {
            builder.push(
                "v.client_id IN (SELECT client_id FROM client_specialists WHERE specialist_id = ",
            );
            builder.push_bind(specialist_id.clone());
            builder.push(")");
        }
        VehicleScope::Partner(partner_id) => {
            // Only vehicles the partner has a checklist or quote on
            builder.push("(v.id IN (SELECT vehicle_id FROM mechanics_checklist WHERE partner_id = ");
            builder.push_bind(partner_id.clone());
            builder.push(") OR v.id IN (SELECT vehicle_id FROM quotes WHERE partner_id = ");
            builder.push_bind(partner_id.clone());
            builder.push("))");
        }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &VehicleFilter) {
    if let Some(client_id) = &filter.client_id {
        builder.push(" AND v.client_id = ");
        builder.push_bind(client_id.clone());
    }
    if let Some(status) = filter.status {
        builder.push(" AND v.status = ");
        builder.push_bind(status);
    }
    if let Some(plate) = filter.plate.as_deref().filter(|p| !p.trim().is_empty()) {
        builder.push(" AND v.plate LIKE ");
        builder.push_bind(format!("%{}%", autohub_core::normalize_plate(plate)));
    }
}

pub fn row_to_vehicle(row: &sqlx::sqlite::SqliteRow) -> Result<Vehicle, StorageError> {
    let fipe_value: Option<String> = row.try_get("fipe_value")?;

    Ok(Vehicle {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        plate: row.try_get("plate")?,
        brand: row.try_get("brand")?,
        model: row.try_get("model")?,
        year: row.try_get("year")?,
        color: row.try_get("color")?,
        fipe_value: fipe_value.as_deref().map(parse_money).transpose()?,
        current_odometer: row.try_get("current_odometer")?,
        fuel_level: row.try_get("fuel_level")?,
        status: row.try_get("status")?,
        collection_method: row.try_get("collection_method")?,
        pickup_address_id: row.try_get("pickup_address_id")?,
        estimated_arrival_date: row.try_get("estimated_arrival_date")?,
        collection_id: row.try_get("collection_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
