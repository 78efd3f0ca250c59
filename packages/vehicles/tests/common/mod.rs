// ABOUTME: Common test utilities for vehicle integration tests
// ABOUTME: Provides a migrated in-memory database and seeded users

use autohub_core::{Actor, UserRole};
use autohub_security::{UserCreateInput, UserStorage};
use autohub_vehicles::{VehicleCreateInput, VehicleStatus};
use sqlx::SqlitePool;

pub async fn create_test_db() -> SqlitePool {
    autohub_storage::memory_pool()
        .await
        .expect("Failed to create test database")
}

pub async fn create_actor(pool: &SqlitePool, email: &str, role: UserRole) -> Actor {
    let user = UserStorage::new(pool.clone())
        .create_user(UserCreateInput {
            email: email.to_string(),
            full_name: email.to_string(),
            role,
        })
        .await
        .unwrap();
    Actor::new(user.id, role)
}

pub fn vehicle_input(plate: &str) -> VehicleCreateInput {
    VehicleCreateInput {
        client_id: None,
        plate: plate.to_string(),
        brand: "Fiat".to_string(),
        model: "Uno".to_string(),
        year: 2018,
        color: Some("Branco".to_string()),
        fipe_value: None,
        current_odometer: Some(54_000),
        fuel_level: None,
    }
}

/// Force a vehicle into a status without going through a workflow
#[allow(dead_code)]
pub async fn force_status(pool: &SqlitePool, vehicle_id: &str, status: VehicleStatus) {
    sqlx::query("UPDATE vehicles SET status = ? WHERE id = ?")
        .bind(status)
        .bind(vehicle_id)
        .execute(pool)
        .await
        .unwrap();
}
