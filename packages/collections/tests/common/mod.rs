// ABOUTME: Common test utilities for collection integration tests
// ABOUTME: Seeds a client with an address and vehicles in an in-memory database

use autohub_core::{Actor, UserRole};
use autohub_security::{UserCreateInput, UserStorage};
use autohub_vehicles::{
    Address, AddressCreateInput, AddressStorage, Vehicle, VehicleCreateInput, VehicleStatus,
    VehicleStorage,
};
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct Fixture {
    pub pool: SqlitePool,
    pub client: Actor,
    pub admin: Actor,
    pub address: Address,
}

pub async fn setup() -> Fixture {
    let pool = autohub_storage::memory_pool()
        .await
        .expect("Failed to create test database");
    let client = create_actor(&pool, "client@example.com", UserRole::Client).await;
    let admin = create_actor(&pool, "admin@example.com", UserRole::Admin).await;
    let address = create_address(&pool, &client, "Rua das Flores").await;

    Fixture {
        pool,
        client,
        admin,
        address,
    }
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

pub async fn create_address(pool: &SqlitePool, client: &Actor, street: &str) -> Address {
    AddressStorage::new(pool.clone())
        .create_address(
            client,
            AddressCreateInput {
                street: street.to_string(),
                number: "100".to_string(),
                complement: None,
                neighborhood: Some("Centro".to_string()),
                city: "Curitiba".to_string(),
                state: "pr".to_string(),
                zip_code: "80000-000".to_string(),
                is_collect_point: None,
            },
        )
        .await
        .unwrap()
}

pub async fn create_vehicle(pool: &SqlitePool, client: &Actor, plate: &str) -> Vehicle {
    VehicleStorage::new(pool.clone())
        .create_vehicle(
            client,
            VehicleCreateInput {
                client_id: None,
                plate: plate.to_string(),
                brand: "Volkswagen".to_string(),
                model: "Gol".to_string(),
                year: 2020,
                color: None,
                fipe_value: None,
                current_odometer: None,
                fuel_level: None,
            },
        )
        .await
        .unwrap()
}

pub async fn vehicle(pool: &SqlitePool, vehicle_id: &str) -> Vehicle {
    VehicleStorage::new(pool.clone())
        .get_vehicle(vehicle_id)
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn force_status(pool: &SqlitePool, vehicle_id: &str, status: VehicleStatus) {
    sqlx::query("UPDATE vehicles SET status = ? WHERE id = ?")
        .bind(status)
        .bind(vehicle_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn collection_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM vehicle_collections")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
}
