// ABOUTME: Common test utilities for checklist integration tests
// ABOUTME: Seeds a client vehicle that has arrived at the yard and a partner

use autohub_core::{Actor, UserRole};
use autohub_security::{UserCreateInput, UserStorage};
use autohub_vehicles::{Vehicle, VehicleCreateInput, VehicleStatus, VehicleStorage};
use sqlx::SqlitePool;

pub struct Fixture {
    pub pool: SqlitePool,
    pub client: Actor,
    pub partner: Actor,
    pub vehicle: Vehicle,
}

pub async fn setup() -> Fixture {
    let pool = autohub_storage::memory_pool()
        .await
        .expect("Failed to create test database");
    let client = create_actor(&pool, "client@example.com", UserRole::Client).await;
    let partner = create_actor(&pool, "oficina@example.com", UserRole::Partner).await;

    let vehicle = VehicleStorage::new(pool.clone())
        .create_vehicle(
            &client,
            VehicleCreateInput {
                client_id: None,
                plate: "HGT2B34".to_string(),
                brand: "Honda".to_string(),
                model: "Fit".to_string(),
                year: 2016,
                color: None,
                fipe_value: None,
                current_odometer: Some(80_000),
                fuel_level: None,
            },
        )
        .await
        .unwrap();
    force_status(&pool, &vehicle.id, VehicleStatus::ArrivalConfirmed).await;

    Fixture {
        pool,
        client,
        partner,
        vehicle,
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

pub async fn force_status(pool: &SqlitePool, vehicle_id: &str, status: VehicleStatus) {
    sqlx::query("UPDATE vehicles SET status = ? WHERE id = ?")
        .bind(status)
        .bind(vehicle_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn vehicle(pool: &SqlitePool, vehicle_id: &str) -> Vehicle {
    VehicleStorage::new(pool.clone())
        .get_vehicle(vehicle_id)
        .await
        .unwrap()
}
