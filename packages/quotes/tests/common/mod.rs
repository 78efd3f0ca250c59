// ABOUTME: Common test utilities for quote workflow tests
// ABOUTME: Seeds users and a vehicle that finished inspection

use autohub_core::{Actor, UserRole};
use autohub_quotes::{QuoteCreateInput, QuoteItemInput};
use autohub_security::{UserCreateInput, UserStorage};
use autohub_vehicles::{Vehicle, VehicleCreateInput, VehicleStatus, VehicleStorage};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

pub struct Fixture {
    pub pool: SqlitePool,
    pub client: Actor,
    pub partner: Actor,
    pub admin: Actor,
    pub vehicle: Vehicle,
}

pub async fn setup() -> Fixture {
    let pool = autohub_storage::memory_pool()
        .await
        .expect("Failed to create test database");
    let client = create_actor(&pool, "client@example.com", UserRole::Client).await;
    let partner = create_actor(&pool, "oficina@example.com", UserRole::Partner).await;
    let admin = create_actor(&pool, "admin@example.com", UserRole::Admin).await;

    let vehicle = VehicleStorage::new(pool.clone())
        .create_vehicle(
            &client,
            VehicleCreateInput {
                client_id: None,
                plate: "QWE4R56".to_string(),
                brand: "Chevrolet".to_string(),
                model: "Onix".to_string(),
                year: 2021,
                color: None,
                fipe_value: None,
                current_odometer: None,
                fuel_level: None,
            },
        )
        .await
        .unwrap();
    force_status(&pool, &vehicle.id, VehicleStatus::AnalysisFinished).await;

    Fixture {
        pool,
        client,
        partner,
        admin,
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

pub async fn vehicle_status(pool: &SqlitePool, vehicle_id: &str) -> VehicleStatus {
    VehicleStorage::new(pool.clone())
        .get_vehicle(vehicle_id)
        .await
        .unwrap()
        .status
}

pub fn item(description: &str, quantity: i64, unit_price: Decimal) -> QuoteItemInput {
    QuoteItemInput {
        description: description.to_string(),
        quantity,
        unit_price,
    }
}

pub fn quote_input(vehicle_id: &str, items: Vec<QuoteItemInput>) -> QuoteCreateInput {
    QuoteCreateInput {
        vehicle_id: vehicle_id.to_string(),
        category: "mecanica".to_string(),
        estimated_days: Some(3),
        items,
    }
}
