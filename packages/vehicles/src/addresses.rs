// ABOUTME: Client address storage using SQLite
// ABOUTME: Pickup addresses referenced by collections and vehicles

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{Address, AddressCreateInput};
use autohub_core::{generate_id, Actor, UserRole};
use autohub_security::ensure_client_access;
use autohub_storage::StorageError;

pub struct AddressStorage {
    pool: SqlitePool,
}

impl AddressStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an address for the acting client; the first one becomes the main address
    pub async fn create_address(
        &self,
        actor: &Actor,
        input: AddressCreateInput,
    ) -> Result<Address, StorageError> {
        actor.require_role(&[UserRole::Client])?;

        for (field, value) in [
            ("street", &input.street),
            ("number", &input.number),
            ("city", &input.city),
            ("state", &input.state),
            ("zip_code", &input.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(StorageError::Validation(format!("{} cannot be empty", field)));
            }
        }

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE client_id = ?")
            .bind(&actor.id)
            .fetch_one(&self.pool)
            .await?;

        let address_id = generate_id("addr");
        debug!("Creating address: {} for client: {}", address_id, actor.id);

        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, client_id, street, number, complement, neighborhood,
                city, state, zip_code, is_collect_point, is_main, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&address_id)
        .bind(&actor.id)
        .bind(input.street.trim())
        .bind(input.number.trim())
        .bind(&input.complement)
        .bind(&input.neighborhood)
        .bind(input.city.trim())
        .bind(input.state.trim().to_uppercase())
        .bind(input.zip_code.trim())
        .bind(input.is_collect_point.unwrap_or(true))
        .bind(existing == 0)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_address(&address_id).await
    }

    pub async fn get_address(&self, address_id: &str) -> Result<Address, StorageError> {
        let row = sqlx::query("SELECT * FROM addresses WHERE id = ?")
            .bind(address_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::not_found_or("Address"))?;

        row_to_address(&row)
    }

    /// Addresses of a client, main address first
    pub async fn list_addresses(
        &self,
        actor: &Actor,
        client_id: &str,
    ) -> Result<Vec<Address>, StorageError> {
        ensure_client_access(&self.pool, actor, client_id).await?;

        let rows = sqlx::query(
            "SELECT * FROM addresses WHERE client_id = ? ORDER BY is_main DESC, created_at",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_address).collect()
    }
}

pub fn row_to_address(row: &sqlx::sqlite::SqliteRow) -> Result<Address, StorageError> {
    Ok(Address {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        street: row.try_get("street")?,
        number: row.try_get("number")?,
        complement: row.try_get("complement")?,
        neighborhood: row.try_get("neighborhood")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip_code: row.try_get("zip_code")?,
        is_collect_point: row.try_get("is_collect_point")?,
        is_main: row.try_get("is_main")?,
        created_at: row.try_get("created_at")?,
    })
}
