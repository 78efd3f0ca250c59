// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles user accounts and client/specialist assignments

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{User, UserCreateInput};
use autohub_core::{generate_id, UserRole};
use autohub_storage::{is_unique_violation, StorageError};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, input: UserCreateInput) -> Result<User, StorageError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(StorageError::Validation(format!(
                "Invalid email: {}",
                input.email
            )));
        }
        if input.full_name.trim().is_empty() {
            return Err(StorageError::Validation("Name cannot be empty".to_string()));
        }

        let user_id = generate_id("usr");
        debug!("Creating user: {} ({}, {})", user_id, email, input.role);

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(&email)
        .bind(input.full_name.trim())
        .bind(input.role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict(format!("Email already registered: {}", email))
            } else {
                StorageError::Sqlx(e)
            }
        })?;

        self.get_user(&user_id).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::not_found_or("User"))?;

        Self::row_to_user(&row)
    }

    /// List users, optionally filtered by role
    pub async fn list_users_paginated(
        &self,
        role: Option<UserRole>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<User>, i64), StorageError> {
        debug!(
            "Fetching users (role: {:?}, limit: {:?}, offset: {:?})",
            role, limit, offset
        );

        let (count_query, mut query) = match role {
            Some(_) => (
                "SELECT COUNT(*) FROM users WHERE role = ?",
                String::from("SELECT * FROM users WHERE role = ? ORDER BY full_name"),
            ),
            None => (
                "SELECT COUNT(*) FROM users",
                String::from("SELECT * FROM users ORDER BY full_name"),
            ),
        };

        let mut count = sqlx::query_scalar::<_, i64>(count_query);
        if let Some(role) = role {
            count = count.bind(role.as_str());
        }
        let count = count.fetch_one(&self.pool).await?;

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }
        if let Some(off) = offset {
            query.push_str(&format!(" OFFSET {}", off));
        }

        let mut rows = sqlx::query(&query);
        if let Some(role) = role {
            rows = rows.bind(role.as_str());
        }
        let rows = rows.fetch_all(&self.pool).await?;

        let users = rows
            .iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, count))
    }

    /// Assign a specialist to follow a client (idempotent)
    pub async fn link_specialist(
        &self,
        client_id: &str,
        specialist_id: &str,
    ) -> Result<(), StorageError> {
        debug!("Linking specialist {} to client {}", specialist_id, client_id);

        let client = self.get_user(client_id).await?;
        if client.role != UserRole::Client {
            return Err(StorageError::Validation(format!(
                "User {} is not a client",
                client_id
            )));
        }

        let specialist = self.get_user(specialist_id).await?;
        if specialist.role != UserRole::Specialist {
            return Err(StorageError::Validation(format!(
                "User {} is not a specialist",
                specialist_id
            )));
        }

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO client_specialists (client_id, specialist_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(specialist_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn unlink_specialist(
        &self,
        client_id: &str,
        specialist_id: &str,
    ) -> Result<(), StorageError> {
        debug!(
            "Unlinking specialist {} from client {}",
            specialist_id, client_id
        );

        let result =
            sqlx::query("DELETE FROM client_specialists WHERE client_id = ? AND specialist_id = ?")
                .bind(client_id)
                .bind(specialist_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("Specialist assignment".to_string()));
        }

        Ok(())
    }

    /// Clients followed by a specialist
    pub async fn list_specialist_clients(
        &self,
        specialist_id: &str,
    ) -> Result<Vec<User>, StorageError> {
        debug!("Fetching clients for specialist: {}", specialist_id);

        let rows = sqlx::query(
            r#"
            SELECT u.* FROM users u
            JOIN client_specialists cs ON cs.client_id = u.id
            WHERE cs.specialist_id = ?
            ORDER BY u.full_name
            "#,
        )
        .bind(specialist_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_user).collect()
    }

    pub async fn is_specialist_of(
        &self,
        specialist_id: &str,
        client_id: &str,
    ) -> Result<bool, StorageError> {
        crate::access::is_specialist_of(&self.pool, specialist_id, client_id).await
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
        let role: String = row.try_get("role")?;

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            role: role.parse()?,
            created_at: row.try_get("created_at")?,
        })
    }
}
