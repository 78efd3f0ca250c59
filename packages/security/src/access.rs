// ABOUTME: Ownership checks shared by the domain workflows
// ABOUTME: Decides whether an actor may act on a client's records

use sqlx::SqlitePool;

use autohub_core::{Actor, UserRole};
use autohub_storage::StorageError;

pub async fn is_specialist_of(
    pool: &SqlitePool,
    specialist_id: &str,
    client_id: &str,
) -> Result<bool, StorageError> {
    let linked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM client_specialists WHERE specialist_id = ? AND client_id = ?",
    )
    .bind(specialist_id)
    .bind(client_id)
    .fetch_one(pool)
    .await?;

    Ok(linked > 0)
}

/// Admins see everything, clients see themselves, specialists see linked clients.
/// Partners are scoped by their checklists and quotes in the domain packages.
pub async fn ensure_client_access(
    pool: &SqlitePool,
    actor: &Actor,
    client_id: &str,
) -> Result<(), StorageError> {
    let allowed = match actor.role {
        UserRole::Admin => true,
        UserRole::Client => actor.id == client_id,
        UserRole::Specialist => is_specialist_of(pool, &actor.id, client_id).await?,
        UserRole::Partner => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(StorageError::Forbidden(format!(
            "{} {} cannot access records of client {}",
            actor.role, actor.id, client_id
        )))
    }
}

pub fn ensure_admin(actor: &Actor) -> Result<(), StorageError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(StorageError::Forbidden(
            "Only administrators can perform this action".to_string(),
        ))
    }
}
