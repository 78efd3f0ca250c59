// ABOUTME: Shared application state for request handlers
// ABOUTME: Holds the SQLite pool and one instance of every domain service

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use autohub_checklists::ChecklistStorage;
use autohub_collections::CollectionOrchestrator;
use autohub_quotes::BudgetWorkflow;
use autohub_security::UserStorage;
use autohub_storage::{init_database, StorageConfig, StorageError};
use autohub_vehicles::{AddressStorage, VehicleStorage};

#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub user_storage: Arc<UserStorage>,
    pub address_storage: Arc<AddressStorage>,
    pub vehicle_storage: Arc<VehicleStorage>,
    pub collections: Arc<CollectionOrchestrator>,
    pub budgets: Arc<BudgetWorkflow>,
    pub checklist_storage: Arc<ChecklistStorage>,
}

impl DbState {
    /// Create state from an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            address_storage: Arc::new(AddressStorage::new(pool.clone())),
            vehicle_storage: Arc::new(VehicleStorage::new(pool.clone())),
            collections: Arc::new(CollectionOrchestrator::new(pool.clone())),
            budgets: Arc::new(BudgetWorkflow::new(pool.clone())),
            checklist_storage: Arc::new(ChecklistStorage::new(pool.clone())),
            pool,
        }
    }

    /// Open the database at the configured path and run migrations
    pub async fn init(config: &StorageConfig) -> Result<Self, StorageError> {
        let pool = init_database(config).await?;
        info!("Database ready at {}", config.path.display());
        Ok(Self::new(pool))
    }
}
