// ABOUTME: Collection scheduling for client vehicles
// ABOUTME: Upserts, links and reconciles vehicle_collections rows with vehicle statuses

pub mod orchestrator;
pub mod storage;
pub mod types;

pub use orchestrator::CollectionOrchestrator;
pub use storage::CollectionStorage;
pub use types::{
    CollectionDetail, CollectionFilter, CollectionStatus, CollectionSummary,
    DefineCollectionInput, DefineCollectionResult, VehicleCollection,
};
