// ABOUTME: Partner inspection checklists for vehicles in the yard
// ABOUTME: Draft, item upserts, evidences and submission with vehicle status updates

pub mod storage;
pub mod types;

pub use storage::ChecklistStorage;
pub use types::{
    count_anomalies, Checklist, ChecklistDetail, ChecklistEvidence, ChecklistItem,
    ChecklistItemInput, ChecklistItemStatus, ChecklistSaveInput, ChecklistStatus,
};
