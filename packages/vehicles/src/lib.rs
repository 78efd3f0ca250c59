// ABOUTME: Vehicle intake and lifecycle tracking
// ABOUTME: Provides vehicle and address storage plus the shared status transition helper

pub mod addresses;
pub mod status;
pub mod storage;
pub mod types;

// Re-export main types
pub use addresses::AddressStorage;
pub use status::{record_history, transition_vehicles};
pub use storage::{row_to_vehicle, VehicleStorage};
pub use types::{
    Address, AddressCreateInput, CollectionMethod, Vehicle, VehicleCreateInput, VehicleFilter,
    VehicleHistoryEntry, VehicleScope, VehicleStatus, VehicleUpdateInput,
};
