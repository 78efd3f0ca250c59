// ABOUTME: Core types, ids, money and validation helpers for AutoHub
// ABOUTME: Foundational package shared by every domain package

pub mod constants;
pub mod money;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{Actor, UserRole};

// Re-export constants
pub use constants::{autohub_dir, database_file, DEFAULT_PORT};

// Re-export utilities
pub use money::{checked_sum, line_total, parse_money, round_money, MAX_AMOUNT};
pub use utils::generate_id;

// Re-export validation
pub use validation::{
    normalize_plate, validate_collection_fee, validate_plate, validate_quote_item,
    validate_vehicle_year, ValidationError,
};
