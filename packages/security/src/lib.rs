// ABOUTME: Users, role relationships and access control for AutoHub
// ABOUTME: Provides user storage, specialist links and ownership checks

pub mod access;
pub mod users;

// Re-export main types for convenience
pub use access::{ensure_admin, ensure_client_access};
pub use users::storage::UserStorage;
pub use users::{User, UserCreateInput};
