// ABOUTME: User management module
// ABOUTME: Provides types and storage for users and specialist assignments

pub mod storage;
pub mod types;


pub use types::*;
