// ABOUTME: Shared identity types for AutoHub
// ABOUTME: User roles and the acting user passed into every workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Partner,
    Specialist,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Partner => "partner",
            UserRole::Specialist => "specialist",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(UserRole::Client),
            "partner" => Ok(UserRole::Partner),
            "specialist" => Ok(UserRole::Specialist),
            "admin" => Ok(UserRole::Admin),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

/// The user performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails unless the actor has one of the given roles
    pub fn require_role(&self, roles: &[UserRole]) -> Result<(), ValidationError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ValidationError::RoleNotAllowed {
                role: self.role,
                allowed: roles
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
    }
}
