// ABOUTME: Vehicle and address type definitions
// ABOUTME: Status lifecycle, collection method and list filters

use autohub_core::{Actor, UserRole};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a vehicle from registration to delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    AwaitingCollectionDefinition,
    AwaitingCollectionApproval,
    AwaitingCollection,
    AwaitingArrival,
    ArrivalConfirmed,
    InAnalysis,
    AnalysisFinished,
    BudgetApproved,
    ExecutionStarted,
    ExecutionFinished,
    Delivered,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 11] = [
        VehicleStatus::AwaitingCollectionDefinition,
        VehicleStatus::AwaitingCollectionApproval,
        VehicleStatus::AwaitingCollection,
        VehicleStatus::AwaitingArrival,
        VehicleStatus::ArrivalConfirmed,
        VehicleStatus::InAnalysis,
        VehicleStatus::AnalysisFinished,
        VehicleStatus::BudgetApproved,
        VehicleStatus::ExecutionStarted,
        VehicleStatus::ExecutionFinished,
        VehicleStatus::Delivered,
    ];

    /// Statuses in which the collection can still be (re)defined
    pub const COLLECTION_PENDING: [VehicleStatus; 2] = [
        VehicleStatus::AwaitingCollectionDefinition,
        VehicleStatus::AwaitingCollectionApproval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::AwaitingCollectionDefinition => "awaiting_collection_definition",
            VehicleStatus::AwaitingCollectionApproval => "awaiting_collection_approval",
            VehicleStatus::AwaitingCollection => "awaiting_collection",
            VehicleStatus::AwaitingArrival => "awaiting_arrival",
            VehicleStatus::ArrivalConfirmed => "arrival_confirmed",
            VehicleStatus::InAnalysis => "in_analysis",
            VehicleStatus::AnalysisFinished => "analysis_finished",
            VehicleStatus::BudgetApproved => "budget_approved",
            VehicleStatus::ExecutionStarted => "execution_started",
            VehicleStatus::ExecutionFinished => "execution_finished",
            VehicleStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CollectionMethod {
    CollectPoint,
    BringToYard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub client_id: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub fipe_value: Option<Decimal>,
    pub current_odometer: Option<i64>,
    pub fuel_level: Option<String>,
    pub status: VehicleStatus,
    pub collection_method: Option<CollectionMethod>,
    pub pickup_address_id: Option<String>,
    pub estimated_arrival_date: Option<NaiveDate>,
    pub collection_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCreateInput {
    /// Required when an administrator registers a vehicle on behalf of a client
    pub client_id: Option<String>,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub fipe_value: Option<Decimal>,
    pub current_odometer: Option<i64>,
    pub fuel_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleUpdateInput {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub fipe_value: Option<Decimal>,
    pub current_odometer: Option<i64>,
    pub fuel_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleHistoryEntry {
    pub id: String,
    pub vehicle_id: String,
    pub status: VehicleStatus,
    pub note: Option<String>,
    pub actor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which vehicles an actor is allowed to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleScope {
    All,
    Client(String),
    Specialist(String),
    Partner(String),
}

impl VehicleScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            UserRole::Admin => VehicleScope::All,
            UserRole::Client => VehicleScope::Client(actor.id.clone()),
            UserRole::Specialist => VehicleScope::Specialist(actor.id.clone()),
            UserRole::Partner => VehicleScope::Partner(actor.id.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub client_id: Option<String>,
    pub status: Option<VehicleStatus>,
    /// Case-insensitive plate fragment
    pub plate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub client_id: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_collect_point: bool,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// Single-line label, e.g. "Rua A, 10 - Centro, Curitiba/PR"
    pub fn label(&self) -> String {
        let mut label = format!("{}, {}", self.street, self.number);
        if let Some(neighborhood) = self.neighborhood.as_deref().filter(|n| !n.is_empty()) {
            label.push_str(" - ");
            label.push_str(neighborhood);
        }
        label.push_str(&format!(", {}/{}", self.city, self.state));
        label
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressCreateInput {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_collect_point: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_match_serde() {
        for status in VehicleStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_address_label() {
        let address = Address {
            id: "addr-1".to_string(),
            client_id: "usr-1".to_string(),
            street: "Rua das Flores".to_string(),
            number: "120".to_string(),
            complement: None,
            neighborhood: Some("Centro".to_string()),
            city: "Curitiba".to_string(),
            state: "PR".to_string(),
            zip_code: "80000-000".to_string(),
            is_collect_point: true,
            is_main: true,
            created_at: Utc::now(),
        };
        assert_eq!(address.label(), "Rua das Flores, 120 - Centro, Curitiba/PR");
    }

    #[test]
    fn test_scope_for_actor() {
        let actor = Actor::new("usr-9", UserRole::Partner);
        assert_eq!(
            VehicleScope::for_actor(&actor),
            VehicleScope::Partner("usr-9".to_string())
        );
    }
}
