// ABOUTME: Collection type definitions
// ABOUTME: Collection rows, summaries and orchestrator inputs

use autohub_vehicles::{CollectionMethod, Vehicle};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    /// Client asked for a pickup, waiting for the admin fee
    Requested,
    /// Fee set, waiting for the client
    Proposed,
    Approved,
    Rejected,
    Completed,
}

impl CollectionStatus {
    /// Statuses in which vehicles and dates can still change
    pub const OPEN: [CollectionStatus; 2] = [CollectionStatus::Requested, CollectionStatus::Proposed];

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }

    /// Approved and completed rows are never merged into or relinked
    pub fn is_locked(&self) -> bool {
        matches!(self, CollectionStatus::Approved | CollectionStatus::Completed)
    }
}

impl std::fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CollectionStatus::Requested => "requested",
            CollectionStatus::Proposed => "proposed",
            CollectionStatus::Approved => "approved",
            CollectionStatus::Rejected => "rejected",
            CollectionStatus::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCollection {
    pub id: String,
    pub client_id: String,
    pub address_id: String,
    pub collection_address: String,
    pub collection_date: NaiveDate,
    pub collection_fee_per_vehicle: Option<Decimal>,
    pub status: CollectionStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    #[serde(flatten)]
    pub collection: VehicleCollection,
    pub vehicle_count: i64,
    pub total_fee: Option<Decimal>,
}

impl CollectionSummary {
    pub fn new(collection: VehicleCollection, vehicle_count: i64) -> Self {
        let total_fee = collection
            .collection_fee_per_vehicle
            .and_then(|fee| fee.checked_mul(Decimal::from(vehicle_count)));
        Self {
            collection,
            vehicle_count,
            total_fee,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub summary: CollectionSummary,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefineCollectionInput {
    pub vehicle_ids: Vec<String>,
    pub method: CollectionMethod,
    /// Required for `collect_point`
    pub address_id: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefineCollectionResult {
    /// Set for `collect_point`, empty when the client brings the vehicles
    pub collection_id: Option<String>,
    pub vehicle_ids: Vec<String>,
    pub orphans_removed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    pub client_id: Option<String>,
    pub status: Option<CollectionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn collection(fee: Option<Decimal>) -> VehicleCollection {
        VehicleCollection {
            id: "col-1".to_string(),
            client_id: "usr-1".to_string(),
            address_id: "addr-1".to_string(),
            collection_address: "Rua A, 1, Curitiba/PR".to_string(),
            collection_date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            collection_fee_per_vehicle: fee,
            status: CollectionStatus::Proposed,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_total_fee() {
        let summary = CollectionSummary::new(collection(Some(dec!(75.50))), 3);
        assert_eq!(summary.total_fee, Some(dec!(226.50)));

        let summary = CollectionSummary::new(collection(None), 3);
        assert_eq!(summary.total_fee, None);

        let summary = CollectionSummary::new(collection(Some(Decimal::MAX)), 3);
        assert_eq!(summary.total_fee, None);
    }

    #[test]
    fn test_status_groups() {
        assert!(CollectionStatus::Requested.is_open());
        assert!(!CollectionStatus::Rejected.is_open());
        assert!(CollectionStatus::Completed.is_locked());
        assert!(!CollectionStatus::Proposed.is_locked());
    }
}
