// ABOUTME: Quote, quote item and service type definitions
// ABOUTME: Status enums, review decisions and total computation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use autohub_core::{checked_sum, round_money, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    PendingAdminApproval,
    PendingClientApproval,
    Approved,
    Rejected,
    Completed,
}

impl QuoteStatus {
    /// A partner holds at most one open quote per vehicle
    pub fn is_open(&self) -> bool {
        !matches!(self, QuoteStatus::Rejected | QuoteStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::PendingAdminApproval => "pending_admin_approval",
            QuoteStatus::PendingClientApproval => "pending_client_approval",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuoteItemStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceStatus::Pending => "pending",
            ServiceStatus::InProgress => "in_progress",
            ServiceStatus::Completed => "completed",
            ServiceStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub vehicle_id: String,
    pub client_id: String,
    pub partner_id: String,
    pub category: String,
    pub status: QuoteStatus,
    pub total_value: Decimal,
    pub estimated_days: Option<i64>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    pub id: String,
    pub quote_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub status: QuoteItemStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub quote_id: String,
    pub quote_item_id: String,
    pub vehicle_id: String,
    pub partner_id: String,
    pub description: String,
    pub status: ServiceStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItemInput {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteCreateInput {
    pub vehicle_id: String,
    pub category: String,
    pub estimated_days: Option<i64>,
    #[serde(default)]
    pub items: Vec<QuoteItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
    pub services: Vec<Service>,
}

/// Admin review outcome for a submitted quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AdminDecision {
    Approve,
    Reject {
        reason: String,
    },
    RequestChanges {
        notes: String,
    },
    Partial {
        rejected_item_ids: Vec<String>,
        reason: Option<String>,
    },
}

/// Client review outcome for a quote the admin approved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ClientDecision {
    Approve,
    Reject {
        reason: Option<String>,
    },
    Partial {
        rejected_item_ids: Vec<String>,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub partner_id: Option<String>,
    pub client_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<QuoteStatus>,
}

/// Sum of line totals over items that are not rejected
pub fn recompute_total(items: &[QuoteItem]) -> Result<Decimal, ValidationError> {
    let total = checked_sum(
        items
            .iter()
            .filter(|item| item.status != QuoteItemStatus::Rejected)
            .map(|item| item.total_price),
    )?;
    Ok(round_money(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(total: Decimal, status: QuoteItemStatus) -> QuoteItem {
        QuoteItem {
            id: "qitem-1".to_string(),
            quote_id: "quote-1".to_string(),
            description: "Troca de óleo".to_string(),
            quantity: 1,
            unit_price: total,
            total_price: total,
            status,
            rejection_reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_recompute_total_skips_rejected() {
        let items = vec![
            item(dec!(120.00), QuoteItemStatus::Pending),
            item(dec!(80.55), QuoteItemStatus::Approved),
            item(dec!(500.00), QuoteItemStatus::Rejected),
        ];
        assert_eq!(recompute_total(&items), Ok(dec!(200.55)));
        assert_eq!(recompute_total(&[]), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_recompute_total_overflow_is_rejected() {
        let items = vec![
            item(Decimal::MAX, QuoteItemStatus::Pending),
            item(dec!(10), QuoteItemStatus::Approved),
        ];
        assert!(matches!(
            recompute_total(&items),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_open_statuses() {
        assert!(QuoteStatus::Draft.is_open());
        assert!(QuoteStatus::Approved.is_open());
        assert!(!QuoteStatus::Rejected.is_open());
        assert!(!QuoteStatus::Completed.is_open());
    }

    #[test]
    fn test_decision_wire_format() {
        let decision: AdminDecision = serde_json::from_str(
            r#"{"decision": "partial", "rejected_item_ids": ["qitem-2"], "reason": "fora do escopo"}"#,
        )
        .unwrap();
        assert!(matches!(
            decision,
            AdminDecision::Partial { ref rejected_item_ids, .. } if rejected_item_ids.len() == 1 && rejected_item_ids[0] == "qitem-2"
        ));

        let decision: ClientDecision = serde_json::from_str(r#"{"decision": "approve"}"#).unwrap();
        assert!(matches!(decision, ClientDecision::Approve));
    }
}
