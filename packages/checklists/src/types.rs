// ABOUTME: Checklist type definitions
// ABOUTME: Checklist rows, items, evidences and save inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChecklistStatus {
    Draft,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChecklistItemStatus {
    Ok,
    /// Not ok, an anomaly
    Nok,
    /// Not applicable
    Na,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: String,
    pub vehicle_id: String,
    pub partner_id: String,
    pub status: ChecklistStatus,
    pub odometer: Option<i64>,
    pub fuel_level: Option<String>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub checklist_id: String,
    pub item_key: String,
    pub item_status: ChecklistItemStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistEvidence {
    pub id: String,
    pub checklist_id: String,
    pub item_key: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemInput {
    pub item_key: String,
    pub item_status: ChecklistItemStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistSaveInput {
    pub odometer: Option<i64>,
    pub fuel_level: Option<String>,
    pub observations: Option<String>,
    #[serde(default)]
    pub items: Vec<ChecklistItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistDetail {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
    pub evidences: Vec<ChecklistEvidence>,
    pub anomalies: usize,
}

pub fn count_anomalies(items: &[ChecklistItem]) -> usize {
    items
        .iter()
        .filter(|item| item.item_status == ChecklistItemStatus::Nok)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_anomalies() {
        let item = |key: &str, status| ChecklistItem {
            id: format!("chkitem-{}", key),
            checklist_id: "chk-1".to_string(),
            item_key: key.to_string(),
            item_status: status,
            notes: None,
        };
        let items = vec![
            item("brakes", ChecklistItemStatus::Nok),
            item("tires", ChecklistItemStatus::Ok),
            item("horn", ChecklistItemStatus::Na),
            item("lights", ChecklistItemStatus::Nok),
        ];
        assert_eq!(count_anomalies(&items), 2);
    }

    #[test]
    fn test_item_status_wire_format() {
        let input: ChecklistItemInput =
            serde_json::from_str(r#"{"item_key": "brakes", "item_status": "nok", "notes": null}"#)
                .unwrap();
        assert_eq!(input.item_status, ChecklistItemStatus::Nok);
    }
}
