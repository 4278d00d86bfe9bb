//! Ledger entity model: drugs and their append-only transaction logs.
//!
//! Field names are camelCase on the wire (`stockLevels`, `createdAt`, ...)
//! so cached and remote documents share one schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cdstock_core::{DrugId, Entity, LogId};

use crate::stock::{StockLevels, StockStatus};

/// Dosage form of a drug (closed enumeration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presentation {
    Ampoule,
    Vial,
    Tablet,
    Capsule,
    Patch,
    #[serde(rename = "Pre-Filled Syringe")]
    PreFilledSyringe,
    Powder,
    Bag,
    Other,
}

impl Presentation {
    pub const ALL: [Presentation; 9] = [
        Presentation::Ampoule,
        Presentation::Vial,
        Presentation::Tablet,
        Presentation::Capsule,
        Presentation::Patch,
        Presentation::PreFilledSyringe,
        Presentation::Powder,
        Presentation::Bag,
        Presentation::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Presentation::Ampoule => "Ampoule",
            Presentation::Vial => "Vial",
            Presentation::Tablet => "Tablet",
            Presentation::Capsule => "Capsule",
            Presentation::Patch => "Patch",
            Presentation::PreFilledSyringe => "Pre-Filled Syringe",
            Presentation::Powder => "Powder",
            Presentation::Bag => "Bag",
            Presentation::Other => "Other",
        }
    }
}

impl core::fmt::Display for Presentation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    CheckIn,
    CheckOut,
    Ood,
    PharmacyReturn,
    Edit,
}

/// One append-only log entry. Immutable once created.
///
/// Ordering is by `timestamp`; the write path is monotonic but clock skew
/// can produce ties, so consumers sort stably and tolerate equal stamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLog {
    pub id: LogId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
    /// Expiry date of the received batch (check-ins only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
    /// Destination for check-outs / pharmacy returns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Free-text change summary (edits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Available count before an admin edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<u32>,
    /// Available count after an admin edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<u32>,
}

impl TransactionLog {
    /// Bare entry with no optional detail; callers fill in what applies.
    pub fn new(kind: TransactionType, quantity: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: LogId::new(),
            kind,
            quantity,
            timestamp,
            expiry: None,
            location: None,
            notes: None,
            previous_value: None,
            new_value: None,
        }
    }
}

/// A tracked controlled drug and its full audit trail.
///
/// A drug exclusively owns its `logs`; no other entity references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    pub id: DrugId,
    pub name: String,
    pub strength: String,
    pub presentation: Presentation,
    pub stock_levels: StockLevels,
    #[serde(default)]
    pub logs: Vec<TransactionLog>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Drug {
    pub fn status(&self) -> StockStatus {
        self.stock_levels.status()
    }

    pub fn has_ood(&self) -> bool {
        self.stock_levels.has_ood()
    }

    /// Logs in timestamp order (stable, so same-stamp entries keep their
    /// append order).
    pub fn logs_by_time(&self) -> Vec<&TransactionLog> {
        let mut logs: Vec<&TransactionLog> = self.logs.iter().collect();
        logs.sort_by_key(|log| log.timestamp);
        logs
    }
}

impl Entity for Drug {
    type Id = DrugId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a drug: identity fields plus the alert threshold.
/// Stock always starts zeroed, logs empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugDetails {
    pub name: String,
    pub strength: String,
    pub presentation: Presentation,
    pub minimum_stock: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_types_use_screaming_snake_wire_names() {
        let json = serde_json::to_value([
            TransactionType::CheckIn,
            TransactionType::CheckOut,
            TransactionType::Ood,
            TransactionType::PharmacyReturn,
            TransactionType::Edit,
        ])
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!(["CHECK_IN", "CHECK_OUT", "OOD", "PHARMACY_RETURN", "EDIT"])
        );
    }

    #[test]
    fn presentation_round_trips_display_names() {
        for p in Presentation::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
            let back: Presentation = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p);
        }
    }

    #[test]
    fn drug_serializes_with_camel_case_schema() {
        let drug = Drug {
            id: DrugId::new(),
            name: "Morphine".to_string(),
            strength: "10mg/1ml".to_string(),
            presentation: Presentation::Ampoule,
            stock_levels: StockLevels::zeroed(5),
            logs: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&drug).unwrap();
        assert!(value.get("stockLevels").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value["stockLevels"].get("minimumStock").is_some());
    }

    #[test]
    fn logs_by_time_sorts_stably_on_ties() {
        let stamp = Utc::now();
        let mut drug = Drug {
            id: DrugId::new(),
            name: "Ketamine".to_string(),
            strength: "50mg/5ml".to_string(),
            presentation: Presentation::Vial,
            stock_levels: StockLevels::zeroed(0),
            logs: Vec::new(),
            created_at: stamp,
            updated_at: stamp,
        };

        for quantity in 1..=3 {
            drug.logs
                .push(TransactionLog::new(TransactionType::CheckIn, quantity, stamp));
        }

        let quantities: Vec<u32> = drug.logs_by_time().iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, vec![1, 2, 3]);
    }
}
