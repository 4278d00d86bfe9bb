//! Transaction engine: applies one action to one drug in the collection.
//!
//! All mutation of the collection goes through here. Each applied action
//! computes new stock levels via [`crate::stock`], appends exactly one log
//! entry and bumps `updated_at`; every other drug is left untouched.
//! Preconditions are re-checked even though forms pre-validate: an invalid
//! quantity is rejected with [`DomainError::InvalidQuantity`] and no
//! mutation happens.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cdstock_core::{DomainError, DomainResult, DrugId};

use crate::drug::{Drug, DrugDetails, Presentation, TransactionLog, TransactionType};
use crate::location;
use crate::stock::StockLevels;

/// A validated action payload, as supplied by the (out-of-scope) forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockAction {
    /// Stock received; `expiry` is the batch expiry date.
    CheckIn { quantity: u32, expiry: NaiveDate },
    /// Stock dispensed to `location`. A check-out to `"Pharmacy"` is a
    /// return of OOD stock and is bound by `ood`, not `available`.
    CheckOut { quantity: u32, location: String },
    /// Available stock that has gone out of date.
    MarkOod { quantity: u32 },
    /// Routine details edit; cannot touch counted stock.
    Edit {
        name: String,
        strength: String,
        presentation: Presentation,
        minimum_stock: u32,
    },
    /// Privileged override: sets the counters directly. `total` is
    /// recomputed as `available + ood` unconditionally.
    AdminEdit {
        name: String,
        strength: String,
        presentation: Presentation,
        minimum_stock: u32,
        available: u32,
        ood: u32,
    },
}

/// The full drug collection, keyed by id.
///
/// Serializes as a plain JSON array (the wire/document format); the id
/// index is rebuilt on deserialize so replace-one-entity updates stay O(1)
/// instead of scan-and-rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Drug>", into = "Vec<Drug>")]
pub struct Formulary {
    drugs: Vec<Drug>,
    index: HashMap<DrugId, usize>,
}

impl From<Vec<Drug>> for Formulary {
    fn from(drugs: Vec<Drug>) -> Self {
        let index = drugs
            .iter()
            .enumerate()
            .map(|(pos, drug)| (drug.id, pos))
            .collect();
        Self { drugs, index }
    }
}

impl From<Formulary> for Vec<Drug> {
    fn from(formulary: Formulary) -> Self {
        formulary.drugs
    }
}

impl Formulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    pub fn drugs(&self) -> &[Drug] {
        &self.drugs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drug> {
        self.drugs.iter()
    }

    pub fn get(&self, id: DrugId) -> Option<&Drug> {
        self.index.get(&id).map(|&pos| &self.drugs[pos])
    }

    pub fn contains(&self, id: DrugId) -> bool {
        self.index.contains_key(&id)
    }

    fn get_mut(&mut self, id: DrugId) -> Option<&mut Drug> {
        self.index.get(&id).map(|&pos| &mut self.drugs[pos])
    }

    /// Create a drug with zeroed stock and an empty log, appended at the
    /// end of the display order.
    pub fn add_drug(&mut self, new: DrugDetails, now: DateTime<Utc>) -> DomainResult<DrugId> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let drug = Drug {
            id: DrugId::new(),
            name: new.name,
            strength: new.strength,
            presentation: new.presentation,
            stock_levels: StockLevels::zeroed(new.minimum_stock),
            logs: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = drug.id;
        self.index.insert(id, self.drugs.len());
        self.drugs.push(drug);
        Ok(id)
    }

    /// Explicit removal. Positions after the removed entry shift, so the
    /// index is rebuilt for them.
    pub fn remove_drug(&mut self, id: DrugId) -> DomainResult<Drug> {
        let pos = *self.index.get(&id).ok_or(DomainError::NotFound)?;
        let removed = self.drugs.remove(pos);
        self.index.remove(&id);
        for (later, drug) in self.drugs.iter().enumerate().skip(pos) {
            self.index.insert(drug.id, later);
        }
        Ok(removed)
    }

    /// Wipe every drug's audit trail (admin maintenance action).
    pub fn clear_all_logs(&mut self, now: DateTime<Utc>) {
        for drug in &mut self.drugs {
            drug.logs.clear();
            drug.updated_at = now;
        }
    }

    /// Apply one action to one drug.
    ///
    /// On success exactly one log entry is appended and `updated_at` is set
    /// to `now`. On any error the collection is unchanged.
    pub fn apply(
        &mut self,
        drug_id: DrugId,
        action: StockAction,
        now: DateTime<Utc>,
    ) -> DomainResult<&Drug> {
        let drug = self.get_mut(drug_id).ok_or(DomainError::NotFound)?;

        let log = match action {
            StockAction::CheckIn { quantity, expiry } => {
                require_positive(quantity)?;
                drug.stock_levels = drug.stock_levels.check_in(quantity);
                TransactionLog {
                    expiry: Some(expiry),
                    ..TransactionLog::new(TransactionType::CheckIn, quantity, now)
                }
            }

            StockAction::CheckOut { quantity, location } if location::is_pharmacy(&location) => {
                require_positive(quantity)?;
                require_within(quantity, drug.stock_levels.ood, "OOD")?;
                drug.stock_levels = drug.stock_levels.pharmacy_return(quantity);
                TransactionLog {
                    location: Some(location),
                    ..TransactionLog::new(TransactionType::PharmacyReturn, quantity, now)
                }
            }

            StockAction::CheckOut { quantity, location } => {
                require_positive(quantity)?;
                require_within(quantity, drug.stock_levels.available, "available")?;
                drug.stock_levels = drug.stock_levels.check_out(quantity);
                TransactionLog {
                    location: Some(location),
                    ..TransactionLog::new(TransactionType::CheckOut, quantity, now)
                }
            }

            StockAction::MarkOod { quantity } => {
                require_positive(quantity)?;
                require_within(quantity, drug.stock_levels.available, "available")?;
                drug.stock_levels = drug.stock_levels.mark_ood(quantity);
                TransactionLog::new(TransactionType::Ood, quantity, now)
            }

            StockAction::Edit {
                name,
                strength,
                presentation,
                minimum_stock,
            } => {
                if name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }
                drug.name = name;
                drug.strength = strength;
                drug.presentation = presentation;
                drug.stock_levels.minimum_stock = minimum_stock;
                TransactionLog {
                    notes: Some("Drug details updated".to_string()),
                    ..TransactionLog::new(TransactionType::Edit, 0, now)
                }
            }

            StockAction::AdminEdit {
                name,
                strength,
                presentation,
                minimum_stock,
                available,
                ood,
            } => {
                if name.trim().is_empty() {
                    return Err(DomainError::validation("name cannot be empty"));
                }

                let notes = admin_edit_summary(drug, &name, &strength, presentation, minimum_stock, available, ood);
                let previous_available = drug.stock_levels.available;

                drug.name = name;
                drug.strength = strength;
                drug.presentation = presentation;
                drug.stock_levels = StockLevels {
                    total: available.saturating_add(ood),
                    available,
                    ood,
                    minimum_stock,
                };

                TransactionLog {
                    notes: Some(notes),
                    previous_value: Some(previous_available),
                    new_value: Some(available),
                    ..TransactionLog::new(TransactionType::Edit, 0, now)
                }
            }
        };

        drug.logs.push(log);
        drug.updated_at = now;
        Ok(drug)
    }
}

fn require_positive(quantity: u32) -> DomainResult<()> {
    if quantity == 0 {
        return Err(DomainError::invalid_quantity("quantity must be positive"));
    }
    Ok(())
}

fn require_within(quantity: u32, bound: u32, what: &str) -> DomainResult<()> {
    if quantity > bound {
        return Err(DomainError::invalid_quantity(format!(
            "{quantity} exceeds {what} stock of {bound}"
        )));
    }
    Ok(())
}

/// Enumerate every changed field by name and old -> new value, for the
/// audit entry of a privileged edit.
fn admin_edit_summary(
    drug: &Drug,
    name: &str,
    strength: &str,
    presentation: Presentation,
    minimum_stock: u32,
    available: u32,
    ood: u32,
) -> String {
    let mut changes: Vec<String> = Vec::new();

    if drug.stock_levels.available != available {
        changes.push(format!(
            "Available: {} → {}",
            drug.stock_levels.available, available
        ));
    }
    if drug.stock_levels.ood != ood {
        changes.push(format!("OOD: {} → {}", drug.stock_levels.ood, ood));
    }
    if drug.name != name {
        changes.push("Name changed".to_string());
    }
    if drug.strength != strength {
        changes.push("Strength changed".to_string());
    }
    if drug.presentation != presentation {
        changes.push("Presentation changed".to_string());
    }
    if drug.stock_levels.minimum_stock != minimum_stock {
        changes.push(format!(
            "Min stock: {} → {}",
            drug.stock_levels.minimum_stock, minimum_stock
        ));
    }

    if changes.is_empty() {
        "Admin edit: No changes".to_string()
    } else {
        format!("Admin edit: {}", changes.join(", "))
    }
}
