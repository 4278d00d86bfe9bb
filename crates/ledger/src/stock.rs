//! Pure stock arithmetic.
//!
//! Every transform takes the current levels and a quantity and returns new
//! levels. No side effects, no logging; preconditions are checked by the
//! transaction engine, not here.

use serde::{Deserialize, Serialize};

/// Stock counters for one drug.
///
/// Invariant after every applied action: `total == available + ood`.
/// `total` is always recomputed from the other two fields rather than
/// adjusted independently, so the invariant self-corrects even when a caller
/// supplies an inconsistent prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevels {
    /// Available + OOD.
    pub total: u32,
    /// Currently usable stock.
    pub available: u32,
    /// Out-of-date items (physically present but unusable).
    pub ood: u32,
    /// Reorder threshold; used only for status derivation, never to block
    /// an action.
    pub minimum_stock: u32,
}

/// Stock status derived from `available` vs `minimum_stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Sufficient,
}

impl StockLevels {
    /// Levels for a freshly added drug: everything zero except the threshold.
    pub fn zeroed(minimum_stock: u32) -> Self {
        Self {
            total: 0,
            available: 0,
            ood: 0,
            minimum_stock,
        }
    }

    /// Stock received into the cupboard.
    pub fn check_in(self, quantity: u32) -> Self {
        let available = self.available.saturating_add(quantity);
        Self {
            total: available.saturating_add(self.ood),
            available,
            ..self
        }
    }

    /// Stock dispensed to a theatre.
    pub fn check_out(self, quantity: u32) -> Self {
        let available = self.available.saturating_sub(quantity);
        Self {
            total: available.saturating_add(self.ood),
            available,
            ..self
        }
    }

    /// Available stock that has gone out of date. Total is unchanged
    /// algebraically: (available - qty) + (ood + qty) == available + ood.
    pub fn mark_ood(self, quantity: u32) -> Self {
        let available = self.available.saturating_sub(quantity);
        let ood = self.ood.saturating_add(quantity);
        Self {
            total: available.saturating_add(ood),
            available,
            ood,
            ..self
        }
    }

    /// OOD stock returned to pharmacy for destruction.
    pub fn pharmacy_return(self, quantity: u32) -> Self {
        let ood = self.ood.saturating_sub(quantity);
        Self {
            total: self.available.saturating_add(ood),
            ood,
            ..self
        }
    }

    /// Derive the alerting status.
    ///
    /// A zero threshold always reports `Sufficient`: no alerting is wanted
    /// when no minimum is set (and it guards the division).
    pub fn status(self) -> StockStatus {
        if self.minimum_stock == 0 {
            return StockStatus::Sufficient;
        }

        // available / minimum < 0.5, kept in integers.
        if (self.available as u64) * 2 < self.minimum_stock as u64 {
            return StockStatus::Critical;
        }

        if self.available < self.minimum_stock {
            return StockStatus::Warning;
        }

        StockStatus::Sufficient
    }

    /// Percentage of the minimum threshold currently available (rounded),
    /// for display. 100 when no minimum is set.
    pub fn stock_percentage(self) -> u32 {
        if self.minimum_stock == 0 {
            return 100;
        }
        ((self.available as f64 / self.minimum_stock as f64) * 100.0).round() as u32
    }

    /// True when any out-of-date stock is being held.
    pub fn has_ood(self) -> bool {
        self.ood > 0
    }

    /// `total == available + ood`, saturating like the transforms do.
    pub fn is_consistent(self) -> bool {
        self.total == self.available.saturating_add(self.ood)
    }
}
