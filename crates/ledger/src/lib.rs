//! Controlled-drug ledger domain module.
//!
//! This crate contains the stock arithmetic, the ledger entity model and the
//! transaction engine, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod drug;
pub mod engine;
pub mod location;
pub mod stock;

pub use drug::{Drug, DrugDetails, Presentation, TransactionLog, TransactionType};
pub use engine::{Formulary, StockAction};
pub use stock::{StockLevels, StockStatus};
