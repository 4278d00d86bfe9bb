//! Built-in seed dataset.
//!
//! Used when neither a remote store nor a local cache is available, and on
//! explicit reset. Deterministic (fixed ids and timestamps) so repeated
//! seed loads compare equal.

use chrono::{DateTime, Utc};
use uuid::uuid;

use cdstock_core::DrugId;
use cdstock_ledger::{Drug, Formulary, Presentation, StockLevels};

/// 2025-01-01T00:00:00Z.
const SEED_EPOCH: i64 = 1_735_689_600;

fn seed_drug(
    id: DrugId,
    name: &str,
    strength: &str,
    presentation: Presentation,
    minimum_stock: u32,
) -> Drug {
    let stamp: DateTime<Utc> = DateTime::from_timestamp(SEED_EPOCH, 0).unwrap_or_default();
    Drug {
        id,
        name: name.to_string(),
        strength: strength.to_string(),
        presentation,
        stock_levels: StockLevels::zeroed(minimum_stock),
        logs: Vec::new(),
        created_at: stamp,
        updated_at: stamp,
    }
}

/// The fixed starter collection of theatre controlled drugs.
pub fn seed_formulary() -> Formulary {
    Formulary::from(vec![
        seed_drug(
            DrugId::from_uuid(uuid!("0194b7a0-0000-7000-8000-000000000001")),
            "Morphine",
            "10mg/1ml",
            Presentation::Ampoule,
            10,
        ),
        seed_drug(
            DrugId::from_uuid(uuid!("0194b7a0-0000-7000-8000-000000000002")),
            "Fentanyl",
            "100mcg/2ml",
            Presentation::Ampoule,
            10,
        ),
        seed_drug(
            DrugId::from_uuid(uuid!("0194b7a0-0000-7000-8000-000000000003")),
            "Ketamine",
            "200mg/2ml",
            Presentation::Vial,
            5,
        ),
        seed_drug(
            DrugId::from_uuid(uuid!("0194b7a0-0000-7000-8000-000000000004")),
            "Midazolam",
            "10mg/2ml",
            Presentation::Ampoule,
            10,
        ),
        seed_drug(
            DrugId::from_uuid(uuid!("0194b7a0-0000-7000-8000-000000000005")),
            "Alfentanil",
            "1mg/2ml",
            Presentation::Ampoule,
            5,
        ),
        seed_drug(
            DrugId::from_uuid(uuid!("0194b7a0-0000-7000-8000-000000000006")),
            "Oxycodone",
            "5mg",
            Presentation::Capsule,
            20,
        ),
    ])
}
