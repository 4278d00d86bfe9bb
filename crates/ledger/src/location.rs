//! Theatre location catalogue for check-out actions.
//!
//! The engine accepts any location string (the UI constrains the choice);
//! the one location with ledger semantics is [`PHARMACY`], which turns a
//! check-out into a pharmacy return of OOD stock.

/// Sentinel location: checking out "to Pharmacy" is a return of OOD stock,
/// not a theatre dispensation.
pub const PHARMACY: &str = "Pharmacy";

/// Off-site dispensation.
pub const REMOTE: &str = "Remote";

const EMERGENCY_THEATRES: u32 = 22;
const DAY_THEATRES: u32 = 7;

/// `E1..E22`.
pub fn emergency_theatres() -> Vec<String> {
    (1..=EMERGENCY_THEATRES).map(|i| format!("E{i}")).collect()
}

/// `D1..D7`.
pub fn day_theatres() -> Vec<String> {
    (1..=DAY_THEATRES).map(|i| format!("D{i}")).collect()
}

/// Every valid check-out destination, in display order.
pub fn all_locations() -> Vec<String> {
    let mut locations = emergency_theatres();
    locations.extend(day_theatres());
    locations.push(REMOTE.to_string());
    locations.push(PHARMACY.to_string());
    locations
}

/// Whether a check-out to `location` is semantically a pharmacy return.
pub fn is_pharmacy(location: &str) -> bool {
    location == PHARMACY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_expected_size_and_order() {
        let all = all_locations();
        assert_eq!(all.len(), 22 + 7 + 2);
        assert_eq!(all.first().map(String::as_str), Some("E1"));
        assert_eq!(all[22], "D1");
        assert_eq!(all.last().map(String::as_str), Some(PHARMACY));
    }

    #[test]
    fn only_pharmacy_is_a_return() {
        assert!(is_pharmacy("Pharmacy"));
        assert!(!is_pharmacy("pharmacy"));
        assert!(!is_pharmacy("E3"));
        assert!(!is_pharmacy(REMOTE));
    }
}
