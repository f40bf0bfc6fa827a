use crate::schema::AccountRecord;
use crate::store::CoaStore;

/// Default order for the first child under any parent.
pub const FIRST_CHILD_ORDER: i64 = 1000;

/// Spacing between allocated sibling orders; allocations land on multiples
/// of this so inserts between siblings rarely force renumbering.
pub const ORDER_STEP: i64 = 100;

/// Computes the default sort order for a new child of `parent_code` within
/// a business unit (`None` selects the root level). Returns 1000 when the
/// parent has no ordered children yet, otherwise the next multiple of 100
/// strictly above the current sibling maximum. Deterministic: repeated
/// calls without an intervening mutation return the same value.
pub fn next_order<'a>(
    records: impl IntoIterator<Item = &'a AccountRecord>,
    business_unit: &str,
    parent_code: Option<&str>,
) -> i64 {
    let max_order = records
        .into_iter()
        .filter(|r| r.business_unit == business_unit && r.parent() == parent_code)
        .filter_map(|r| r.order)
        .max();

    match max_order {
        None => FIRST_CHILD_ORDER,
        Some(max) => next_multiple_above(max, ORDER_STEP),
    }
}

// Saturates at i64::MAX so a pathological stored order near the type
// limit cannot wrap into a non-greater allocation.
fn next_multiple_above(value: i64, step: i64) -> i64 {
    value
        .div_euclid(step)
        .checked_add(1)
        .and_then(|quotient| quotient.checked_mul(step))
        .unwrap_or(i64::MAX)
}

impl CoaStore {
    /// `next_order` over the store's records. See the free function.
    pub fn next_order(&self, business_unit: &str, parent_code: Option<&str>) -> i64 {
        next_order(self.records(business_unit), business_unit, parent_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AccountType, StatementType};

    fn record(code: &str, parent: Option<&str>, order: Option<i64>) -> AccountRecord {
        AccountRecord {
            code: code.to_string(),
            name: format!("Account {code}"),
            parent_code: parent.map(str::to_string),
            account_type: AccountType::Assets,
            statement_type: StatementType::BalanceSheet,
            name_english: None,
            order,
            business_unit: "DEFAULT".to_string(),
        }
    }

    #[test]
    fn test_defaults_to_1000_for_empty_parent() {
        let records = vec![record("ROOT", None, Some(1000))];
        assert_eq!(next_order(&records, "DEFAULT", Some("ROOT")), 1000);
        assert_eq!(next_order(&records, "DEFAULT", Some("UNKNOWN")), 1000);
    }

    #[test]
    fn test_steps_by_100_from_sibling_max() {
        let records = vec![
            record("ROOT", None, Some(1000)),
            record("C1", Some("ROOT"), Some(1000)),
            record("C2", Some("ROOT"), Some(1100)),
        ];
        assert_eq!(next_order(&records, "DEFAULT", Some("ROOT")), 1200);
    }

    #[test]
    fn test_rounds_up_to_next_multiple_of_100() {
        let records = vec![
            record("ROOT", None, Some(1000)),
            record("C1", Some("ROOT"), Some(1050)),
        ];
        assert_eq!(next_order(&records, "DEFAULT", Some("ROOT")), 1100);

        let records = vec![
            record("ROOT", None, Some(1000)),
            record("C1", Some("ROOT"), Some(1100)),
        ];
        // Strictly greater even when the max is already a multiple.
        assert_eq!(next_order(&records, "DEFAULT", Some("ROOT")), 1200);
    }

    #[test]
    fn test_unordered_children_count_as_empty() {
        let records = vec![
            record("ROOT", None, Some(1000)),
            record("C1", Some("ROOT"), None),
        ];
        assert_eq!(next_order(&records, "DEFAULT", Some("ROOT")), 1000);
    }

    #[test]
    fn test_root_level_allocation() {
        let records = vec![
            record("R1", None, Some(1000)),
            record("R2", None, Some(2000)),
        ];
        assert_eq!(next_order(&records, "DEFAULT", None), 2100);
        assert_eq!(next_order(&records, "OTHER", None), 1000);
    }

    #[test]
    fn test_saturates_near_i64_max() {
        // i64::MAX - 5 sits above the largest representable multiple of
        // 100, so the allocation clamps instead of wrapping negative.
        let records = vec![
            record("ROOT", None, Some(1000)),
            record("C1", Some("ROOT"), Some(i64::MAX - 5)),
        ];
        let next = next_order(&records, "DEFAULT", Some("ROOT"));
        assert_eq!(next, i64::MAX);
        assert!(next > i64::MAX - 5);
    }

    #[test]
    fn test_deterministic_without_mutation() {
        let records = vec![
            record("ROOT", None, Some(1000)),
            record("C1", Some("ROOT"), Some(1000)),
        ];
        let first = next_order(&records, "DEFAULT", Some("ROOT"));
        let second = next_order(&records, "DEFAULT", Some("ROOT"));
        assert_eq!(first, second);
        assert_eq!(first, 1100);
    }
}
