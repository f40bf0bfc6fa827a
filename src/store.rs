use crate::schema::{AccountRecord, AccountType, StatementType};
use std::collections::BTreeMap;

/// In-memory table of account records, addressable by code within a
/// business unit. This is a dumb container: it performs no validation at
/// all. Invariant enforcement lives in `CoaEngine`, which owns the store
/// and routes every mutation through the validator first.
#[derive(Debug, Clone, Default)]
pub struct CoaStore {
    records: BTreeMap<(String, String), AccountRecord>,
}

/// Optional filters for `CoaStore::search`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilter {
    pub account_type: Option<AccountType>,
    pub statement_type: Option<StatementType>,
}

impl CoaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a flat record sequence, e.g. rows supplied by an
    /// external storage collaborator. Later duplicates of a
    /// (business_unit, code) pair overwrite earlier ones; use
    /// `CoaEngine::from_records` to reject them instead.
    pub fn from_records(records: impl IntoIterator<Item = AccountRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    pub fn get(&self, business_unit: &str, code: &str) -> Option<&AccountRecord> {
        self.records
            .get(&(business_unit.to_string(), code.to_string()))
    }

    /// All records of one business unit, in code order.
    pub fn records(&self, business_unit: &str) -> Vec<&AccountRecord> {
        self.records
            .values()
            .filter(|r| r.business_unit == business_unit)
            .collect()
    }

    /// Every record across all business units, in (business_unit, code)
    /// order. Cloned, so the result is independent of the store; this is
    /// the persist boundary handed to storage collaborators.
    pub fn all_records(&self) -> Vec<AccountRecord> {
        self.records.values().cloned().collect()
    }

    pub fn business_units(&self) -> Vec<String> {
        let mut units: Vec<String> = self
            .records
            .keys()
            .map(|(unit, _)| unit.clone())
            .collect();
        units.dedup();
        units
    }

    pub fn upsert(&mut self, record: AccountRecord) {
        self.records
            .insert((record.business_unit.clone(), record.code.clone()), record);
    }

    pub fn remove(&mut self, business_unit: &str, code: &str) -> Option<AccountRecord> {
        self.records
            .remove(&(business_unit.to_string(), code.to_string()))
    }

    /// Direct children of `parent_code` within a business unit; a `None`
    /// parent selects the root accounts.
    pub fn children(&self, business_unit: &str, parent_code: Option<&str>) -> Vec<&AccountRecord> {
        self.records
            .values()
            .filter(|r| r.business_unit == business_unit && r.parent() == parent_code)
            .collect()
    }

    pub fn child_count(&self, business_unit: &str, parent_code: &str) -> usize {
        self.children(business_unit, Some(parent_code)).len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring search over code, name and english name,
    /// with optional type filters, scoped to one business unit. An empty
    /// query matches everything.
    pub fn search(
        &self,
        business_unit: &str,
        query: &str,
        filter: SearchFilter,
    ) -> Vec<&AccountRecord> {
        let needle = query.to_lowercase();
        self.records
            .values()
            .filter(|r| r.business_unit == business_unit)
            .filter(|r| {
                filter
                    .account_type
                    .map_or(true, |t| r.account_type == t)
            })
            .filter(|r| {
                filter
                    .statement_type
                    .map_or(true, |s| r.statement_type == s)
            })
            .filter(|r| {
                needle.is_empty()
                    || r.code.to_lowercase().contains(&needle)
                    || r.name.to_lowercase().contains(&needle)
                    || r.name_english
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, business_unit: &str, name: &str) -> AccountRecord {
        AccountRecord {
            code: code.to_string(),
            name: name.to_string(),
            parent_code: None,
            account_type: AccountType::Assets,
            statement_type: StatementType::BalanceSheet,
            name_english: None,
            order: None,
            business_unit: business_unit.to_string(),
        }
    }

    #[test]
    fn test_upsert_get_remove() {
        let mut store = CoaStore::new();
        store.upsert(record("BSA99999", "DEFAULT", "Assets"));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("DEFAULT", "BSA99999").map(|r| r.name.as_str()),
            Some("Assets")
        );
        assert!(store.get("OTHER", "BSA99999").is_none());

        let removed = store.remove("DEFAULT", "BSA99999");
        assert_eq!(removed.map(|r| r.code), Some("BSA99999".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_records_scoped_by_business_unit() {
        let mut store = CoaStore::new();
        store.upsert(record("A1", "DEFAULT", "One"));
        store.upsert(record("A2", "DEFAULT", "Two"));
        store.upsert(record("A1", "SUBSIDIARY", "Other one"));

        assert_eq!(store.records("DEFAULT").len(), 2);
        assert_eq!(store.records("SUBSIDIARY").len(), 1);
        assert_eq!(
            store.business_units(),
            vec!["DEFAULT".to_string(), "SUBSIDIARY".to_string()]
        );
    }

    #[test]
    fn test_children_and_root_selection() {
        let mut store = CoaStore::new();
        let mut child = record("A2", "DEFAULT", "Child");
        child.parent_code = Some("A1".to_string());
        store.upsert(record("A1", "DEFAULT", "Root"));
        store.upsert(child);

        assert_eq!(store.children("DEFAULT", Some("A1")).len(), 1);
        assert_eq!(store.children("DEFAULT", None).len(), 1);
        assert_eq!(store.child_count("DEFAULT", "A1"), 1);
        assert_eq!(store.child_count("DEFAULT", "A2"), 0);
    }

    #[test]
    fn test_search_query_and_filters() {
        let mut store = CoaStore::new();
        let mut cash = record("BSA10000", "DEFAULT", "Pokladna");
        cash.name_english = Some("Cash".to_string());
        store.upsert(cash);
        store.upsert(record("BSA20000", "DEFAULT", "Budovy"));

        let hits = store.search("DEFAULT", "cash", SearchFilter::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "BSA10000");

        let hits = store.search("DEFAULT", "bsa", SearchFilter::default());
        assert_eq!(hits.len(), 2);

        let filter = SearchFilter {
            statement_type: Some(StatementType::ProfitLoss),
            ..Default::default()
        };
        assert!(store.search("DEFAULT", "", filter).is_empty());
    }
}
