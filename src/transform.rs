use crate::hierarchy::{build_lenient, HierarchyNode};
use crate::schema::{AccountType, StatementType};
use crate::store::CoaStore;
use serde::{Deserialize, Serialize};

/// One enriched reporting row derived from the hierarchy: the record's
/// fields plus its computed position (level, sibling rank, root-to-node
/// paths) and a leaf marker. This is the shape downstream reporting
/// consumes; it is derived on demand and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenedAccount {
    pub level: u32,
    pub order: Option<i64>,
    /// Two-digit sibling rank within the parent, by sort position ("01",
    /// "02", ...).
    pub rank: String,
    pub code: String,
    pub name: String,
    /// Name prefixed with "--- " per hierarchy level, for indented lists.
    pub indented_name: String,
    pub parent_code: Option<String>,
    pub parent_name: Option<String>,
    pub name_english: Option<String>,
    pub account_type: AccountType,
    pub statement_type: StatementType,
    pub is_leaf: bool,
    /// Codes from the root down to this account, inclusive.
    pub code_path: Vec<String>,
    /// "{rank}-{name}" entries from the root down to this account.
    pub name_path: Vec<String>,
}

/// Flattens one business unit into enriched rows: Balance Sheet accounts
/// first, then Profit & Loss, each in hierarchy pre-order. Records that do
/// not attach to a tree (orphans) are omitted here; use the strict
/// hierarchy build first when they must be an error.
pub fn flatten_enriched(store: &CoaStore, business_unit: &str) -> Vec<FlattenedAccount> {
    let mut rows = Vec::new();
    for statement_type in [StatementType::BalanceSheet, StatementType::ProfitLoss] {
        let tree = build_lenient(store.records(business_unit), business_unit, statement_type);
        let roots = tree.ordered_roots();
        for (index, root) in roots.iter().enumerate() {
            walk(root, index + 1, None, &[], &[], &mut rows);
        }
    }
    rows
}

fn walk(
    node: &HierarchyNode,
    position: usize,
    parent: Option<(&str, &str)>,
    code_prefix: &[String],
    name_prefix: &[String],
    rows: &mut Vec<FlattenedAccount>,
) {
    let record = &node.record;
    let rank = format!("{position:02}");

    let mut code_path = code_prefix.to_vec();
    code_path.push(record.code.clone());
    let mut name_path = name_prefix.to_vec();
    name_path.push(format!("{rank}-{}", record.name));

    rows.push(FlattenedAccount {
        level: node.level,
        order: record.order,
        rank,
        code: record.code.clone(),
        name: record.name.clone(),
        indented_name: format!("{}{}", "--- ".repeat(node.level as usize), record.name),
        parent_code: parent.map(|(code, _)| code.to_string()),
        parent_name: parent.map(|(_, name)| name.to_string()),
        name_english: record.name_english.clone(),
        account_type: record.account_type,
        statement_type: record.statement_type,
        is_leaf: node.children.is_empty(),
        code_path: code_path.clone(),
        name_path: name_path.clone(),
    });

    for (index, child) in node.children.iter().enumerate() {
        walk(
            child,
            index + 1,
            Some((&record.code, &record.name)),
            &code_path,
            &name_path,
            rows,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AccountRecord;

    fn record(
        code: &str,
        name: &str,
        parent: Option<&str>,
        account_type: AccountType,
        order: i64,
    ) -> AccountRecord {
        AccountRecord {
            code: code.to_string(),
            name: name.to_string(),
            parent_code: parent.map(str::to_string),
            account_type,
            statement_type: account_type.expected_statement(),
            name_english: None,
            order: Some(order),
            business_unit: "DEFAULT".to_string(),
        }
    }

    fn sample_store() -> CoaStore {
        CoaStore::from_records(vec![
            record("BSA99999", "Assets", None, AccountType::Assets, 1000),
            record(
                "BSA10000",
                "Current assets",
                Some("BSA99999"),
                AccountType::Assets,
                1000,
            ),
            record(
                "BSA11000",
                "Cash",
                Some("BSA10000"),
                AccountType::Assets,
                1000,
            ),
            record(
                "BSA20000",
                "Fixed assets",
                Some("BSA99999"),
                AccountType::Assets,
                2000,
            ),
            record("PLR99999", "Revenue", None, AccountType::Revenue, 1000),
        ])
    }

    #[test]
    fn test_statement_grouping_and_preorder() {
        let rows = flatten_enriched(&sample_store(), "DEFAULT");
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["BSA99999", "BSA10000", "BSA11000", "BSA20000", "PLR99999"]
        );
    }

    #[test]
    fn test_rank_indent_and_paths() {
        let rows = flatten_enriched(&sample_store(), "DEFAULT");

        let cash = rows.iter().find(|r| r.code == "BSA11000").unwrap();
        assert_eq!(cash.level, 2);
        assert_eq!(cash.rank, "01");
        assert_eq!(cash.indented_name, "--- --- Cash");
        assert_eq!(cash.parent_code.as_deref(), Some("BSA10000"));
        assert_eq!(cash.parent_name.as_deref(), Some("Current assets"));
        assert_eq!(
            cash.code_path,
            vec!["BSA99999", "BSA10000", "BSA11000"]
        );
        assert_eq!(
            cash.name_path,
            vec!["01-Assets", "01-Current assets", "01-Cash"]
        );

        let fixed = rows.iter().find(|r| r.code == "BSA20000").unwrap();
        assert_eq!(fixed.rank, "02");
    }

    #[test]
    fn test_leaf_detection() {
        let rows = flatten_enriched(&sample_store(), "DEFAULT");
        let by_code = |code: &str| rows.iter().find(|r| r.code == code).unwrap();

        assert!(!by_code("BSA99999").is_leaf);
        assert!(!by_code("BSA10000").is_leaf);
        assert!(by_code("BSA11000").is_leaf);
        assert!(by_code("BSA20000").is_leaf);
        assert!(by_code("PLR99999").is_leaf);
    }

    #[test]
    fn test_orphans_omitted() {
        let mut store = sample_store();
        store.upsert(record(
            "BSA30000",
            "Dangling",
            Some("GHOST"),
            AccountType::Assets,
            1000,
        ));

        let rows = flatten_enriched(&store, "DEFAULT");
        assert!(rows.iter().all(|r| r.code != "BSA30000"));
        assert_eq!(rows.len(), 5);
    }
}
