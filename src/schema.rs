use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum AccountType {
    #[serde(rename = "A")]
    #[schemars(description = "Assets (Balance Sheet, debit balance)")]
    Assets,

    #[serde(rename = "P")]
    #[schemars(description = "Liabilities and equity (Balance Sheet, credit balance)")]
    Liabilities,

    #[serde(rename = "R")]
    #[schemars(description = "Revenue (Profit & Loss, credit balance)")]
    Revenue,

    #[serde(rename = "C")]
    #[schemars(description = "Costs and expenses (Profit & Loss, debit balance)")]
    Costs,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Assets => "A",
            AccountType::Liabilities => "P",
            AccountType::Revenue => "R",
            AccountType::Costs => "C",
        }
    }

    /// The statement type this account type must carry.
    pub fn expected_statement(&self) -> StatementType {
        match self {
            AccountType::Assets | AccountType::Liabilities => StatementType::BalanceSheet,
            AccountType::Revenue | AccountType::Costs => StatementType::ProfitLoss,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum StatementType {
    #[serde(rename = "BS")]
    #[schemars(description = "Balance Sheet")]
    BalanceSheet,

    #[serde(rename = "PL")]
    #[schemars(description = "Profit & Loss")]
    ProfitLoss,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::BalanceSheet => "BS",
            StatementType::ProfitLoss => "PL",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the chart of accounts. Codes are unique within a business
/// unit; `parent_code` of `None` (or empty string on the wire) marks a root.
///
/// The hierarchy level is deliberately not a field here: it is derived from
/// the parent chain and computed by the `hierarchy` module on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AccountRecord {
    #[schemars(description = "Account code, the primary key within a business unit (e.g. 'BSA99999')")]
    pub code: String,

    #[schemars(description = "Account name in the local language")]
    pub name: String,

    #[serde(default)]
    #[schemars(description = "Code of the parent account within the same business unit, or null for a root account")]
    pub parent_code: Option<String>,

    #[schemars(description = "Account classification: A (assets), P (liabilities/equity), R (revenue), C (costs)")]
    pub account_type: AccountType,

    #[schemars(description = "Financial statement the account belongs to: BS or PL. A/P accounts must be BS, R/C accounts must be PL")]
    pub statement_type: StatementType,

    #[serde(default)]
    #[schemars(description = "Optional English account name")]
    pub name_english: Option<String>,

    #[serde(default)]
    #[schemars(description = "Sibling sort key; accounts without one sort last among their siblings")]
    pub order: Option<i64>,

    #[schemars(description = "Business unit partitioning the account namespace (e.g. 'DEFAULT')")]
    pub business_unit: String,
}

impl AccountRecord {
    /// True when the record has no resolvable parent reference. Empty
    /// strings arrive from tabular sources and count as null.
    pub fn is_root(&self) -> bool {
        self.parent_code.as_deref().map_or(true, str::is_empty)
    }

    /// The parent code with empty strings normalized away.
    pub fn parent(&self) -> Option<&str> {
        self.parent_code.as_deref().filter(|p| !p.is_empty())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AccountRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// A typed set of field updates for `CoaEngine::update`. Each field is
/// optional; for nullable record fields the outer `Option` distinguishes
/// "leave unchanged" from the inner "set or clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<Option<String>>,
    pub account_type: Option<AccountType>,
    pub statement_type: Option<StatementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_english: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Option<i64>>,
    pub business_unit: Option<String>,
}

impl RecordPatch {
    /// Returns a copy of `base` with the patch applied.
    pub fn apply_to(&self, base: &AccountRecord) -> AccountRecord {
        let mut merged = base.clone();
        if let Some(code) = &self.code {
            merged.code = code.clone();
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(parent_code) = &self.parent_code {
            merged.parent_code = parent_code.clone();
        }
        if let Some(account_type) = self.account_type {
            merged.account_type = account_type;
        }
        if let Some(statement_type) = self.statement_type {
            merged.statement_type = statement_type;
        }
        if let Some(name_english) = &self.name_english {
            merged.name_english = name_english.clone();
        }
        if let Some(order) = self.order {
            merged.order = order;
        }
        if let Some(business_unit) = &self.business_unit {
            merged.business_unit = business_unit.clone();
        }
        merged
    }
}
