use crate::schema::{AccountRecord, AccountType, StatementType};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// One business-rule violation. Each rule produces its own variant so
/// callers can render the full list with distinct messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("account '{code}' has type {account_type} but statement {statement_type}: A/P accounts must be BS, R/C accounts must be PL")]
    TypeStatementMismatch {
        code: String,
        account_type: AccountType,
        statement_type: StatementType,
    },

    #[error("duplicate code '{code}' in business unit '{business_unit}'")]
    DuplicateCode { code: String, business_unit: String },

    #[error("account '{code}' references parent '{parent_code}' which does not exist in business unit '{business_unit}'")]
    MissingParent {
        code: String,
        parent_code: String,
        business_unit: String,
    },

    #[error("account '{code}': required field '{field}' is empty")]
    MissingRequiredField { code: String, field: &'static str },

    #[error("account '{code}' cannot have parent '{parent_code}': the account would be its own ancestor")]
    Cycle { code: String, parent_code: String },
}

/// Checks a full record set against the business rules and returns every
/// violation found, in rule order. Pure and non-mutating; an empty result
/// means the set is acceptable.
pub fn validate(records: &[AccountRecord]) -> Vec<Violation> {
    let mut violations = Vec::new();

    // Rule 1: account type / statement type pairing.
    for record in records {
        if record.statement_type != record.account_type.expected_statement() {
            violations.push(Violation::TypeStatementMismatch {
                code: record.code.clone(),
                account_type: record.account_type,
                statement_type: record.statement_type,
            });
        }
    }

    // Rule 2: no duplicate codes within a business unit.
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    for record in records {
        *seen
            .entry((record.business_unit.as_str(), record.code.as_str()))
            .or_default() += 1;
    }
    let mut reported: HashSet<(&str, &str)> = HashSet::new();
    for record in records {
        let key = (record.business_unit.as_str(), record.code.as_str());
        if seen[&key] > 1 && reported.insert(key) {
            violations.push(Violation::DuplicateCode {
                code: record.code.clone(),
                business_unit: record.business_unit.clone(),
            });
        }
    }

    // Rule 3: every parent reference resolves within the same business unit.
    let codes: HashSet<(&str, &str)> = records
        .iter()
        .map(|r| (r.business_unit.as_str(), r.code.as_str()))
        .collect();
    for record in records {
        if let Some(parent) = record.parent() {
            if !codes.contains(&(record.business_unit.as_str(), parent)) {
                violations.push(Violation::MissingParent {
                    code: record.code.clone(),
                    parent_code: parent.to_string(),
                    business_unit: record.business_unit.clone(),
                });
            }
        }
    }

    // Rule 4: required fields are non-empty.
    for record in records {
        if record.code.trim().is_empty() {
            violations.push(Violation::MissingRequiredField {
                code: record.code.clone(),
                field: "code",
            });
        }
        if record.name.trim().is_empty() {
            violations.push(Violation::MissingRequiredField {
                code: record.code.clone(),
                field: "name",
            });
        }
        if record.business_unit.trim().is_empty() {
            violations.push(Violation::MissingRequiredField {
                code: record.code.clone(),
                field: "business_unit",
            });
        }
    }

    violations
}
