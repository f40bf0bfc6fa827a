use crate::error::Result;
use crate::schema::AccountRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "ADD")]
    Add,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Add => "ADD",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// One immutable audit trail entry. `old_values` is absent for ADD,
/// `new_values` for DELETE; UPDATE carries both full field snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub code: String,
    pub user: String,
    pub old_values: Option<Map<String, Value>>,
    pub new_values: Option<Map<String, Value>>,
}

/// Append-only, time-ordered log of mutations. Entries are created exactly
/// once per successful mutation and never changed or removed afterwards;
/// persistence, if any, is the caller's concern.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(
        &mut self,
        action: AuditAction,
        code: &str,
        user: &str,
        old_values: Option<Map<String, Value>>,
        new_values: Option<Map<String, Value>>,
    ) {
        self.entries.push(AuditEntry {
            timestamp: Utc::now(),
            action,
            code: code.to_string(),
            user: user.to_string(),
            old_values,
            new_values,
        });
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Entries concerning one account code, oldest first.
    pub fn for_code(&self, code: &str) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.code == code).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes a record into the flat field map stored on audit entries.
pub(crate) fn snapshot(record: &AccountRecord) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        // A struct always serializes to an object.
        other => Ok(Map::from_iter([("record".to_string(), other)])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AccountType, StatementType};

    fn sample_record() -> AccountRecord {
        AccountRecord {
            code: "BSA99999".to_string(),
            name: "Assets".to_string(),
            parent_code: None,
            account_type: AccountType::Assets,
            statement_type: StatementType::BalanceSheet,
            name_english: None,
            order: Some(1000),
            business_unit: "DEFAULT".to_string(),
        }
    }

    #[test]
    fn test_append_and_filter() {
        let mut log = AuditLog::new();
        let snap = snapshot(&sample_record()).unwrap();

        log.append(AuditAction::Add, "BSA99999", "alice", None, Some(snap.clone()));
        log.append(AuditAction::Delete, "BSA10000", "alice", Some(snap), None);

        assert_eq!(log.len(), 2);
        assert_eq!(log.for_code("BSA99999").len(), 1);
        assert_eq!(log.for_code("BSA10000")[0].action, AuditAction::Delete);
        assert!(log.for_code("UNKNOWN").is_empty());
    }

    #[test]
    fn test_snapshot_contains_fields() {
        let snap = snapshot(&sample_record()).unwrap();
        assert_eq!(snap["code"], "BSA99999");
        assert_eq!(snap["account_type"], "A");
        assert_eq!(snap["statement_type"], "BS");
        assert_eq!(snap["order"], 1000);
        assert!(snap["parent_code"].is_null());
    }

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&AuditAction::Update).unwrap();
        assert_eq!(json, "\"UPDATE\"");
        assert_eq!(AuditAction::Delete.to_string(), "DELETE");
    }
}
