use crate::audit::{snapshot, AuditAction, AuditLog};
use crate::error::{CoaError, Result};
use crate::hierarchy::{self, HierarchyTree};
use crate::schema::{AccountRecord, RecordPatch, StatementType};
use crate::store::CoaStore;
use crate::validate::{validate, Violation};
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Owns the record store and audit log of one editing session and drives
/// every mutation through validation. Each operation is synchronous and
/// atomic with respect to the store/log pair: on any error nothing has
/// changed, on success exactly one audit entry has been appended.
///
/// Single-writer by design. Wrap the engine in an external lock before
/// sharing it across threads.
#[derive(Debug, Default)]
pub struct CoaEngine {
    store: CoaStore,
    audit: AuditLog,
}

impl CoaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a full record set supplied by a storage collaborator,
    /// validating it at the boundary. Fails with the complete violation
    /// list before any state is built; loading appends no audit entries.
    pub fn from_records(records: Vec<AccountRecord>) -> Result<Self> {
        let mut violations = validate(&records);
        violations.extend(cycle_violations(&records));
        if !violations.is_empty() {
            return Err(CoaError::validation(violations));
        }

        info!("loaded {} chart of accounts record(s)", records.len());
        Ok(Self {
            store: CoaStore::from_records(records),
            audit: AuditLog::new(),
        })
    }

    pub fn store(&self) -> &CoaStore {
        &self.store
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Re-checks the whole store against the business rules.
    pub fn validate(&self) -> Vec<Violation> {
        validate(&self.store.all_records())
    }

    /// Default sort order for a new child of `parent_code` (`None` for the
    /// root level) within a business unit.
    pub fn next_order(&self, business_unit: &str, parent_code: Option<&str>) -> i64 {
        self.store.next_order(business_unit, parent_code)
    }

    /// Strict hierarchy build for one business unit and statement type;
    /// fails if any record in scope cannot be attached.
    pub fn hierarchy(
        &self,
        business_unit: &str,
        statement_type: StatementType,
    ) -> Result<HierarchyTree> {
        hierarchy::build(self.store.records(business_unit), business_unit, statement_type)
    }

    /// Lenient hierarchy build: unattachable codes are reported on the
    /// tree instead of failing. Intended for display callers.
    pub fn hierarchy_lenient(
        &self,
        business_unit: &str,
        statement_type: StatementType,
    ) -> HierarchyTree {
        hierarchy::build_lenient(self.store.records(business_unit), business_unit, statement_type)
    }

    /// Adds a new account. When the caller leaves `order` unset it is
    /// allocated from the record's siblings. The resulting full record set
    /// is validated before anything is stored.
    pub fn add(&mut self, mut record: AccountRecord, user: &str) -> Result<()> {
        if record.order.is_none() {
            let allocated = self
                .store
                .next_order(&record.business_unit, record.parent());
            debug!(
                "allocated order {} for new account '{}' under parent {:?}",
                allocated,
                record.code,
                record.parent()
            );
            record.order = Some(allocated);
        }

        let mut resulting = self.store.all_records();
        resulting.push(record.clone());
        let mut violations = validate(&resulting);
        violations.extend(cycle_violations(&resulting));
        if !violations.is_empty() {
            return Err(CoaError::validation(violations));
        }

        let new_values = snapshot(&record)?;
        info!(
            "ADD account '{}' in business unit '{}' by {}",
            record.code, record.business_unit, user
        );
        let code = record.code.clone();
        self.store.upsert(record);
        self.audit
            .append(AuditAction::Add, &code, user, None, Some(new_values));
        Ok(())
    }

    /// Applies a field patch to an existing account. The merged record and
    /// the rest of the store are re-validated as a whole, and a
    /// `parent_code` rewrite that would make the account its own ancestor
    /// is rejected. Returns the updated record.
    pub fn update(
        &mut self,
        business_unit: &str,
        code: &str,
        patch: &RecordPatch,
        user: &str,
    ) -> Result<AccountRecord> {
        let current = self
            .store
            .get(business_unit, code)
            .cloned()
            .ok_or_else(|| CoaError::NotFound {
                business_unit: business_unit.to_string(),
                code: code.to_string(),
            })?;

        let merged = patch.apply_to(&current);

        // Validate the store as it would look after the update.
        let resulting: Vec<AccountRecord> = self
            .store
            .all_records()
            .into_iter()
            .filter(|r| !(r.business_unit == business_unit && r.code == code))
            .chain(std::iter::once(merged.clone()))
            .collect();
        let mut violations = validate(&resulting);
        violations.extend(cycle_violations(&resulting));
        if !violations.is_empty() {
            return Err(CoaError::validation(violations));
        }

        let old_values = snapshot(&current)?;
        let new_values = snapshot(&merged)?;
        info!(
            "UPDATE account '{}' in business unit '{}' by {}",
            code, business_unit, user
        );
        self.store.remove(business_unit, code);
        self.store.upsert(merged.clone());
        self.audit.append(
            AuditAction::Update,
            code,
            user,
            Some(old_values),
            Some(new_values),
        );
        Ok(merged)
    }

    /// Deletes an account. Rejected while any record still references it
    /// as a parent; children must be deleted or re-parented first.
    pub fn delete(&mut self, business_unit: &str, code: &str, user: &str) -> Result<AccountRecord> {
        let current = self
            .store
            .get(business_unit, code)
            .cloned()
            .ok_or_else(|| CoaError::NotFound {
                business_unit: business_unit.to_string(),
                code: code.to_string(),
            })?;

        let child_count = self.store.child_count(business_unit, code);
        if child_count > 0 {
            return Err(CoaError::HasChildren {
                code: code.to_string(),
                child_count,
            });
        }

        let old_values = snapshot(&current)?;
        info!(
            "DELETE account '{}' in business unit '{}' by {}",
            code, business_unit, user
        );
        self.store.remove(business_unit, code);
        self.audit
            .append(AuditAction::Delete, code, user, Some(old_values), None);
        Ok(current)
    }

}

/// Violations for records sitting on their own ancestor chain within
/// their business unit. Rule 3 only guarantees that parents resolve; this
/// closes the remaining hole where the chain loops back on itself, e.g. a
/// record added with `parent_code` equal to its own code, or a loaded set
/// carrying a pre-existing cycle. The walk per record is bounded by a
/// visited set, so a cycle cannot hang it.
fn cycle_violations(records: &[AccountRecord]) -> Vec<Violation> {
    let parent_of: HashMap<(&str, &str), &str> = records
        .iter()
        .filter_map(|r| {
            r.parent()
                .map(|p| ((r.business_unit.as_str(), r.code.as_str()), p))
        })
        .collect();

    let mut violations = Vec::new();
    for record in records {
        let Some(direct_parent) = record.parent() else {
            continue;
        };
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = direct_parent;
        loop {
            if current == record.code {
                violations.push(Violation::Cycle {
                    code: record.code.clone(),
                    parent_code: direct_parent.to_string(),
                });
                break;
            }
            if !seen.insert(current) {
                break;
            }
            match parent_of.get(&(record.business_unit.as_str(), current)) {
                Some(&parent) => current = parent,
                None => break,
            }
        }
    }
    violations
}
