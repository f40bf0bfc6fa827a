use crate::error::{CoaError, Result};
use crate::schema::{AccountRecord, StatementType};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One node of a built hierarchy: a cloned record, its depth (root = 0) and
/// its children sorted by `order` (missing orders last, ties broken by
/// code). The tree is a fresh, independent value; mutating it never touches
/// the store it was built from.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub record: AccountRecord,
    pub level: u32,
    pub children: Vec<HierarchyNode>,
}

/// The result of a hierarchy build: root nodes keyed by code, plus the
/// codes that could not be attached because their parent chain does not
/// reach a root within the build scope (dangling parents, descendants of
/// such records, or members of a reference cycle).
#[derive(Debug, Clone, Default)]
pub struct HierarchyTree {
    pub roots: BTreeMap<String, HierarchyNode>,
    pub orphans: Vec<String>,
}

impl HierarchyTree {
    /// Roots sorted the way siblings are: by `order`, missing last, then
    /// code. The `roots` map itself is code-keyed for lookup.
    pub fn ordered_roots(&self) -> Vec<&HierarchyNode> {
        let mut roots: Vec<&HierarchyNode> = self.roots.values().collect();
        roots.sort_by(|a, b| sibling_order(&a.record, &b.record));
        roots
    }

    /// Pre-order traversal over all roots.
    pub fn flatten(&self) -> Vec<&HierarchyNode> {
        let mut out = Vec::new();
        for root in self.ordered_roots() {
            flatten_into(root, &mut out);
        }
        out
    }

    /// Total number of attached nodes.
    pub fn node_count(&self) -> usize {
        self.flatten().len()
    }
}

fn flatten_into<'a>(node: &'a HierarchyNode, out: &mut Vec<&'a HierarchyNode>) {
    out.push(node);
    for child in &node.children {
        flatten_into(child, out);
    }
}

fn sibling_order(a: &AccountRecord, b: &AccountRecord) -> Ordering {
    match (a.order, b.order) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.code.cmp(&b.code)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.code.cmp(&b.code),
    }
}

/// Builds the hierarchy for one business unit and statement type,
/// reporting unattachable records in `HierarchyTree::orphans` instead of
/// failing. `flatten()` plus `orphans` always accounts for every record in
/// the filtered scope.
pub fn build_lenient<'a>(
    records: impl IntoIterator<Item = &'a AccountRecord>,
    business_unit: &str,
    statement_type: StatementType,
) -> HierarchyTree {
    let scoped: Vec<&AccountRecord> = records
        .into_iter()
        .filter(|r| r.business_unit == business_unit && r.statement_type == statement_type)
        .collect();

    // One pass to index children by parent code; the recursion below only
    // does map lookups, keeping the build linear in the record count.
    let mut roots: Vec<&AccountRecord> = Vec::new();
    let mut by_parent: HashMap<&str, Vec<&AccountRecord>> = HashMap::new();
    for &record in &scoped {
        match record.parent() {
            None => roots.push(record),
            Some(parent) => by_parent.entry(parent).or_default().push(record),
        }
    }
    for children in by_parent.values_mut() {
        children.sort_by(|a, b| sibling_order(a, b));
    }

    let mut attached: HashSet<String> = HashSet::new();
    let mut tree = HierarchyTree::default();
    for root in roots {
        let mut path: Vec<&str> = Vec::new();
        let node = attach(root, 0, &by_parent, &mut path, &mut attached);
        tree.roots.insert(root.code.clone(), node);
    }

    tree.orphans = scoped
        .iter()
        .filter(|r| !attached.contains(&r.code))
        .map(|r| r.code.clone())
        .collect();
    tree.orphans.sort();
    tree
}

/// Strict variant of `build_lenient`: any record whose parent chain does
/// not reach a root fails the whole build with
/// `CoaError::OrphanReference`.
pub fn build<'a>(
    records: impl IntoIterator<Item = &'a AccountRecord>,
    business_unit: &str,
    statement_type: StatementType,
) -> Result<HierarchyTree> {
    let tree = build_lenient(records, business_unit, statement_type);
    if tree.orphans.is_empty() {
        Ok(tree)
    } else {
        Err(CoaError::OrphanReference {
            codes: tree.orphans,
        })
    }
}

fn attach<'a>(
    record: &'a AccountRecord,
    level: u32,
    by_parent: &HashMap<&str, Vec<&'a AccountRecord>>,
    path: &mut Vec<&'a str>,
    attached: &mut HashSet<String>,
) -> HierarchyNode {
    attached.insert(record.code.clone());
    path.push(record.code.as_str());

    let mut children = Vec::new();
    if let Some(child_records) = by_parent.get(record.code.as_str()) {
        for &child in child_records {
            // Guard against cycles that slipped past validation: never
            // recurse into a code already on the ancestor path.
            if path.contains(&child.code.as_str()) {
                continue;
            }
            children.push(attach(child, level + 1, by_parent, path, attached));
        }
    }

    path.pop();
    HierarchyNode {
        record: record.clone(),
        level,
        children,
    }
}

/// Computes the hierarchy level of every record in a business unit from
/// the flat table, without building a tree. A record whose parent chain
/// breaks (missing parent or cycle) gets the depth accumulated up to the
/// break, matching the builder's root-is-zero convention.
pub fn hierarchy_levels<'a>(
    records: impl IntoIterator<Item = &'a AccountRecord>,
    business_unit: &str,
) -> BTreeMap<String, u32> {
    let scoped: Vec<&AccountRecord> = records
        .into_iter()
        .filter(|r| r.business_unit == business_unit)
        .collect();
    let parent_of: HashMap<&str, &str> = scoped
        .iter()
        .filter_map(|r| r.parent().map(|p| (r.code.as_str(), p)))
        .collect();

    let mut levels = BTreeMap::new();
    for record in &scoped {
        let mut level = 0u32;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = record.code.as_str();
        while let Some(parent) = parent_of.get(current) {
            if !seen.insert(current) {
                break;
            }
            level += 1;
            current = parent;
        }
        levels.insert(record.code.clone(), level);
    }
    levels
}
