//! # COA Engine
//!
//! A library for managing a hierarchical Chart of Accounts (COA): flat
//! account records organized into parent/child trees, scoped per business
//! unit and per financial statement (Balance Sheet vs Profit & Loss).
//!
//! ## Core Concepts
//!
//! - **Record Store**: the flat, in-memory record table for one editing
//!   session — the single source of truth
//! - **Validator**: pure business-rule checks that report every violation,
//!   not just the first
//! - **Hierarchy Builder**: derives an ordered tree from the flat table on
//!   demand; orphaned references are surfaced, never silently dropped
//! - **Mutation Engine**: add/update/delete, each validated and atomically
//!   paired with an append-only audit entry
//!
//! ## Example
//!
//! ```rust
//! use coa_engine::{AccountRecord, AccountType, CoaEngine, StatementType};
//!
//! let mut engine = CoaEngine::new();
//!
//! engine.add(
//!     AccountRecord {
//!         code: "BSA99999".to_string(),
//!         name: "Assets".to_string(),
//!         parent_code: None,
//!         account_type: AccountType::Assets,
//!         statement_type: StatementType::BalanceSheet,
//!         name_english: None,
//!         order: Some(1000),
//!         business_unit: "DEFAULT".to_string(),
//!     },
//!     "alice",
//! )?;
//!
//! let tree = engine.hierarchy("DEFAULT", StatementType::BalanceSheet)?;
//! assert_eq!(tree.roots["BSA99999"].level, 0);
//! # Ok::<(), coa_engine::CoaError>(())
//! ```

pub mod audit;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod order;
pub mod schema;
pub mod store;
pub mod transform;
pub mod validate;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use engine::CoaEngine;
pub use error::{CoaError, Result};
pub use hierarchy::{build, build_lenient, hierarchy_levels, HierarchyNode, HierarchyTree};
pub use order::{next_order, FIRST_CHILD_ORDER, ORDER_STEP};
pub use schema::{AccountRecord, AccountType, RecordPatch, StatementType};
pub use store::{CoaStore, SearchFilter};
pub use transform::{flatten_enriched, FlattenedAccount};
pub use validate::{validate, Violation};
