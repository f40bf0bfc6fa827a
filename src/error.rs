use crate::validate::Violation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoaError {
    #[error("validation failed with {} violation(s): {}", .violations.len(), format_violations(.violations))]
    Validation { violations: Vec<Violation> },

    #[error("account '{code}' not found in business unit '{business_unit}'")]
    NotFound { business_unit: String, code: String },

    #[error("cannot delete account '{code}': it has {child_count} child account(s)")]
    HasChildren { code: String, child_count: usize },

    #[error("unresolvable parent references for account(s): {}", .codes.join(", "))]
    OrphanReference { codes: Vec<String> },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoaError {
    pub fn validation(violations: Vec<Violation>) -> Self {
        CoaError::Validation { violations }
    }

    /// The violation list carried by a `Validation` error, empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            CoaError::Validation { violations } => violations,
            _ => &[],
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CoaError>;
