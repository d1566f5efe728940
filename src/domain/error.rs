//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Construction preconditions of the weighted tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("internal node with {children} children has no label")]
    MissingLabel { children: usize },

    #[error("negative weight {weight} for leaf: {label}")]
    NegativeWeight { label: String, weight: i64 },

    #[error("weight of {label} exceeds {}", i64::MAX)]
    WeightOverflow { label: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
