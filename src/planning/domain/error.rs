//! Error types for planning domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing planning domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanningDomainError {
    /// The title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The deadline text is not an ISO-8601 timestamp.
    #[error("invalid deadline '{0}', expected an ISO-8601 timestamp")]
    InvalidDeadline(String),
}
