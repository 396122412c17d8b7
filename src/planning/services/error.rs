//! Service-level errors shared by the planning services.

use crate::planning::{
    domain::{DeadlineViolation, PlanningDomainError, ProjectId, TaskId},
    ports::PlanningStoreError,
};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Kind of entity named by a [`PlanningError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A project.
    Project,
    /// A task.
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Project => "Project",
            Self::Task => "Task",
        })
    }
}

/// Service-level errors for planning operations.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// The addressed entity does not exist.
    #[error("{entity} not found")]
    NotFound {
        /// Kind of the missing entity.
        entity: EntityKind,
        /// Identifier that was looked up.
        id: Uuid,
    },

    /// A task deadline would be later than its project's deadline.
    #[error(transparent)]
    Deadline(#[from] DeadlineViolation),

    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] PlanningDomainError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] PlanningStoreError),
}

impl PlanningError {
    /// Error for a project identifier that does not resolve.
    #[must_use]
    pub const fn project_not_found(id: ProjectId) -> Self {
        Self::NotFound {
            entity: EntityKind::Project,
            id: id.into_inner(),
        }
    }

    /// Error for a task identifier that does not resolve.
    #[must_use]
    pub const fn task_not_found(id: TaskId) -> Self {
        Self::NotFound {
            entity: EntityKind::Task,
            id: id.into_inner(),
        }
    }
}

/// Result type for planning service operations.
pub type PlanningResult<T> = Result<T, PlanningError>;
