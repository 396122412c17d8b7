//! The deadline consistency rule between a task and its project.

use super::{Deadline, TaskId};
use thiserror::Error;

/// A task deadline that falls after its project's deadline.
///
/// The two variants carry the same rejection worded for two call sites and
/// their messages are part of the public API contract.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DeadlineViolation {
    /// The task under change is the subject of the current request.
    #[error("Task deadline cannot be later than project deadline.")]
    Generic,

    /// An already persisted task conflicts with a rescheduled project.
    #[error("Task '{0}' has a deadline later than the project deadline.")]
    Contextual(TaskId),
}

/// Checks a task deadline against a project deadline.
///
/// Rejects if and only if both deadlines are present and the task deadline
/// is strictly later. Equal deadlines pass, and a missing deadline on either
/// side never conflicts. When `context` names a task the contextual message
/// is used, otherwise the generic one.
///
/// # Errors
///
/// Returns [`DeadlineViolation`] when the task deadline is later than the
/// project deadline.
pub fn check_deadline_consistency(
    task_deadline: Option<Deadline>,
    project_deadline: Option<Deadline>,
    context: Option<TaskId>,
) -> Result<(), DeadlineViolation> {
    match (task_deadline, project_deadline) {
        (Some(task), Some(project)) if task > project => {
            Err(context.map_or(DeadlineViolation::Generic, DeadlineViolation::Contextual))
        }
        _ => Ok(()),
    }
}
