//! Project aggregate root.

use super::{Deadline, DeadlineViolation, ProjectId, Task, Title, check_deadline_consistency};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    id: ProjectId,
    title: Title,
    deadline: Deadline,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted title.
    pub title: Title,
    /// Persisted canonical deadline.
    pub deadline: Deadline,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Field replacements for a partial project update.
///
/// `None` leaves the field unchanged. Both project fields are mandatory, so
/// neither can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    /// Replacement title.
    pub title: Option<Title>,
    /// Replacement deadline.
    pub deadline: Option<Deadline>,
}

impl ProjectChanges {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.deadline.is_none()
    }
}

impl Project {
    /// Creates a new project with no tasks.
    #[must_use]
    pub fn new(title: Title, deadline: Deadline, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::new(),
            title,
            deadline,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            deadline: data.deadline,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the project deadline.
    #[must_use]
    pub const fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies the given field replacements.
    ///
    /// Callers holding the project's tasks must validate a new deadline with
    /// [`ProjectWithTasks::apply`] instead.
    pub fn apply(&mut self, changes: ProjectChanges, clock: &impl Clock) {
        if changes.is_empty() {
            return;
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(deadline) = changes.deadline {
            self.deadline = deadline;
        }
        self.updated_at = clock.utc();
    }
}

/// A project together with the tasks it owns, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectWithTasks {
    project: Project,
    tasks: Vec<Task>,
}

impl ProjectWithTasks {
    /// Pairs a project with its owned tasks.
    #[must_use]
    pub const fn new(project: Project, tasks: Vec<Task>) -> Self {
        Self { project, tasks }
    }

    /// Returns the project.
    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the owned tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Splits into the project and its tasks.
    #[must_use]
    pub fn into_parts(self) -> (Project, Vec<Task>) {
        (self.project, self.tasks)
    }

    /// Checks every owned task against a candidate project deadline.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineViolation::Contextual`] naming the first task whose
    /// deadline is later than `candidate`.
    pub fn validate_deadline(&self, candidate: Deadline) -> Result<(), DeadlineViolation> {
        self.tasks.iter().try_for_each(|task| {
            check_deadline_consistency(task.deadline(), Some(candidate), Some(task.id()))
        })
    }

    /// Applies field replacements after validating a new deadline against
    /// every owned task.
    ///
    /// Nothing changes when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineViolation::Contextual`] when an owned task's
    /// deadline is later than the new project deadline.
    pub fn apply(
        &mut self,
        changes: ProjectChanges,
        clock: &impl Clock,
    ) -> Result<(), DeadlineViolation> {
        if let Some(deadline) = changes.deadline {
            self.validate_deadline(deadline)?;
        }
        self.project.apply(changes, clock);
        Ok(())
    }
}
