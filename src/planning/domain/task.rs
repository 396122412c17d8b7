//! Task entity and its partial-update payload.

use super::{
    Deadline, DeadlineViolation, Project, ProjectId, TaskId, Title, check_deadline_consistency,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// A unit of work, optionally owned by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: Title,
    description: Option<String>,
    deadline: Option<Deadline>,
    completed: bool,
    project_id: Option<ProjectId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Validated field values for a task that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title.
    pub title: Title,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Optional canonical deadline.
    pub deadline: Option<Deadline>,
    /// Initial completion flag.
    pub completed: bool,
    /// Owning project, if any.
    pub project_id: Option<ProjectId>,
}

impl NewTask {
    /// Creates a standalone, incomplete task with no deadline.
    #[must_use]
    pub const fn new(title: Title) -> Self {
        Self {
            title,
            description: None,
            deadline: None,
            completed: false,
            project_id: None,
        }
    }
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: Title,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted canonical deadline.
    pub deadline: Option<Deadline>,
    /// Persisted completion flag.
    pub completed: bool,
    /// Persisted owning project.
    pub project_id: Option<ProjectId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Field replacements for a partial task update.
///
/// The outer `Option` records whether a field was supplied at all. For
/// nullable fields the inner `Option` distinguishes "set to this value" from
/// "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: Option<Title>,
    /// Replacement or cleared description.
    pub description: Option<Option<String>>,
    /// Replacement or cleared deadline.
    pub deadline: Option<Option<Deadline>>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
    /// Replacement or cleared owning project.
    pub project_id: Option<Option<ProjectId>>,
}

impl TaskChanges {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.completed.is_none()
            && self.project_id.is_none()
    }

    /// Returns the deadline the task would have after these changes.
    #[must_use]
    pub fn effective_deadline(&self, task: &Task) -> Option<Deadline> {
        self.deadline.unwrap_or(task.deadline)
    }

    /// Returns the owning project the task would have after these changes.
    #[must_use]
    pub fn effective_project_id(&self, task: &Task) -> Option<ProjectId> {
        self.project_id.unwrap_or(task.project_id)
    }
}

impl Task {
    /// Creates a new task from validated field values.
    ///
    /// The deadline is not checked here: the caller owns the project lookup
    /// and must run [`check_deadline_consistency`] first.
    #[must_use]
    pub fn new(fields: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: fields.title,
            description: fields.description,
            deadline: fields.deadline,
            completed: fields.completed,
            project_id: fields.project_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            deadline: data.deadline,
            completed: data.completed,
            project_id: data.project_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }

    /// Returns whether the task is completed.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the owning project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
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
    /// Deadline consistency against the effective project is the caller's
    /// responsibility; see [`TaskChanges::effective_deadline`].
    pub fn apply(&mut self, changes: TaskChanges, clock: &impl Clock) {
        if changes.is_empty() {
            return;
        }
        let TaskChanges {
            title,
            description,
            deadline,
            completed,
            project_id,
        } = changes;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = deadline {
            self.deadline = value;
        }
        if let Some(value) = completed {
            self.completed = value;
        }
        if let Some(value) = project_id {
            self.project_id = value;
        }
        self.touch(clock);
    }

    /// Assigns this task to `project` after checking its existing deadline.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineViolation::Generic`] when the task deadline is later
    /// than the project deadline; the task is left unchanged.
    pub fn link_to(
        &mut self,
        project: &Project,
        clock: &impl Clock,
    ) -> Result<(), DeadlineViolation> {
        check_deadline_consistency(self.deadline, Some(project.deadline()), None)?;
        self.project_id = Some(project.id());
        self.touch(clock);
        Ok(())
    }

    /// Detaches this task from its project, if any.
    pub fn unlink(&mut self, clock: &impl Clock) {
        if self.project_id.take().is_some() {
            self.touch(clock);
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
