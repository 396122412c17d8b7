//! Store port for transactional project and task persistence.
//!
//! Every service operation is one unit of work: a synchronous closure that
//! performs all of its reads, checks and writes against a session.
//! [`PlanningStore::read`] runs read-only work against a [`PlanningReader`];
//! [`PlanningStore::transaction`] runs mutating work against a
//! [`PlanningSession`] and commits only when the closure returns `Ok`, so a
//! rejected mutation never leaves partial writes behind.
//!
//! Mutating work locks rows in one order: task rows first, in identifier
//! order, then project rows.

use crate::planning::domain::{Page, Project, ProjectId, ProjectWithTasks, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type PlanningStoreResult<T> = Result<T, PlanningStoreError>;

/// Row lock taken on a project inside a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowLock {
    /// Blocks concurrent modification of the row until commit.
    Share,
    /// Blocks concurrent modification and locking of the row until commit.
    Update,
}

/// Task subset returned by [`PlanningReader::list_tasks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    /// Every task.
    All,
    /// Only tasks with a deadline.
    WithDeadline,
}

/// Lookups available to every unit of work.
///
/// List operations return records in insertion order. Nothing read here is
/// locked.
pub trait PlanningReader {
    /// Finds a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the lookup fails.
    fn find_project(&mut self, id: ProjectId) -> PlanningStoreResult<Option<Project>>;

    /// Finds a project together with every task it owns.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the lookup fails.
    fn find_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>>;

    /// Lists a window of projects, each with every task it owns.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the query fails.
    fn list_projects(&mut self, page: Page) -> PlanningStoreResult<Vec<ProjectWithTasks>>;

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the lookup fails.
    fn find_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>>;

    /// Lists a window of tasks matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the query fails.
    fn list_tasks(&mut self, filter: TaskFilter, page: Page) -> PlanningStoreResult<Vec<Task>>;

    /// Lists a window of the tasks owned by a project.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the query fails.
    fn list_project_tasks(
        &mut self,
        project_id: ProjectId,
        page: Page,
    ) -> PlanningStoreResult<Vec<Task>>;
}

/// Locking lookups and writes available inside a mutating unit of work.
///
/// Callers take task locks before project locks.
pub trait PlanningSession: PlanningReader {
    /// Finds a project and locks its row.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the lookup fails.
    fn lock_project(
        &mut self,
        id: ProjectId,
        lock: RowLock,
    ) -> PlanningStoreResult<Option<Project>>;

    /// Finds a project, locks its row for update and loads its tasks
    /// without locking them.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the lookup fails.
    fn lock_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>>;

    /// Finds a task and locks its row for update.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the lookup fails.
    fn lock_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>>;

    /// Locks every task owned by a project for update, in identifier order,
    /// and returns them in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the query fails.
    fn lock_owned_tasks(&mut self, project_id: ProjectId) -> PlanningStoreResult<Vec<Task>>;

    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::DuplicateProject`] when the identifier
    /// already exists.
    fn insert_project(&mut self, project: &Project) -> PlanningStoreResult<()>;

    /// Persists changes to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::ProjectNotFound`] when the project does
    /// not exist.
    fn update_project(&mut self, project: &Project) -> PlanningStoreResult<()>;

    /// Removes a project. Tasks still referencing it are unlinked.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::ProjectNotFound`] when the project does
    /// not exist.
    fn delete_project(&mut self, id: ProjectId) -> PlanningStoreResult<()>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::DuplicateTask`] when the identifier
    /// already exists or [`PlanningStoreError::ProjectNotFound`] when the
    /// owning project does not exist.
    fn insert_task(&mut self, task: &Task) -> PlanningStoreResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::TaskNotFound`] when the task does not
    /// exist or [`PlanningStoreError::ProjectNotFound`] when the owning
    /// project does not exist.
    fn update_task(&mut self, task: &Task) -> PlanningStoreResult<()>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::TaskNotFound`] when the task does not
    /// exist.
    fn delete_task(&mut self, id: TaskId) -> PlanningStoreResult<()>;
}

/// Transactional planning persistence contract.
#[async_trait]
pub trait PlanningStore: Send + Sync {
    /// Runs read-only `work` against a consistent view of the store.
    ///
    /// Read-only work never waits for other readers.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`PlanningStoreError`]
    /// converted into `E` when the view cannot be opened.
    async fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlanningReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlanningStoreError> + Send + 'static;

    /// Runs mutating `work` as one unit of work.
    ///
    /// The session is committed when `work` returns `Ok` and rolled back
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`PlanningStoreError`]
    /// converted into `E` when the transaction itself cannot be opened or
    /// committed.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlanningSession) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlanningStoreError> + Send + 'static;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum PlanningStoreError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlanningStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
