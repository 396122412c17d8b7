//! Service layer for task orchestration.
//!
//! Every path that can place a deadline under a project (create, update and
//! link) checks it against that project's deadline before writing.

use crate::planning::{
    domain::{
        Deadline, DeadlineInput, NewTask, Page, ProjectId, Task, TaskChanges, TaskId, Title,
        check_deadline_consistency,
    },
    ports::{PlanningReader, PlanningSession, PlanningStore, RowLock, TaskFilter},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

use super::{PlanningError, PlanningResult};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    deadline: Option<Deadline>,
    completed: bool,
    project_id: Option<ProjectId>,
}

impl CreateTaskRequest {
    /// Creates a request for a standalone, incomplete task.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            deadline: None,
            completed: false,
            project_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the deadline; the value is normalized to canonical UTC.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<DeadlineInput>) -> Self {
        self.deadline = Some(Deadline::normalize(deadline.into()));
        self
    }

    /// Sets the initial completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Places the task under a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    fn into_new_task(self) -> PlanningResult<NewTask> {
        Ok(NewTask {
            title: Title::new(self.title)?,
            description: self.description,
            deadline: self.deadline,
            completed: self.completed,
            project_id: self.project_id,
        })
    }
}

/// Request payload for a partial task update.
///
/// Fields never touched on the request keep their stored values; the
/// `clear_*` methods set nullable fields to null explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<Option<String>>,
    deadline: Option<Option<Deadline>>,
    completed: Option<bool>,
    project_id: Option<Option<ProjectId>>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Removes the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Replaces the deadline; the value is normalized to canonical UTC.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<DeadlineInput>) -> Self {
        self.deadline = Some(Some(Deadline::normalize(deadline.into())));
        self
    }

    /// Removes the deadline.
    #[must_use]
    pub const fn clear_deadline(mut self) -> Self {
        self.deadline = Some(None);
        self
    }

    /// Replaces the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Moves the task under a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(Some(project_id));
        self
    }

    /// Detaches the task from its project.
    #[must_use]
    pub const fn clear_project(mut self) -> Self {
        self.project_id = Some(None);
        self
    }

    fn into_changes(self) -> PlanningResult<TaskChanges> {
        Ok(TaskChanges {
            title: self.title.map(Title::new).transpose()?,
            description: self.description,
            deadline: self.deadline,
            completed: self.completed,
            project_id: self.project_id,
        })
    }
}

/// Task orchestration service.
pub struct TaskService<S, C>
where
    S: PlanningStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for TaskService<S, C>
where
    S: PlanningStore,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Loads the project a task is being placed under and checks the task
/// deadline against it.
fn check_against_project(
    session: &mut dyn PlanningSession,
    project_id: ProjectId,
    deadline: Option<Deadline>,
) -> PlanningResult<()> {
    let project = session
        .lock_project(project_id, RowLock::Share)?
        .ok_or_else(|| PlanningError::project_not_found(project_id))?;
    check_deadline_consistency(deadline, Some(project.deadline()), None)?;
    Ok(())
}

impl<S, C> TaskService<S, C>
where
    S: PlanningStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task, standalone or under a project.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the named project does not
    /// exist, [`PlanningError::Deadline`] when the deadline is later than the
    /// project's, [`PlanningError::Domain`] when the title is empty, or
    /// [`PlanningError::Store`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> PlanningResult<Task> {
        let fields = request.into_new_task()?;
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .transaction(move |session: &mut dyn PlanningSession| -> PlanningResult<Task> {
                if let Some(project_id) = fields.project_id {
                    check_against_project(session, project_id, fields.deadline)?;
                }
                let task = Task::new(fields, &*clock);
                session.insert_task(&task)?;
                Ok(task)
            })
            .await;

        match &result {
            Ok(task) => {
                info!(task_id = %task.id(), project_id = ?task.project_id(), "task created");
            }
            Err(err) => debug!(error = %err, "task creation rejected"),
        }
        result
    }

    /// Applies a partial update to a task.
    ///
    /// The deadline check runs against the effective values: the updated
    /// project and deadline where supplied, the stored ones otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the task or the effective
    /// project does not exist, [`PlanningError::Deadline`] when the effective
    /// deadline is later than the effective project's,
    /// [`PlanningError::Domain`] when the new title is empty, or
    /// [`PlanningError::Store`] when persistence fails.
    pub async fn update(&self, id: TaskId, request: UpdateTaskRequest) -> PlanningResult<Task> {
        let changes = request.into_changes()?;
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .transaction(move |session: &mut dyn PlanningSession| -> PlanningResult<Task> {
                let mut task = session
                    .lock_task(id)?
                    .ok_or_else(|| PlanningError::task_not_found(id))?;
                if let Some(project_id) = changes.effective_project_id(&task) {
                    check_against_project(session, project_id, changes.effective_deadline(&task))?;
                }
                task.apply(changes, &*clock);
                session.update_task(&task)?;
                Ok(task)
            })
            .await;

        match &result {
            Ok(task) => info!(task_id = %id, project_id = ?task.project_id(), "task updated"),
            Err(err) => debug!(task_id = %id, error = %err, "task update rejected"),
        }
        result
    }

    /// Deletes a task. Its project is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the task does not exist or
    /// [`PlanningError::Store`] when persistence fails.
    pub async fn delete(&self, id: TaskId) -> PlanningResult<()> {
        self.store
            .transaction(move |session: &mut dyn PlanningSession| -> PlanningResult<()> {
                session
                    .lock_task(id)?
                    .ok_or_else(|| PlanningError::task_not_found(id))?;
                session.delete_task(id)?;
                Ok(())
            })
            .await?;

        info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Places an existing task under a project.
    ///
    /// The task's current deadline is checked against the project's.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] for the task first and then for
    /// the project, [`PlanningError::Deadline`] when the task deadline is
    /// later than the project's, or [`PlanningError::Store`] when
    /// persistence fails.
    pub async fn link_to_project(
        &self,
        task_id: TaskId,
        project_id: ProjectId,
    ) -> PlanningResult<Task> {
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .transaction(move |session: &mut dyn PlanningSession| -> PlanningResult<Task> {
                let mut task = session
                    .lock_task(task_id)?
                    .ok_or_else(|| PlanningError::task_not_found(task_id))?;
                let project = session
                    .lock_project(project_id, RowLock::Share)?
                    .ok_or_else(|| PlanningError::project_not_found(project_id))?;
                task.link_to(&project, &*clock)?;
                session.update_task(&task)?;
                Ok(task)
            })
            .await;

        match &result {
            Ok(_) => info!(%task_id, %project_id, "task linked to project"),
            Err(err) => {
                debug!(%task_id, %project_id, error = %err, "task link rejected");
            }
        }
        result
    }

    /// Returns a task.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the task does not exist or
    /// [`PlanningError::Store`] when the lookup fails.
    pub async fn get(&self, id: TaskId) -> PlanningResult<Task> {
        self.store
            .read(move |reader: &mut dyn PlanningReader| -> PlanningResult<Task> {
                reader
                    .find_task(id)?
                    .ok_or_else(|| PlanningError::task_not_found(id))
            })
            .await
    }

    /// Lists a window of all tasks.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Store`] when the query fails.
    pub async fn list(&self, page: Page) -> PlanningResult<Vec<Task>> {
        self.list_filtered(TaskFilter::All, page).await
    }

    /// Lists a window of the tasks that have a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Store`] when the query fails.
    pub async fn list_with_deadline(&self, page: Page) -> PlanningResult<Vec<Task>> {
        self.list_filtered(TaskFilter::WithDeadline, page).await
    }

    async fn list_filtered(&self, filter: TaskFilter, page: Page) -> PlanningResult<Vec<Task>> {
        self.store
            .read(move |reader: &mut dyn PlanningReader| -> PlanningResult<Vec<Task>> {
                Ok(reader.list_tasks(filter, page)?)
            })
            .await
    }
}
