//! Service layer for project orchestration.
//!
//! Rescheduling a project re-validates every task it owns against the new
//! deadline; the whole update is rejected on the first conflicting task.

use crate::planning::{
    domain::{
        Deadline, DeadlineInput, Page, Project, ProjectChanges, ProjectId, ProjectWithTasks, Task,
        Title,
    },
    ports::{PlanningReader, PlanningSession, PlanningStore, RowLock},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

use super::{PlanningError, PlanningResult};

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    title: String,
    deadline: Deadline,
}

impl CreateProjectRequest {
    /// Creates a request; the deadline is normalized to canonical UTC.
    #[must_use]
    pub fn new(title: impl Into<String>, deadline: impl Into<DeadlineInput>) -> Self {
        Self {
            title: title.into(),
            deadline: Deadline::normalize(deadline.into()),
        }
    }
}

/// Request payload for a partial project update.
///
/// Only fields set on the request are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    title: Option<String>,
    deadline: Option<Deadline>,
}

impl UpdateProjectRequest {
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

    /// Replaces the deadline; the value is normalized to canonical UTC.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<DeadlineInput>) -> Self {
        self.deadline = Some(Deadline::normalize(deadline.into()));
        self
    }

    fn into_changes(self) -> PlanningResult<ProjectChanges> {
        Ok(ProjectChanges {
            title: self.title.map(Title::new).transpose()?,
            deadline: self.deadline,
        })
    }
}

/// Project orchestration service.
pub struct ProjectService<S, C>
where
    S: PlanningStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for ProjectService<S, C>
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

impl<S, C> ProjectService<S, C>
where
    S: PlanningStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a project with an empty task collection.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Domain`] when the title is empty or
    /// [`PlanningError::Store`] when persistence fails.
    pub async fn create(&self, request: CreateProjectRequest) -> PlanningResult<ProjectWithTasks> {
        let title = Title::new(request.title)?;
        let project = Project::new(title, request.deadline, &*self.clock);
        let stored = project.clone();
        self.store
            .transaction(move |session: &mut dyn PlanningSession| -> PlanningResult<()> {
                session.insert_project(&stored)?;
                Ok(())
            })
            .await?;

        info!(project_id = %project.id(), deadline = %project.deadline(), "project created");
        Ok(ProjectWithTasks::new(project, Vec::new()))
    }

    /// Applies a partial update to a project.
    ///
    /// A new deadline is checked against every owned task first; on the
    /// first conflict nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the project does not exist,
    /// [`PlanningError::Deadline`] with the contextual message when an owned
    /// task's deadline is later than the new deadline,
    /// [`PlanningError::Domain`] when the new title is empty, or
    /// [`PlanningError::Store`] when persistence fails.
    pub async fn update(
        &self,
        id: ProjectId,
        request: UpdateProjectRequest,
    ) -> PlanningResult<ProjectWithTasks> {
        let changes = request.into_changes()?;
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .transaction(
                move |session: &mut dyn PlanningSession| -> PlanningResult<ProjectWithTasks> {
                    let mut aggregate = session
                        .lock_project_with_tasks(id)?
                        .ok_or_else(|| PlanningError::project_not_found(id))?;
                    aggregate.apply(changes, &*clock)?;
                    session.update_project(aggregate.project())?;
                    Ok(aggregate)
                },
            )
            .await;

        match &result {
            Ok(aggregate) => {
                let deadline = aggregate.project().deadline();
                info!(project_id = %id, %deadline, "project updated");
            }
            Err(err) => debug!(project_id = %id, error = %err, "project update rejected"),
        }
        result
    }

    /// Deletes a project, unlinking every task it owned.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the project does not exist or
    /// [`PlanningError::Store`] when persistence fails.
    pub async fn delete(&self, id: ProjectId) -> PlanningResult<()> {
        let clock = Arc::clone(&self.clock);
        let unlinked = self
            .store
            .transaction(move |session: &mut dyn PlanningSession| -> PlanningResult<usize> {
                let owned = session.lock_owned_tasks(id)?;
                session
                    .lock_project(id, RowLock::Update)?
                    .ok_or_else(|| PlanningError::project_not_found(id))?;
                let count = owned.len();
                for mut task in owned {
                    task.unlink(&*clock);
                    session.update_task(&task)?;
                }
                session.delete_project(id)?;
                Ok(count)
            })
            .await?;

        info!(project_id = %id, unlinked_tasks = unlinked, "project deleted");
        Ok(())
    }

    /// Returns a project with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the project does not exist or
    /// [`PlanningError::Store`] when the lookup fails.
    pub async fn get(&self, id: ProjectId) -> PlanningResult<ProjectWithTasks> {
        self.store
            .read(move |reader: &mut dyn PlanningReader| -> PlanningResult<ProjectWithTasks> {
                reader
                    .find_project_with_tasks(id)?
                    .ok_or_else(|| PlanningError::project_not_found(id))
            })
            .await
    }

    /// Lists a window of projects, each with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::Store`] when the query fails.
    pub async fn list(&self, page: Page) -> PlanningResult<Vec<ProjectWithTasks>> {
        self.store
            .read(
                move |reader: &mut dyn PlanningReader| -> PlanningResult<Vec<ProjectWithTasks>> {
                    Ok(reader.list_projects(page)?)
                },
            )
            .await
    }

    /// Lists a window of the tasks owned by a project.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::NotFound`] when the project does not exist or
    /// [`PlanningError::Store`] when the query fails.
    pub async fn list_tasks_of(&self, id: ProjectId, page: Page) -> PlanningResult<Vec<Task>> {
        self.store
            .read(move |reader: &mut dyn PlanningReader| -> PlanningResult<Vec<Task>> {
                reader
                    .find_project(id)?
                    .ok_or_else(|| PlanningError::project_not_found(id))?;
                Ok(reader.list_project_tasks(id, page)?)
            })
            .await
    }
}
