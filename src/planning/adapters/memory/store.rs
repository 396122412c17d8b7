//! In-memory planning store for tests and database-less deployments.
//!
//! Read-only work shares a read lock and sees the committed state directly.
//! Mutating work holds the write lock and applies changes in place,
//! journalling the previous value of every record it touches; when the work
//! fails the journal is replayed in reverse.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::planning::{
    domain::{Page, PersistedTaskData, Project, ProjectId, ProjectWithTasks, Task, TaskId},
    ports::{
        PlanningReader, PlanningSession, PlanningStore, PlanningStoreError, PlanningStoreResult,
        RowLock, TaskFilter,
    },
};

/// Thread-safe in-memory planning store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanningStore {
    state: Arc<RwLock<InMemoryPlanningState>>,
}

impl InMemoryPlanningStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Record tagged with its insertion position.
#[derive(Debug, Clone)]
struct Positioned<T> {
    position: u64,
    record: T,
}

#[derive(Debug, Clone, Default)]
struct InMemoryPlanningState {
    next_position: u64,
    projects: HashMap<ProjectId, Positioned<Project>>,
    tasks: HashMap<TaskId, Positioned<Task>>,
}

impl InMemoryPlanningState {
    const fn claim_position(&mut self) -> u64 {
        let position = self.next_position;
        self.next_position += 1;
        position
    }

    fn ensure_project_exists(&self, project_id: Option<ProjectId>) -> PlanningStoreResult<()> {
        match project_id {
            Some(id) if !self.projects.contains_key(&id) => {
                Err(PlanningStoreError::ProjectNotFound(id))
            }
            _ => Ok(()),
        }
    }

    /// Tasks matching `predicate`, in insertion order.
    fn ordered_tasks(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        sorted_records(self.tasks.values().filter(|entry| predicate(&entry.record)))
    }

    fn owned_tasks(&self, project_id: ProjectId) -> Vec<Task> {
        self.ordered_tasks(|task| task.project_id() == Some(project_id))
    }

    fn project(&self, id: ProjectId) -> Option<Project> {
        self.projects.get(&id).map(|entry| entry.record.clone())
    }

    fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).map(|entry| entry.record.clone())
    }

    fn project_with_tasks(&self, id: ProjectId) -> Option<ProjectWithTasks> {
        self.project(id)
            .map(|project| ProjectWithTasks::new(project, self.owned_tasks(id)))
    }
}

fn without_project(task: &Task) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: task.id(),
        title: task.title().clone(),
        description: task.description().map(str::to_owned),
        deadline: task.deadline(),
        completed: task.completed(),
        project_id: None,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn sorted_records<'a, T>(entries: impl Iterator<Item = &'a Positioned<T>>) -> Vec<T>
where
    T: Clone + 'a,
{
    let mut ordered: Vec<&Positioned<T>> = entries.collect();
    ordered.sort_by_key(|entry| entry.position);
    ordered.into_iter().map(|entry| entry.record.clone()).collect()
}

/// Previous value of a record touched by a mutating unit of work.
#[derive(Debug)]
enum UndoEntry {
    Project(ProjectId, Option<Positioned<Project>>),
    Task(TaskId, Option<Positioned<Task>>),
}

/// Read-only view over the committed state.
struct ReadView<'a> {
    state: &'a InMemoryPlanningState,
}

/// Mutating session over the committed state with an undo journal.
struct WriteSession<'a> {
    state: &'a mut InMemoryPlanningState,
    next_position: u64,
    journal: Vec<UndoEntry>,
}

impl<'a> WriteSession<'a> {
    const fn new(state: &'a mut InMemoryPlanningState) -> Self {
        let next_position = state.next_position;
        Self {
            state,
            next_position,
            journal: Vec::new(),
        }
    }

    const fn view(&self) -> ReadView<'_> {
        ReadView { state: &*self.state }
    }

    fn remember_project(&mut self, id: ProjectId) {
        let previous = self.state.projects.get(&id).cloned();
        self.journal.push(UndoEntry::Project(id, previous));
    }

    fn remember_task(&mut self, id: TaskId) {
        let previous = self.state.tasks.get(&id).cloned();
        self.journal.push(UndoEntry::Task(id, previous));
    }

    /// Restores every journalled record and the position counter.
    fn roll_back(self) {
        let Self {
            state,
            next_position,
            journal,
        } = self;
        for entry in journal.into_iter().rev() {
            match entry {
                UndoEntry::Project(id, Some(previous)) => {
                    state.projects.insert(id, previous);
                }
                UndoEntry::Project(id, None) => {
                    state.projects.remove(&id);
                }
                UndoEntry::Task(id, Some(previous)) => {
                    state.tasks.insert(id, previous);
                }
                UndoEntry::Task(id, None) => {
                    state.tasks.remove(&id);
                }
            }
        }
        state.next_position = next_position;
    }
}

impl PlanningReader for ReadView<'_> {
    fn find_project(&mut self, id: ProjectId) -> PlanningStoreResult<Option<Project>> {
        Ok(self.state.project(id))
    }

    fn find_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>> {
        Ok(self.state.project_with_tasks(id))
    }

    fn list_projects(&mut self, page: Page) -> PlanningStoreResult<Vec<ProjectWithTasks>> {
        let projects = sorted_records(self.state.projects.values());
        Ok(page
            .apply(projects.into_iter())
            .map(|project| {
                let tasks = self.state.owned_tasks(project.id());
                ProjectWithTasks::new(project, tasks)
            })
            .collect())
    }

    fn find_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>> {
        Ok(self.state.task(id))
    }

    fn list_tasks(&mut self, filter: TaskFilter, page: Page) -> PlanningStoreResult<Vec<Task>> {
        let tasks = self.state.ordered_tasks(|task| match filter {
            TaskFilter::All => true,
            TaskFilter::WithDeadline => task.deadline().is_some(),
        });
        Ok(page.apply(tasks.into_iter()).collect())
    }

    fn list_project_tasks(
        &mut self,
        project_id: ProjectId,
        page: Page,
    ) -> PlanningStoreResult<Vec<Task>> {
        Ok(page
            .apply(self.state.owned_tasks(project_id).into_iter())
            .collect())
    }
}

impl PlanningReader for WriteSession<'_> {
    fn find_project(&mut self, id: ProjectId) -> PlanningStoreResult<Option<Project>> {
        self.view().find_project(id)
    }

    fn find_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>> {
        self.view().find_project_with_tasks(id)
    }

    fn list_projects(&mut self, page: Page) -> PlanningStoreResult<Vec<ProjectWithTasks>> {
        self.view().list_projects(page)
    }

    fn find_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>> {
        self.view().find_task(id)
    }

    fn list_tasks(&mut self, filter: TaskFilter, page: Page) -> PlanningStoreResult<Vec<Task>> {
        self.view().list_tasks(filter, page)
    }

    fn list_project_tasks(
        &mut self,
        project_id: ProjectId,
        page: Page,
    ) -> PlanningStoreResult<Vec<Task>> {
        self.view().list_project_tasks(project_id, page)
    }
}

// The write lock already serializes mutating work, so row locks are no-ops.
impl PlanningSession for WriteSession<'_> {
    fn lock_project(
        &mut self,
        id: ProjectId,
        _lock: RowLock,
    ) -> PlanningStoreResult<Option<Project>> {
        Ok(self.state.project(id))
    }

    fn lock_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>> {
        Ok(self.state.project_with_tasks(id))
    }

    fn lock_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>> {
        Ok(self.state.task(id))
    }

    fn lock_owned_tasks(&mut self, project_id: ProjectId) -> PlanningStoreResult<Vec<Task>> {
        Ok(self.state.owned_tasks(project_id))
    }

    fn insert_project(&mut self, project: &Project) -> PlanningStoreResult<()> {
        if self.state.projects.contains_key(&project.id()) {
            return Err(PlanningStoreError::DuplicateProject(project.id()));
        }
        self.remember_project(project.id());
        let position = self.state.claim_position();
        self.state.projects.insert(
            project.id(),
            Positioned {
                position,
                record: project.clone(),
            },
        );
        Ok(())
    }

    fn update_project(&mut self, project: &Project) -> PlanningStoreResult<()> {
        if !self.state.projects.contains_key(&project.id()) {
            return Err(PlanningStoreError::ProjectNotFound(project.id()));
        }
        self.remember_project(project.id());
        if let Some(entry) = self.state.projects.get_mut(&project.id()) {
            entry.record = project.clone();
        }
        Ok(())
    }

    fn delete_project(&mut self, id: ProjectId) -> PlanningStoreResult<()> {
        if !self.state.projects.contains_key(&id) {
            return Err(PlanningStoreError::ProjectNotFound(id));
        }
        self.remember_project(id);
        self.state.projects.remove(&id);
        // Mirrors the `ON DELETE SET NULL` foreign key of the SQL schema.
        let orphaned: Vec<TaskId> = self
            .state
            .tasks
            .values()
            .filter(|entry| entry.record.project_id() == Some(id))
            .map(|entry| entry.record.id())
            .collect();
        for task_id in orphaned {
            self.remember_task(task_id);
            if let Some(entry) = self.state.tasks.get_mut(&task_id) {
                entry.record = without_project(&entry.record);
            }
        }
        Ok(())
    }

    fn insert_task(&mut self, task: &Task) -> PlanningStoreResult<()> {
        if self.state.tasks.contains_key(&task.id()) {
            return Err(PlanningStoreError::DuplicateTask(task.id()));
        }
        self.state.ensure_project_exists(task.project_id())?;
        self.remember_task(task.id());
        let position = self.state.claim_position();
        self.state.tasks.insert(
            task.id(),
            Positioned {
                position,
                record: task.clone(),
            },
        );
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> PlanningStoreResult<()> {
        self.state.ensure_project_exists(task.project_id())?;
        if !self.state.tasks.contains_key(&task.id()) {
            return Err(PlanningStoreError::TaskNotFound(task.id()));
        }
        self.remember_task(task.id());
        if let Some(entry) = self.state.tasks.get_mut(&task.id()) {
            entry.record = task.clone();
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> PlanningStoreResult<()> {
        if !self.state.tasks.contains_key(&id) {
            return Err(PlanningStoreError::TaskNotFound(id));
        }
        self.remember_task(id);
        self.state.tasks.remove(&id);
        Ok(())
    }
}

fn poisoned<P: std::fmt::Display>(err: &P) -> PlanningStoreError {
    PlanningStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PlanningStore for InMemoryPlanningStore {
    async fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlanningReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlanningStoreError> + Send + 'static,
    {
        let committed = self.state.read().map_err(|err| poisoned(&err))?;
        let mut view = ReadView { state: &*committed };
        work(&mut view)
    }

    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlanningSession) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlanningStoreError> + Send + 'static,
    {
        let mut committed = self.state.write().map_err(|err| poisoned(&err))?;
        let mut session = WriteSession::new(&mut *committed);
        match work(&mut session) {
            Ok(output) => Ok(output),
            Err(err) => {
                session.roll_back();
                Err(err)
            }
        }
    }
}
