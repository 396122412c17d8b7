//! `PostgreSQL` planning store.
//!
//! Each unit of work runs inside one database transaction on the blocking
//! thread pool. Read-only work uses a read-only `REPEATABLE READ`
//! transaction and takes no row locks. Mutating work locks the rows whose
//! deadlines it validates, task rows (ordered by id) before project rows,
//! so concurrent writers serialize without deadlocking.

use super::{
    models::{NewProjectRow, NewTaskRow, ProjectChangeset, ProjectRow, TaskChangeset, TaskRow},
    schema::{CREATE_SCHEMA_SQL, projects, tasks},
};
use crate::planning::{
    domain::{
        Deadline, Page, PersistedProjectData, PersistedTaskData, Project, ProjectId,
        ProjectWithTasks, Task, TaskId, Title,
    },
    ports::{
        PlanningReader, PlanningSession, PlanningStore, PlanningStoreError, PlanningStoreResult,
        RowLock, TaskFilter,
    },
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by planning adapters.
pub type PlanningPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed planning store.
#[derive(Debug, Clone)]
pub struct PostgresPlanningStore {
    pool: PlanningPgPool,
}

impl PostgresPlanningStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PlanningPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool for `database_url` and wraps it in a store.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the pool cannot
    /// establish its initial connections.
    pub fn connect(database_url: &str, max_size: u32) -> PlanningStoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(PlanningStoreError::persistence)?;
        Ok(Self::new(pool))
    }

    /// Creates the planning tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningStoreError::Persistence`] when the DDL fails.
    pub async fn ensure_schema(&self) -> PlanningStoreResult<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PlanningStoreError::persistence)?;
            connection
                .batch_execute(CREATE_SCHEMA_SQL)
                .map_err(PlanningStoreError::persistence)
        })
        .await
        .map_err(PlanningStoreError::persistence)?
    }
}

/// Error raised inside a Diesel transaction closure.
enum TransactionError<E> {
    /// The unit of work itself failed.
    Work(E),
    /// Diesel failed to begin, commit or roll back.
    Database(DieselError),
}

impl<E: From<PlanningStoreError>> TransactionError<E> {
    fn into_work_error(self) -> E {
        match self {
            Self::Work(inner) => inner,
            Self::Database(db_err) => E::from(PlanningStoreError::persistence(db_err)),
        }
    }
}

impl<E> From<DieselError> for TransactionError<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

#[async_trait]
impl PlanningStore for PostgresPlanningStore {
    async fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlanningReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlanningStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(PlanningStoreError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .build_transaction()
                .read_only()
                .repeatable_read()
                .run::<T, TransactionError<E>, _>(|tx| {
                    let mut session = PgPlanningSession { connection: tx };
                    work(&mut session).map_err(TransactionError::Work)
                })
                .map_err(TransactionError::into_work_error)
        })
        .await
        .map_err(|err| E::from(PlanningStoreError::persistence(err)))?
    }

    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn PlanningSession) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PlanningStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(PlanningStoreError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TransactionError<E>, _>(|tx| {
                    let mut session = PgPlanningSession { connection: tx };
                    work(&mut session).map_err(TransactionError::Work)
                })
                .map_err(TransactionError::into_work_error)
        })
        .await
        .map_err(|err| E::from(PlanningStoreError::persistence(err)))?
    }
}

/// Session bound to one open transaction.
struct PgPlanningSession<'c> {
    connection: &'c mut PgConnection,
}

impl PgPlanningSession<'_> {
    fn load_owned_tasks(&mut self, project_ids: Vec<Uuid>) -> PlanningStoreResult<Vec<Task>> {
        tasks::table
            .filter(tasks::project_id.eq_any(project_ids))
            .order(tasks::position.asc())
            .select(TaskRow::as_select())
            .load::<TaskRow>(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?
            .into_iter()
            .map(row_to_task)
            .collect()
    }

    fn load_project(
        &mut self,
        id: ProjectId,
        lock: Option<RowLock>,
    ) -> PlanningStoreResult<Option<Project>> {
        let query = projects::table
            .find(id.into_inner())
            .select(ProjectRow::as_select());
        let row = match lock {
            None => query.first::<ProjectRow>(&mut *self.connection),
            Some(RowLock::Share) => query.for_share().first::<ProjectRow>(&mut *self.connection),
            Some(RowLock::Update) => query.for_update().first::<ProjectRow>(&mut *self.connection),
        }
        .optional()
        .map_err(PlanningStoreError::persistence)?;
        row.map(row_to_project).transpose()
    }

    fn load_project_with_tasks(
        &mut self,
        id: ProjectId,
        lock: Option<RowLock>,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>> {
        let Some(project) = self.load_project(id, lock)? else {
            return Ok(None);
        };
        let owned = self.load_owned_tasks(vec![id.into_inner()])?;
        Ok(Some(ProjectWithTasks::new(project, owned)))
    }

    fn load_task(&mut self, id: TaskId, for_update: bool) -> PlanningStoreResult<Option<Task>> {
        let query = tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select());
        let row = if for_update {
            query.for_update().first::<TaskRow>(&mut *self.connection)
        } else {
            query.first::<TaskRow>(&mut *self.connection)
        }
        .optional()
        .map_err(PlanningStoreError::persistence)?;
        row.map(row_to_task).transpose()
    }
}

impl PlanningReader for PgPlanningSession<'_> {
    fn find_project(&mut self, id: ProjectId) -> PlanningStoreResult<Option<Project>> {
        self.load_project(id, None)
    }

    fn find_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>> {
        self.load_project_with_tasks(id, None)
    }

    fn list_projects(&mut self, page: Page) -> PlanningStoreResult<Vec<ProjectWithTasks>> {
        let rows = projects::table
            .order(projects::position.asc())
            .offset(to_sql_count(page.skip()))
            .limit(to_sql_count(page.limit()))
            .select(ProjectRow::as_select())
            .load::<ProjectRow>(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let mut grouped: HashMap<ProjectId, Vec<Task>> = HashMap::new();
        for task in self.load_owned_tasks(ids)? {
            if let Some(project_id) = task.project_id() {
                grouped.entry(project_id).or_default().push(task);
            }
        }

        rows.into_iter()
            .map(|row| {
                let project = row_to_project(row)?;
                let owned = grouped.remove(&project.id()).unwrap_or_default();
                Ok(ProjectWithTasks::new(project, owned))
            })
            .collect()
    }

    fn find_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>> {
        self.load_task(id, false)
    }

    fn list_tasks(&mut self, filter: TaskFilter, page: Page) -> PlanningStoreResult<Vec<Task>> {
        let mut query = tasks::table
            .order(tasks::position.asc())
            .select(TaskRow::as_select())
            .into_boxed();
        if filter == TaskFilter::WithDeadline {
            query = query.filter(tasks::deadline.is_not_null());
        }
        query
            .offset(to_sql_count(page.skip()))
            .limit(to_sql_count(page.limit()))
            .load::<TaskRow>(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?
            .into_iter()
            .map(row_to_task)
            .collect()
    }

    fn list_project_tasks(
        &mut self,
        project_id: ProjectId,
        page: Page,
    ) -> PlanningStoreResult<Vec<Task>> {
        tasks::table
            .filter(tasks::project_id.eq(project_id.into_inner()))
            .order(tasks::position.asc())
            .offset(to_sql_count(page.skip()))
            .limit(to_sql_count(page.limit()))
            .select(TaskRow::as_select())
            .load::<TaskRow>(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?
            .into_iter()
            .map(row_to_task)
            .collect()
    }
}

impl PlanningSession for PgPlanningSession<'_> {
    fn lock_project(
        &mut self,
        id: ProjectId,
        lock: RowLock,
    ) -> PlanningStoreResult<Option<Project>> {
        self.load_project(id, Some(lock))
    }

    fn lock_project_with_tasks(
        &mut self,
        id: ProjectId,
    ) -> PlanningStoreResult<Option<ProjectWithTasks>> {
        self.load_project_with_tasks(id, Some(RowLock::Update))
    }

    fn lock_task(&mut self, id: TaskId) -> PlanningStoreResult<Option<Task>> {
        self.load_task(id, true)
    }

    fn lock_owned_tasks(&mut self, project_id: ProjectId) -> PlanningStoreResult<Vec<Task>> {
        let project_uuid = project_id.into_inner();
        tasks::table
            .filter(tasks::project_id.eq(project_uuid))
            .order(tasks::id.asc())
            .select(tasks::id)
            .for_update()
            .load::<Uuid>(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?;
        self.load_owned_tasks(vec![project_uuid])
    }

    fn insert_project(&mut self, project: &Project) -> PlanningStoreResult<()> {
        let project_id = project.id();
        diesel::insert_into(projects::table)
            .values(&to_new_project_row(project))
            .execute(&mut *self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    PlanningStoreError::DuplicateProject(project_id)
                }
                _ => PlanningStoreError::persistence(err),
            })?;
        Ok(())
    }

    fn update_project(&mut self, project: &Project) -> PlanningStoreResult<()> {
        let changeset = ProjectChangeset {
            title: project.title().as_str().to_owned(),
            deadline: project.deadline().as_naive_utc(),
            updated_at: project.updated_at(),
        };
        let affected = diesel::update(projects::table.find(project.id().into_inner()))
            .set(&changeset)
            .execute(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?;
        if affected == 0 {
            return Err(PlanningStoreError::ProjectNotFound(project.id()));
        }
        Ok(())
    }

    fn delete_project(&mut self, id: ProjectId) -> PlanningStoreResult<()> {
        diesel::update(tasks::table.filter(tasks::project_id.eq(id.into_inner())))
            .set(tasks::project_id.eq(None::<Uuid>))
            .execute(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?;
        let affected = diesel::delete(projects::table.find(id.into_inner()))
            .execute(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?;
        if affected == 0 {
            return Err(PlanningStoreError::ProjectNotFound(id));
        }
        Ok(())
    }

    fn insert_task(&mut self, task: &Task) -> PlanningStoreResult<()> {
        diesel::insert_into(tasks::table)
            .values(&to_new_task_row(task))
            .execute(&mut *self.connection)
            .map_err(|err| map_task_write_error(err, task))?;
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> PlanningStoreResult<()> {
        let changeset = TaskChangeset {
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            deadline: task.deadline().map(Deadline::as_naive_utc),
            completed: task.completed(),
            project_id: task.project_id().map(ProjectId::into_inner),
            updated_at: task.updated_at(),
        };
        let affected = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(&changeset)
            .execute(&mut *self.connection)
            .map_err(|err| map_task_write_error(err, task))?;
        if affected == 0 {
            return Err(PlanningStoreError::TaskNotFound(task.id()));
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> PlanningStoreResult<()> {
        let affected = diesel::delete(tasks::table.find(id.into_inner()))
            .execute(&mut *self.connection)
            .map_err(PlanningStoreError::persistence)?;
        if affected == 0 {
            return Err(PlanningStoreError::TaskNotFound(id));
        }
        Ok(())
    }
}

fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_task_write_error(err: DieselError, task: &Task) -> PlanningStoreError {
    match (&err, task.project_id()) {
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), _) => {
            PlanningStoreError::DuplicateTask(task.id())
        }
        (DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _), Some(id)) => {
            PlanningStoreError::ProjectNotFound(id)
        }
        _ => PlanningStoreError::persistence(err),
    }
}

fn to_new_project_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        title: project.title().as_str().to_owned(),
        deadline: project.deadline().as_naive_utc(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn to_new_task_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        deadline: task.deadline().map(Deadline::as_naive_utc),
        completed: task.completed(),
        project_id: task.project_id().map(ProjectId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> PlanningStoreResult<Project> {
    let ProjectRow {
        id,
        title,
        deadline,
        created_at,
        updated_at,
    } = row;

    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(id),
        title: Title::new(title).map_err(PlanningStoreError::persistence)?,
        deadline: Deadline::from_naive_utc(deadline),
        created_at,
        updated_at,
    }))
}

fn row_to_task(row: TaskRow) -> PlanningStoreResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        deadline,
        completed,
        project_id,
        created_at,
        updated_at,
    } = row;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        title: Title::new(title).map_err(PlanningStoreError::persistence)?,
        description,
        deadline: deadline.map(Deadline::from_naive_utc),
        completed,
        project_id: project_id.map(ProjectId::from_uuid),
        created_at,
        updated_at,
    }))
}
