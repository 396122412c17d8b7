//! Request and response bodies.
//!
//! Request payloads convert into service requests; responses are built from
//! domain values. Deadlines are accepted as any [`DeadlineInput`] text and
//! always emitted as naive UTC.

use crate::planning::{
    domain::{Deadline, DeadlineInput, Page, ProjectId, ProjectWithTasks, Task},
    services::{CreateProjectRequest, CreateTaskRequest, UpdateProjectRequest, UpdateTaskRequest},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Body of `POST /projects`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreatePayload {
    /// Project title.
    pub title: String,
    /// Project deadline.
    pub deadline: DeadlineInput,
}

impl From<ProjectCreatePayload> for CreateProjectRequest {
    fn from(payload: ProjectCreatePayload) -> Self {
        Self::new(payload.title, payload.deadline)
    }
}

/// Body of `PUT /projects/{id}`.
///
/// A `null` field is treated the same as an absent one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdatePayload {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement deadline.
    #[serde(default)]
    pub deadline: Option<DeadlineInput>,
}

impl From<ProjectUpdatePayload> for UpdateProjectRequest {
    fn from(payload: ProjectUpdatePayload) -> Self {
        let mut request = Self::new();
        if let Some(title) = payload.title {
            request = request.with_title(title);
        }
        if let Some(deadline) = payload.deadline {
            request = request.with_deadline(deadline);
        }
        request
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreatePayload {
    /// Task title.
    pub title: String,
    /// Optional free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional deadline.
    #[serde(default)]
    pub deadline: Option<DeadlineInput>,
    /// Initial completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Owning project.
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

impl From<TaskCreatePayload> for CreateTaskRequest {
    fn from(payload: TaskCreatePayload) -> Self {
        let mut request = Self::new(payload.title).with_completed(payload.completed);
        if let Some(description) = payload.description {
            request = request.with_description(description);
        }
        if let Some(deadline) = payload.deadline {
            request = request.with_deadline(deadline);
        }
        if let Some(project_id) = payload.project_id {
            request = request.with_project(ProjectId::from_uuid(project_id));
        }
        request
    }
}

/// Body of `PUT /tasks/{id}`.
///
/// Nullable fields distinguish absent (unchanged) from `null` (cleared).
/// `title` and `completed` cannot be cleared, so `null` leaves them as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdatePayload {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement or cleared description.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// Replacement or cleared deadline.
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<DeadlineInput>>,
    /// Replacement completion flag.
    #[serde(default)]
    pub completed: Option<bool>,
    /// New owning project, or `null` to detach.
    #[serde(default, deserialize_with = "present")]
    pub project_id: Option<Option<Uuid>>,
}

/// Marks a field that appeared in the body, even as `null`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<TaskUpdatePayload> for UpdateTaskRequest {
    fn from(payload: TaskUpdatePayload) -> Self {
        let mut request = Self::new();
        if let Some(title) = payload.title {
            request = request.with_title(title);
        }
        match payload.description {
            Some(Some(description)) => request = request.with_description(description),
            Some(None) => request = request.clear_description(),
            None => {}
        }
        match payload.deadline {
            Some(Some(deadline)) => request = request.with_deadline(deadline),
            Some(None) => request = request.clear_deadline(),
            None => {}
        }
        if let Some(completed) = payload.completed {
            request = request.with_completed(completed);
        }
        match payload.project_id {
            Some(Some(project_id)) => {
                request = request.with_project(ProjectId::from_uuid(project_id));
            }
            Some(None) => request = request.clear_project(),
            None => {}
        }
        request
    }
}

/// `skip`/`limit` query parameters of list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// Number of leading records to skip.
    #[serde(default = "default_skip")]
    pub skip: u64,
    /// Maximum number of records returned.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_skip() -> u64 {
    Page::DEFAULT_SKIP
}

const fn default_limit() -> u64 {
    Page::DEFAULT_LIMIT
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        Self::new(query.skip, query.limit)
    }
}

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Deadline in naive UTC.
    pub deadline: Option<Deadline>,
    /// Completion flag.
    pub completed: bool,
    /// Owning project.
    pub project_id: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            deadline: task.deadline(),
            completed: task.completed(),
            project_id: task.project_id().map(ProjectId::into_inner),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// A project, with its tasks, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    /// Project identifier.
    pub id: Uuid,
    /// Project title.
    pub title: String,
    /// Deadline in naive UTC.
    pub deadline: Deadline,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Tasks owned by the project, in insertion order.
    pub tasks: Vec<TaskResponse>,
}

impl From<&ProjectWithTasks> for ProjectResponse {
    fn from(aggregate: &ProjectWithTasks) -> Self {
        let project = aggregate.project();
        Self {
            id: project.id().into_inner(),
            title: project.title().as_str().to_owned(),
            deadline: project.deadline(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
            tasks: aggregate.tasks().iter().map(TaskResponse::from).collect(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"` while the process serves requests.
    pub status: String,
}
