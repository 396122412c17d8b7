//! Application services for project and task orchestration.

mod error;
mod project;
mod task;

pub use error::{EntityKind, PlanningError, PlanningResult};
pub use project::{CreateProjectRequest, ProjectService, UpdateProjectRequest};
pub use task::{CreateTaskRequest, TaskService, UpdateTaskRequest};
