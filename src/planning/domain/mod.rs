//! Domain model for project and task planning.
//!
//! The planning domain models projects, the tasks they own and the deadline
//! consistency rule binding the two, while keeping all infrastructure
//! concerns outside of the domain boundary.

mod consistency;
mod deadline;
mod error;
mod ids;
mod page;
mod project;
mod task;
mod title;

pub use consistency::{DeadlineViolation, check_deadline_consistency};
pub use deadline::{Deadline, DeadlineInput};
pub use error::PlanningDomainError;
pub use ids::{ProjectId, TaskId};
pub use page::Page;
pub use project::{PersistedProjectData, Project, ProjectChanges, ProjectWithTasks};
pub use task::{NewTask, PersistedTaskData, Task, TaskChanges};
pub use title::Title;
