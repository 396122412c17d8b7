//! Shared world state for deadline consistency BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::planning::{
    adapters::memory::InMemoryPlanningStore,
    domain::{Deadline, DeadlineInput, ProjectId, TaskId},
    services::{PlanningError, ProjectService, TaskService},
};

/// Scenario world for deadline consistency behaviour tests.
pub struct DeadlineWorld {
    pub projects: ProjectService<InMemoryPlanningStore, DefaultClock>,
    pub tasks: TaskService<InMemoryPlanningStore, DefaultClock>,
    pub project_id: Option<ProjectId>,
    pub task_id: Option<TaskId>,
    pub last_error: Option<PlanningError>,
}

impl DeadlineWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryPlanningStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
            tasks: TaskService::new(store, clock),
            project_id: None,
            task_id: None,
            last_error: None,
        }
    }

    /// Returns the project created by an earlier step.
    pub fn project_id(&self) -> Result<ProjectId, eyre::Report> {
        self.project_id
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Returns the task created by an earlier step.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.task_id
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for DeadlineWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DeadlineWorld {
    DeadlineWorld::default()
}

/// Parses a deadline written in a feature file.
pub fn parse_deadline(raw: &str) -> Result<Deadline, eyre::Report> {
    let input = DeadlineInput::parse(raw)
        .map_err(|err| eyre::eyre!("invalid deadline in scenario: {err}"))?;
    Ok(Deadline::normalize(input))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
