//! Shared handler state.

use crate::planning::{
    ports::PlanningStore,
    services::{ProjectService, TaskService},
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Services shared by every request handler.
pub struct AppState<S: PlanningStore> {
    projects: ProjectService<S, DefaultClock>,
    tasks: TaskService<S, DefaultClock>,
}

impl<S: PlanningStore> AppState<S> {
    /// Builds both services over one store and the system clock.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        let clock = Arc::new(DefaultClock);
        Self {
            projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
            tasks: TaskService::new(store, clock),
        }
    }

    /// Returns the project service.
    #[must_use]
    pub const fn projects(&self) -> &ProjectService<S, DefaultClock> {
        &self.projects
    }

    /// Returns the task service.
    #[must_use]
    pub const fn tasks(&self) -> &TaskService<S, DefaultClock> {
        &self.tasks
    }
}

impl<S: PlanningStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            projects: self.projects.clone(),
            tasks: self.tasks.clone(),
        }
    }
}
