//! Route table.

use super::{AppState, meta, projects, tasks};
use crate::planning::ports::PlanningStore;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Prefix under which the resource routes are also mounted.
pub const API_PREFIX: &str = "/api/v1";

/// Builds the application router.
///
/// Resource routes are served both at the root and under [`API_PREFIX`].
#[must_use]
pub fn router<S: PlanningStore + 'static>(state: AppState<S>) -> Router {
    let resources = resource_routes::<S>();
    Router::new()
        .route("/", get(meta::landing_page))
        .route("/health", get(meta::health))
        .merge(resources.clone())
        .nest(API_PREFIX, resources)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn resource_routes<S: PlanningStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/projects",
            get(projects::list_projects::<S>).post(projects::create_project::<S>),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project::<S>)
                .put(projects::update_project::<S>)
                .delete(projects::delete_project::<S>),
        )
        .route("/projects/{id}/tasks", get(projects::list_project_tasks::<S>))
        .route(
            "/tasks",
            get(tasks::list_tasks::<S>).post(tasks::create_task::<S>),
        )
        .route("/tasks/deadlines", get(tasks::list_tasks_with_deadline::<S>))
        .route(
            "/tasks/{id}",
            get(tasks::get_task::<S>)
                .put(tasks::update_task::<S>)
                .delete(tasks::delete_task::<S>),
        )
        .route(
            "/tasks/{id}/link-project/{project_id}",
            post(tasks::link_task_to_project::<S>),
        )
}
