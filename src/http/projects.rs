//! Project route handlers.

use super::{
    ApiError, AppState,
    dto::{PageQuery, ProjectCreatePayload, ProjectResponse, ProjectUpdatePayload, TaskResponse},
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::planning::{domain::ProjectId, ports::PlanningStore};
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

pub(super) async fn list_projects<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = state.projects().list(query.into()).await?;
    Ok(Json(projects.iter().map(ProjectResponse::from).collect()))
}

pub(super) async fn create_project<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiJson(payload): ApiJson<ProjectCreatePayload>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let project = state.projects().create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

pub(super) async fn get_project<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state.projects().get(ProjectId::from_uuid(id)).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

pub(super) async fn update_project<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ProjectUpdatePayload>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state
        .projects()
        .update(ProjectId::from_uuid(id), payload.into())
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}

pub(super) async fn delete_project<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.projects().delete(ProjectId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_project_tasks<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state
        .projects()
        .list_tasks_of(ProjectId::from_uuid(id), query.into())
        .await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}
