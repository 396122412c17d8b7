//! Task route handlers.

use super::{
    ApiError, AppState,
    dto::{PageQuery, TaskCreatePayload, TaskResponse, TaskUpdatePayload},
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::planning::{
    domain::{ProjectId, Task, TaskId},
    ports::PlanningStore,
};
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

fn to_responses(tasks: &[Task]) -> Json<Vec<TaskResponse>> {
    Json(tasks.iter().map(TaskResponse::from).collect())
}

pub(super) async fn list_tasks<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.tasks().list(query.into()).await?;
    Ok(to_responses(&tasks))
}

pub(super) async fn list_tasks_with_deadline<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.tasks().list_with_deadline(query.into()).await?;
    Ok(to_responses(&tasks))
}

pub(super) async fn create_task<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiJson(payload): ApiJson<TaskCreatePayload>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = state.tasks().create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

pub(super) async fn get_task<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks().get(TaskId::from_uuid(id)).await?;
    Ok(Json(TaskResponse::from(&task)))
}

pub(super) async fn update_task<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TaskUpdatePayload>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .tasks()
        .update(TaskId::from_uuid(id), payload.into())
        .await?;
    Ok(Json(TaskResponse::from(&task)))
}

pub(super) async fn delete_task<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.tasks().delete(TaskId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn link_task_to_project<S: PlanningStore + 'static>(
    State(state): State<AppState<S>>,
    ApiPath((task_id, project_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .tasks()
        .link_to_project(TaskId::from_uuid(task_id), ProjectId::from_uuid(project_id))
        .await?;
    Ok(Json(TaskResponse::from(&task)))
}
