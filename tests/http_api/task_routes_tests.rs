//! Tests for the `/tasks` endpoints.

use super::helpers::{app, create_project, create_task, send, text};
use axum::{
    Router,
    http::{Method, StatusCode},
};
use rstest::rstest;
use serde_json::json;

const GENERIC_VIOLATION: &str = "Task deadline cannot be later than project deadline.";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_standalone_task_with_defaults(app: Router) -> Result<(), eyre::Report> {
    let payload = json!({ "title": "Solo" });
    let (status, body) = send(&app, Method::POST, "/tasks", Some(payload)).await?;

    eyre::ensure!(status == StatusCode::CREATED, "unexpected status {status}");
    eyre::ensure!(body["completed"] == json!(false), "body {body}");
    eyre::ensure!(body["deadline"].is_null(), "body {body}");
    eyre::ensure!(body["description"].is_null(), "body {body}");
    eyre::ensure!(body["project_id"].is_null(), "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_under_missing_project_is_not_found(app: Router) -> Result<(), eyre::Report> {
    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({
            "title": "Lost",
            "deadline": "2999-01-01T00:00:00",
            "project_id": uuid::Uuid::new_v4(),
        })),
    )
    .await?;

    eyre::ensure!(status == StatusCode::NOT_FOUND, "unexpected status {status}");
    eyre::ensure!(body == json!({ "detail": "Project not found" }), "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_after_project_deadline_is_bad_request(app: Router) -> Result<(), eyre::Report> {
    let project_id = create_project(&app, "P", "2030-01-10T00:00:00").await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({
            "title": "Late",
            "deadline": "2030-01-10T00:00:01",
            "project_id": project_id,
        })),
    )
    .await?;

    eyre::ensure!(status == StatusCode::BAD_REQUEST, "unexpected status {status}");
    eyre::ensure!(text(&body, "detail")? == GENERIC_VIOLATION, "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_at_project_deadline_is_accepted(app: Router) -> Result<(), eyre::Report> {
    let project_id = create_project(&app, "P", "2030-01-10T00:00:00").await?;

    // Same instant written with an offset.
    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({
            "title": "On time",
            "deadline": "2030-01-10T05:30:00+05:30",
            "project_id": project_id,
        })),
    )
    .await?;

    eyre::ensure!(status == StatusCode::CREATED, "unexpected status {status}");
    eyre::ensure!(text(&body, "deadline")? == "2030-01-10T00:00:00", "body {body}");
    eyre::ensure!(text(&body, "project_id")? == project_id, "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_distinguishes_null_from_absent(app: Router) -> Result<(), eyre::Report> {
    let task_id = create_task(
        &app,
        json!({
            "title": "Draft",
            "description": "notes",
            "deadline": "2030-01-05T00:00:00",
        }),
    )
    .await?;
    let uri = format!("/tasks/{task_id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "description": null, "completed": true })),
    )
    .await?;

    eyre::ensure!(status == StatusCode::OK, "unexpected status {status}");
    eyre::ensure!(body["description"].is_null(), "description should clear: {body}");
    eyre::ensure!(text(&body, "deadline")? == "2030-01-05T00:00:00", "body {body}");
    eyre::ensure!(body["completed"] == json!(true), "body {body}");
    eyre::ensure!(text(&body, "title")? == "Draft", "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_checks_merged_values(app: Router) -> Result<(), eyre::Report> {
    let project_id = create_project(&app, "P", "2030-01-10T00:00:00").await?;
    let task_id = create_task(&app, json!({ "title": "T", "project_id": project_id })).await?;
    let uri = format!("/tasks/{task_id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "deadline": "2030-02-01T00:00:00" })),
    )
    .await?;
    eyre::ensure!(status == StatusCode::BAD_REQUEST, "unexpected status {status}");
    eyre::ensure!(text(&body, "detail")? == GENERIC_VIOLATION, "body {body}");

    let (detach_status, detached) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "deadline": "2030-02-01T00:00:00", "project_id": null })),
    )
    .await?;
    eyre::ensure!(
        detach_status == StatusCode::OK,
        "detaching should lift the check: {detach_status}"
    );
    eyre::ensure!(detached["project_id"].is_null(), "body {detached}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_to_missing_project_is_not_found(app: Router) -> Result<(), eyre::Report> {
    let task_id = create_task(&app, json!({ "title": "T" })).await?;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/tasks/{task_id}"),
        Some(json!({ "project_id": uuid::Uuid::new_v4() })),
    )
    .await?;

    eyre::ensure!(status == StatusCode::NOT_FOUND, "unexpected status {status}");
    eyre::ensure!(body == json!({ "detail": "Project not found" }), "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_rejects_late_task_and_keeps_it_standalone(
    app: Router,
) -> Result<(), eyre::Report> {
    let task_id = create_task(
        &app,
        json!({ "title": "T", "deadline": "2030-01-07T00:00:00" }),
    )
    .await?;
    let project_id = create_project(&app, "P", "2030-01-05T00:00:00").await?;

    let link = format!("/tasks/{task_id}/link-project/{project_id}");
    let (status, body) = send(&app, Method::POST, &link, None).await?;
    eyre::ensure!(status == StatusCode::BAD_REQUEST, "unexpected status {status}");
    eyre::ensure!(text(&body, "detail")? == GENERIC_VIOLATION, "body {body}");

    let (_, task) = send(&app, Method::GET, &format!("/tasks/{task_id}"), None).await?;
    eyre::ensure!(task["project_id"].is_null(), "task should stay standalone: {task}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_places_task_under_project(app: Router) -> Result<(), eyre::Report> {
    let task_id = create_task(&app, json!({ "title": "T" })).await?;
    let project_id = create_project(&app, "P", "2030-01-05T00:00:00").await?;

    let link = format!("/tasks/{task_id}/link-project/{project_id}");
    let (status, body) = send(&app, Method::POST, &link, None).await?;

    eyre::ensure!(status == StatusCode::OK, "unexpected status {status}");
    eyre::ensure!(text(&body, "project_id")? == project_id, "body {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_reports_missing_task_first(app: Router) -> Result<(), eyre::Report> {
    let project_id = uuid::Uuid::new_v4();
    let missing_task = format!("/tasks/{}/link-project/{project_id}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::POST, &missing_task, None).await?;
    eyre::ensure!(status == StatusCode::NOT_FOUND, "unexpected status {status}");
    eyre::ensure!(body == json!({ "detail": "Task not found" }), "body {body}");

    let task_id = create_task(&app, json!({ "title": "T" })).await?;
    let missing_project = format!("/tasks/{task_id}/link-project/{project_id}");
    let (project_status, project_body) = send(&app, Method::POST, &missing_project, None).await?;
    eyre::ensure!(
        project_status == StatusCode::NOT_FOUND,
        "unexpected status {project_status}"
    );
    eyre::ensure!(
        project_body == json!({ "detail": "Project not found" }),
        "body {project_body}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_then_lookup_is_not_found(app: Router) -> Result<(), eyre::Report> {
    let task_id = create_task(&app, json!({ "title": "T" })).await?;
    let uri = format!("/tasks/{task_id}");

    let (deleted, _) = send(&app, Method::DELETE, &uri, None).await?;
    eyre::ensure!(deleted == StatusCode::NO_CONTENT, "unexpected status {deleted}");

    for method in [Method::GET, Method::DELETE, Method::PUT] {
        let body = (method == Method::PUT).then(|| json!({ "completed": true }));
        let (status, reply) = send(&app, method, &uri, body).await?;
        eyre::ensure!(status == StatusCode::NOT_FOUND, "unexpected status {status}");
        eyre::ensure!(reply == json!({ "detail": "Task not found" }), "body {reply}");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deadlines_endpoint_lists_only_dated_tasks(app: Router) -> Result<(), eyre::Report> {
    create_task(&app, json!({ "title": "Undated" })).await?;
    create_task(&app, json!({ "title": "Dated", "deadline": "2030-01-01" })).await?;

    let (status, body) = send(&app, Method::GET, "/tasks/deadlines", None).await?;
    eyre::ensure!(status == StatusCode::OK, "unexpected status {status}");
    let titles: Vec<&str> = body
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["title"].as_str()).collect())
        .unwrap_or_default();
    eyre::ensure!(titles == vec!["Dated"], "unexpected listing {body}");

    let (_, all) = send(&app, Method::GET, "/tasks?limit=1", None).await?;
    let count = all.as_array().map_or(0, Vec::len);
    eyre::ensure!(count == 1, "limit should cap the listing: {all}");
    Ok(())
}
