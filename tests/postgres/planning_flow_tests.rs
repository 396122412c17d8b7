//! Service-level deadline rules running against the `PostgreSQL` store.

use crate::postgres::helpers::{BoxError, PreparedStore, january, prepared_store};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Uuid as SqlUuid};
use rstest::rstest;
use taskboard::planning::{
    domain::{DeadlineViolation, ProjectId, TaskId},
    services::{
        CreateProjectRequest, CreateTaskRequest, PlanningError, UpdateProjectRequest,
        UpdateTaskRequest,
    },
};

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

async fn project_due(prepared: &PreparedStore, day: u32) -> Result<ProjectId, BoxError> {
    let created = prepared
        .projects()
        .create(CreateProjectRequest::new("Launch", january(day)))
        .await?;
    Ok(created.project().id())
}

async fn task_due(
    prepared: &PreparedStore,
    day: u32,
    project_id: Option<ProjectId>,
) -> Result<TaskId, BoxError> {
    let mut request = CreateTaskRequest::new("Write docs").with_deadline(january(day));
    if let Some(id) = project_id {
        request = request.with_project(id);
    }
    Ok(prepared.tasks().create(request).await?.id())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reschedule_before_an_owned_task_is_rejected() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    let project_id = project_due(&prepared, 20).await?;
    let task_id = task_due(&prepared, 15, Some(project_id)).await?;

    let result = prepared
        .projects()
        .update(project_id, UpdateProjectRequest::new().with_deadline(january(10)))
        .await;

    let violation = match result {
        Err(PlanningError::Deadline(violation)) => violation,
        other => return Err(format!("expected a deadline violation, got {other:?}").into()),
    };
    assert_eq!(violation, DeadlineViolation::Contextual(task_id));
    assert_eq!(
        violation.to_string(),
        format!("Task '{task_id}' has a deadline later than the project deadline.")
    );
    let stored = prepared.projects().get(project_id).await?;
    assert_eq!(stored.project().deadline(), january(20));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_past_the_project_deadline_is_rejected() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    let project_id = project_due(&prepared, 10).await?;
    let task_id = task_due(&prepared, 15, None).await?;

    let result = prepared.tasks().link_to_project(task_id, project_id).await;

    let violation = match result {
        Err(PlanningError::Deadline(violation)) => violation,
        other => return Err(format!("expected a deadline violation, got {other:?}").into()),
    };
    assert_eq!(
        violation.to_string(),
        "Task deadline cannot be later than project deadline."
    );
    let stored = prepared.tasks().get(task_id).await?;
    assert_eq!(stored.project_id(), None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_past_the_project_deadline_is_rejected() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    let project_id = project_due(&prepared, 10).await?;

    let result = task_due(&prepared, 11, Some(project_id)).await;

    assert!(result.is_err());
    let owned = prepared.projects().get(project_id).await?;
    assert!(owned.tasks().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_unlinks_its_tasks() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    let project_id = project_due(&prepared, 20).await?;
    let first = task_due(&prepared, 5, Some(project_id)).await?;
    let second = task_due(&prepared, 6, Some(project_id)).await?;

    prepared.projects().delete(project_id).await?;

    for task_id in [first, second] {
        let stored = prepared.tasks().get(task_id).await?;
        assert_eq!(stored.project_id(), None);
    }
    let missing = prepared.projects().get(project_id).await;
    assert!(matches!(missing, Err(PlanningError::NotFound { .. })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clearing_optional_fields_writes_null() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };
    let created = prepared
        .tasks()
        .create(
            CreateTaskRequest::new("Write docs")
                .with_description("First draft")
                .with_deadline(january(5)),
        )
        .await?;
    let task_id = created.id();

    let updated = prepared
        .tasks()
        .update(
            task_id,
            UpdateTaskRequest::new().clear_description().clear_deadline(),
        )
        .await?;

    assert_eq!(updated.description(), None);
    assert_eq!(updated.deadline(), None);
    let mut conn = prepared.raw_connection()?;
    let nulls = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM tasks \
         WHERE id = $1 AND description IS NULL AND deadline IS NULL",
    )
    .bind::<SqlUuid, _>(task_id.into_inner())
    .get_result::<Count>(&mut conn)?;
    assert_eq!(nulls.count, 1);
    Ok(())
}
