//! Concurrent units of work against the `PostgreSQL` store.
//!
//! Mutations lock task rows before project rows, so racing writers
//! serialize instead of deadlocking and the deadline rule holds after
//! every interleaving.

use crate::postgres::helpers::{BoxError, PreparedStore, january, prepared_store};
use rstest::rstest;
use taskboard::planning::{
    domain::{ProjectId, Task, TaskId},
    services::{
        CreateProjectRequest, CreateTaskRequest, PlanningError, UpdateProjectRequest,
        UpdateTaskRequest,
    },
};
use tokio::task::JoinSet;

const ROUNDS: usize = 5;
const TASKS_PER_PROJECT: usize = 4;

async fn project_with_tasks(
    prepared: &PreparedStore,
) -> Result<(ProjectId, Vec<TaskId>), BoxError> {
    let project_id = prepared
        .projects()
        .create(CreateProjectRequest::new("Launch", january(20)))
        .await?
        .project()
        .id();
    let mut task_ids = Vec::with_capacity(TASKS_PER_PROJECT);
    for _ in 0..TASKS_PER_PROJECT {
        let task = prepared
            .tasks()
            .create(
                CreateTaskRequest::new("Write docs")
                    .with_deadline(january(5))
                    .with_project(project_id),
            )
            .await?;
        task_ids.push(task.id());
    }
    Ok((project_id, task_ids))
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn project_delete_racing_task_updates_never_deadlocks() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };

    for _ in 0..ROUNDS {
        let (project_id, task_ids) = project_with_tasks(&prepared).await?;
        let mut updates = JoinSet::new();
        for task_id in task_ids.iter().copied() {
            let tasks = prepared.tasks();
            updates.spawn(async move {
                tasks
                    .update(task_id, UpdateTaskRequest::new().with_completed(true))
                    .await
            });
        }
        let projects = prepared.projects();
        let deleted = tokio::spawn(async move { projects.delete(project_id).await });

        while let Some(joined) = updates.join_next().await {
            let updated = joined?;
            assert!(
                !matches!(updated, Err(PlanningError::Store(_))),
                "task update failed in the store: {updated:?}"
            );
        }
        deleted.await??;

        for task_id in task_ids {
            let stored = prepared.tasks().get(task_id).await?;
            assert_eq!(stored.project_id(), None);
            assert!(stored.completed());
        }
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reschedule_racing_task_creation_keeps_deadlines_consistent() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store().await? else {
        return Ok(());
    };

    for _ in 0..ROUNDS {
        let project_id = prepared
            .projects()
            .create(CreateProjectRequest::new("Launch", january(20)))
            .await?
            .project()
            .id();
        let projects = prepared.projects();
        let tasks = prepared.tasks();
        let reschedule = tokio::spawn(async move {
            projects
                .update(project_id, UpdateProjectRequest::new().with_deadline(january(10)))
                .await
        });
        let create = tokio::spawn(async move {
            tasks
                .create(
                    CreateTaskRequest::new("Write docs")
                        .with_deadline(january(15))
                        .with_project(project_id),
                )
                .await
        });
        let rescheduled = reschedule.await?;
        let created = create.await?;

        assert!(
            !matches!(rescheduled, Err(PlanningError::Store(_))),
            "reschedule failed in the store: {rescheduled:?}"
        );
        assert!(
            !matches!(created, Err(PlanningError::Store(_))),
            "task creation failed in the store: {created:?}"
        );
        assert_ne!(rescheduled.is_ok(), created.is_ok());
        let stored = prepared.projects().get(project_id).await?;
        let project_deadline = stored.project().deadline();
        assert!(
            stored
                .tasks()
                .iter()
                .filter_map(Task::deadline)
                .all(|due| due <= project_deadline)
        );
    }
    Ok(())
}
