//! Invariant checks under concurrent writers against one store.

use super::helpers::{Services, january, services};
use eyre::WrapErr;
use rstest::rstest;
use taskboard::planning::services::{CreateProjectRequest, CreateTaskRequest, UpdateProjectRequest};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reschedule_never_strands_a_late_task(
    services: Services,
) -> Result<(), eyre::Report> {
    let project_id = services
        .projects
        .create(CreateProjectRequest::new("Contended", january(31)?))
        .await
        .wrap_err("create project")?
        .project()
        .id();

    let mut handles = Vec::new();
    for day in 1..=30 {
        let tasks = services.tasks.clone();
        let deadline = january(day)?;
        handles.push(tokio::spawn(async move {
            tasks
                .create(
                    CreateTaskRequest::new(format!("task {day}"))
                        .with_deadline(deadline)
                        .with_project(project_id),
                )
                .await
                .map(|_| ())
        }));
    }
    let projects = services.projects.clone();
    let reschedule = tokio::spawn(async move {
        projects
            .update(
                project_id,
                UpdateProjectRequest::new().with_deadline(january(15)?),
            )
            .await
            .map(|_| ())
            .map_err(eyre::Report::from)
    });

    // Individual writes may lose the race; tasks due by the 15th never can.
    let mut created = 0;
    for handle in handles {
        if handle.await.wrap_err("join task creation")?.is_ok() {
            created += 1;
        }
    }
    eyre::ensure!(created >= 15, "only {created} task creations succeeded");
    let rescheduled = reschedule.await.wrap_err("join reschedule")?.is_ok();

    let project = services
        .projects
        .get(project_id)
        .await
        .wrap_err("fetch project")?;
    let limit = project.project().deadline();
    eyre::ensure!(
        !rescheduled || limit == january(15)?,
        "a successful reschedule must be persisted"
    );
    eyre::ensure!(
        project
            .tasks()
            .iter()
            .all(|task| task.deadline().is_none_or(|deadline| deadline <= limit)),
        "every owned task must be due no later than the project"
    );
    Ok(())
}
