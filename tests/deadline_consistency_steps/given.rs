//! Given steps for deadline consistency BDD scenarios.

use super::world::{DeadlineWorld, parse_deadline, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::planning::services::{CreateProjectRequest, CreateTaskRequest};

#[given(r#"a project "{title}" due "{deadline}""#)]
fn project_due(
    world: &mut DeadlineWorld,
    title: String,
    deadline: String,
) -> Result<(), eyre::Report> {
    let request = CreateProjectRequest::new(title, parse_deadline(&deadline)?);
    let created = run_async(world.projects.create(request)).wrap_err("create project")?;
    world.project_id = Some(created.project().id());
    Ok(())
}

#[given(r#"an existing task "{title}" due "{deadline}" in the project"#)]
fn existing_task_in_project(
    world: &mut DeadlineWorld,
    title: String,
    deadline: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title)
        .with_deadline(parse_deadline(&deadline)?)
        .with_project(world.project_id()?);
    let created = run_async(world.tasks.create(request)).wrap_err("create owned task")?;
    world.task_id = Some(created.id());
    Ok(())
}

#[given(r#"a standalone task "{title}" due "{deadline}""#)]
fn standalone_task(
    world: &mut DeadlineWorld,
    title: String,
    deadline: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title).with_deadline(parse_deadline(&deadline)?);
    let created = run_async(world.tasks.create(request)).wrap_err("create standalone task")?;
    world.task_id = Some(created.id());
    Ok(())
}
