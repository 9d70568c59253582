//! Given steps for task state transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskdeck::task::{domain::TaskDraft, services::TransitionTaskRequest};

#[given(r#"a task titled "{title}""#)]
fn task_titled(world: &mut TaskTransitionWorld, title: String) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create(TaskDraft::new(title)))
        .wrap_err("create task for transition scenario")?;
    world.last_task = Some(created);
    Ok(())
}

#[given(r#"the task has been transitioned to "{target_status}""#)]
fn task_has_been_transitioned(
    world: &mut TaskTransitionWorld,
    target_status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();

    let transitioned = run_async(
        world
            .service
            .transition_task(TransitionTaskRequest::new(task_id, target_status)),
    )
    .wrap_err("transition task in scenario setup")?;

    world.last_task = Some(transitioned);
    Ok(())
}
