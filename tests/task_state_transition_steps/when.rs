//! When steps for task state transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use rstest_bdd_macros::when;
use taskdeck::task::services::TransitionTaskRequest;

#[when(r#"the task is transitioned to "{target_status}""#)]
fn transition_task(
    world: &mut TaskTransitionWorld,
    target_status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();

    let result = run_async(
        world
            .service
            .transition_task(TransitionTaskRequest::new(task_id, target_status)),
    );
    if let Ok(ref updated) = result {
        world.last_task = Some(updated.clone());
    }
    world.last_transition_result = Some(result);
    Ok(())
}
