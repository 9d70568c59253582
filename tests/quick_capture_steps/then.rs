//! Then steps for quick-capture BDD scenarios.

use super::world::QuickCaptureWorld;
use rstest_bdd_macros::then;
use taskdeck::task::{
    domain::{Priority, TaskDomainError},
    services::TaskLifecycleError,
};

#[then(r#"the captured task title is "{title}""#)]
fn captured_title_is(world: &QuickCaptureWorld, title: String) -> Result<(), eyre::Report> {
    let task = world.captured()?;
    eyre::ensure!(
        task.title() == title,
        "expected title {title:?}, found {:?}",
        task.title()
    );
    Ok(())
}

#[then(r#"the captured task priority is "{priority}""#)]
fn captured_priority_is(world: &QuickCaptureWorld, priority: String) -> Result<(), eyre::Report> {
    let expected = Priority::try_from(priority.as_str())?;
    let task = world.captured()?;
    eyre::ensure!(
        task.priority() == expected,
        "expected priority {expected}, found {}",
        task.priority()
    );
    Ok(())
}

#[then(r#"the captured task tags are "{tags}""#)]
fn captured_tags_are(world: &QuickCaptureWorld, tags: String) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = tags.split(',').map(str::trim).collect();
    let task = world.captured()?;
    let found: Vec<&str> = task.tags().iter().map(String::as_str).collect();
    eyre::ensure!(found == expected, "expected tags {expected:?}, found {found:?}");
    Ok(())
}

#[then(r#"the captured task project is "{project}""#)]
fn captured_project_is(world: &QuickCaptureWorld, project: String) -> Result<(), eyre::Report> {
    let task = world.captured()?;
    let found = task.project().map(ToString::to_string);
    eyre::ensure!(
        found.as_deref() == Some(project.as_str()),
        "expected project {project:?}, found {found:?}"
    );
    Ok(())
}

#[then("the capture fails because the title is empty")]
fn capture_fails_with_empty_title(world: &QuickCaptureWorld) -> Result<(), eyre::Report> {
    let result = world
        .capture_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing capture result"))?;

    if !matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::EmptyTitle))
    ) {
        return Err(eyre::eyre!("expected EmptyTitle error, got {result:?}"));
    }
    Ok(())
}
