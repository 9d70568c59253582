//! In-memory integration tests for task lifecycle operations.

use super::helpers::{TestService, pinned_now, service};
use chrono::TimeDelta;
use rstest::rstest;
use taskdeck::task::{
    domain::{Priority, TaskDomainError, TaskDraft, TaskId, TaskOperation, TaskStatus, TaskUpdate},
    services::{TaskLifecycleError, TransitionTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn captured_task_moves_through_its_lifecycle(service: TestService) -> eyre::Result<()> {
    let created = service.capture("Prepare slides +talk priority:M").await?;
    eyre::ensure!(created.status() == TaskStatus::Pending);
    eyre::ensure!(created.priority() == Priority::Medium);

    let id = created.id();
    service.apply_operation(id, TaskOperation::Start).await?;
    service
        .apply_operation(id, TaskOperation::Annotate("first draft done".to_owned()))
        .await?;
    let until = pinned_now() + TimeDelta::days(2);
    let waiting = service
        .apply_operation(id, TaskOperation::Wait { until })
        .await?;
    eyre::ensure!(waiting.status() == TaskStatus::Waiting);
    eyre::ensure!(waiting.wait_until() == Some(until));

    let resumed = service
        .transition_task(TransitionTaskRequest::new(id, "pending"))
        .await?;
    eyre::ensure!(resumed.wait_until().is_none());
    service.apply_operation(id, TaskOperation::Done).await?;
    let deleted = service.apply_operation(id, TaskOperation::Delete).await?;

    let notes: Vec<&str> = deleted
        .annotations()
        .iter()
        .map(|note| note.text.as_str())
        .collect();
    eyre::ensure!(
        notes
            == [
                "status changed from pending to active",
                "first draft done",
                "status changed from active to waiting",
                "status changed from waiting to pending",
                "status changed from pending to completed",
                "status changed from completed to deleted",
            ],
        "unexpected annotations {notes:?}"
    );

    let reopened = service
        .transition_task(TransitionTaskRequest::new(id, "pending"))
        .await;
    eyre::ensure!(
        matches!(
            reopened,
            Err(TaskLifecycleError::Domain(
                TaskDomainError::InvalidStateTransition { .. }
            ))
        ),
        "deleted tasks must stay deleted"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_can_be_reopened(service: TestService) -> eyre::Result<()> {
    let created = service.create(TaskDraft::new("Fix flaky test")).await?;
    service
        .apply_operation(created.id(), TaskOperation::Done)
        .await?;

    let reopened = service
        .transition_task(TransitionTaskRequest::new(created.id(), "pending"))
        .await?;

    eyre::ensure!(reopened.status() == TaskStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn field_update_rescores_and_persists(service: TestService) -> eyre::Result<()> {
    let created = service.create(TaskDraft::new("Renew certificate")).await?;

    let updated = service
        .update_task(
            created.id(),
            TaskUpdate::new()
                .with_tags(["urgent".to_owned(), "ops".to_owned()])
                .with_assignee(Some("kim".to_owned())),
        )
        .await?;

    eyre::ensure!(updated.urgency() > created.urgency());
    let stored = service.find_by_id(created.id()).await?;
    eyre::ensure!(stored.as_ref() == Some(&updated));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependencies_can_be_replaced_and_cleared(service: TestService) -> eyre::Result<()> {
    let parent = service.create(TaskDraft::new("Launch")).await?;
    let first = service.create(TaskDraft::new("Write copy")).await?;
    let second = service.create(TaskDraft::new("Book venue")).await?;
    let unknown = TaskId::new();

    let linked = service
        .set_dependencies(parent.id(), vec![first.id(), first.id(), unknown])
        .await?;
    eyre::ensure!(linked.depends().len() == 2);

    let replaced = service
        .set_dependencies(parent.id(), vec![second.id()])
        .await?;
    eyre::ensure!(replaced.depends().iter().eq([second.id()].iter()));

    let cleared = service.set_dependencies(parent.id(), Vec::new()).await?;
    eyre::ensure!(cleared.depends().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shared_dependency_is_not_a_cycle(service: TestService) -> eyre::Result<()> {
    let top = service.create(TaskDraft::new("Top")).await?;
    let left = service.create(TaskDraft::new("Left")).await?;
    let right = service.create(TaskDraft::new("Right")).await?;
    let base = service.create(TaskDraft::new("Base")).await?;

    service
        .set_dependencies(left.id(), vec![base.id()])
        .await?;
    service
        .set_dependencies(right.id(), vec![base.id()])
        .await?;
    let diamond = service
        .set_dependencies(top.id(), vec![left.id(), right.id()])
        .await?;
    eyre::ensure!(diamond.depends().len() == 2);

    let closing = service.set_dependencies(base.id(), vec![top.id()]).await;
    eyre::ensure!(matches!(
        closing,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::CyclicDependency { .. }
        ))
    ));
    Ok(())
}
