//! Service layer composing the task domain with a repository.

use crate::task::{
    domain::{
        ParseTaskStatusError, Task, TaskDomainError, TaskDraft, TaskId, TaskOperation,
        TaskPredicate, TaskSearchCriteria, TaskStatus, TaskUpdate, UrgencyScorer,
        parse_quick_capture,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for changing a task's status by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    target_status: String,
}

impl TransitionTaskRequest {
    /// Creates a transition request.
    #[must_use]
    pub fn new(task_id: TaskId, target_status: impl Into<String>) -> Self {
        Self {
            task_id,
            target_status: target_status.into(),
        }
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The requested status name is unknown.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// No task exists with the given identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    scorer: UrgencyScorer,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service scoring urgency with the default weights.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            scorer: UrgencyScorer::default(),
        }
    }

    /// Replaces the urgency scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: UrgencyScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Creates a task from a quick-capture line.
    ///
    /// `due:` values are resolved in the clock's local timezone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the line holds only
    /// modifiers, or a repository error when persistence fails.
    pub async fn capture(&self, line: &str) -> TaskLifecycleResult<Task> {
        let draft = parse_quick_capture(line, &self.clock.local());
        self.create(draft).await
    }

    /// Creates a pending task from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the draft is invalid or the
    /// repository rejects persistence.
    pub async fn create(&self, draft: TaskDraft) -> TaskLifecycleResult<Task> {
        let task = self.rescore(Task::from_draft(draft, &*self.clock)?);
        self.repository.store(&task).await?;
        tracing::info!(task_id = %task.id(), urgency = task.urgency(), "created task");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Moves a task to the named status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] for an unknown status
    /// name, [`TaskLifecycleError::NotFound`] for an unknown task, or
    /// [`TaskDomainError::InvalidStateTransition`] when the change is not
    /// allowed.
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let target = TaskStatus::try_from(request.target_status.as_str())?;
        let task = self.load(request.task_id).await?;
        let next = task.transition_to(target, &*self.clock)?;
        tracing::debug!(task_id = %task.id(), from = %task.status(), to = %target, "transition");
        self.persist_if_changed(&task, next).await
    }

    /// Applies a named lifecycle operation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task, or a
    /// domain error when the operation is rejected.
    pub async fn apply_operation(
        &self,
        task_id: TaskId,
        operation: TaskOperation,
    ) -> TaskLifecycleResult<Task> {
        let task = self.load(task_id).await?;
        let next = task.apply(operation, &*self.clock)?;
        self.persist_if_changed(&task, next).await
    }

    /// Applies field edits to a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task, or
    /// [`TaskDomainError::EmptyTitle`] for a blank replacement title.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> TaskLifecycleResult<Task> {
        let task = self.load(task_id).await?;
        let next = task.update(update, &*self.clock)?;
        self.persist_if_changed(&task, next).await
    }

    /// Replaces a task's dependencies after checking for cycles.
    ///
    /// The check runs against one snapshot of the stored graph. Concurrent
    /// edits made after the snapshot is taken are not seen.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] or
    /// [`TaskDomainError::CyclicDependency`] when the edit is rejected; nothing
    /// is persisted in that case.
    pub async fn set_dependencies(
        &self,
        task_id: TaskId,
        dependencies: Vec<TaskId>,
    ) -> TaskLifecycleResult<Task> {
        let task = self.load(task_id).await?;
        let graph = self.repository.dependency_edges().await?;
        let next = task
            .set_dependencies(dependencies, &graph, &*self.clock)
            .inspect_err(|err| {
                tracing::info!(task_id = %task_id, %err, "dependency edit rejected");
            })?;
        self.persist_if_changed(&task, next).await
    }

    /// Lists tasks matching the criteria, most urgent first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the search fails.
    pub async fn search(&self, criteria: &TaskSearchCriteria) -> TaskLifecycleResult<Vec<Task>> {
        let predicate = TaskPredicate::from_criteria(criteria);
        Ok(self.repository.search(&predicate).await?)
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    async fn persist_if_changed(&self, previous: &Task, next: Task) -> TaskLifecycleResult<Task> {
        if next == *previous {
            return Ok(next);
        }
        let rescored = self.rescore(next);
        self.repository.update(&rescored).await?;
        Ok(rescored)
    }

    fn rescore(&self, task: Task) -> Task {
        task.rescored(&self.scorer, task.updated_at())
    }
}
