//! Task aggregate root and its lifecycle transforms.
//!
//! Every mutating operation takes `&self` and returns an updated copy, so a
//! rejected operation leaves the caller's task untouched. Successful
//! mutations bump `updated_at` and recompute urgency at that instant with
//! [`UrgencyWeights::default`](super::UrgencyWeights). Callers that configure
//! their own weights rescore the result with [`Task::rescored`], as
//! `TaskLifecycleService` does before every write.

use super::{
    DependencyGraph, Priority, ProjectId, TaskDomainError, TaskDraft, TaskId, TaskStatus,
    UrgencyScorer, check_dependencies, score,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Project a task belongs to, by identifier or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ProjectRef {
    /// Project referenced by canonical identifier.
    Id(ProjectId),
    /// Project referenced by free-form name.
    Name(String),
}

impl ProjectRef {
    /// Interprets a raw token as an identifier when it has canonical shape,
    /// otherwise as a name.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        ProjectId::parse_canonical(token)
            .map_or_else(|| Self::Name(token.trim().to_owned()), Self::Id)
    }

    /// Returns the project identifier, if referenced by id.
    #[must_use]
    pub const fn id(&self) -> Option<ProjectId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Timestamped note appended by lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// When the note was recorded.
    pub timestamp: DateTime<Utc>,
    /// Note text.
    pub text: String,
}

impl Annotation {
    /// Creates an annotation.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }
}

/// Named lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOperation {
    /// Move to [`TaskStatus::Active`].
    Start,
    /// Move an active task back to [`TaskStatus::Pending`]; no-op otherwise.
    Stop,
    /// Move to [`TaskStatus::Completed`].
    Done,
    /// Move to [`TaskStatus::Deleted`].
    Delete,
    /// Move to [`TaskStatus::Waiting`] until the given instant.
    Wait {
        /// Instant the task should resurface.
        until: DateTime<Utc>,
    },
    /// Append a free-form note.
    Annotate(String),
}

/// Field edits applied by [`Task::update`].
///
/// Unset fields are left unchanged. Optional fields take an `Option` so they
/// can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    title: Option<String>,
    description: Option<Option<String>>,
    priority: Option<Priority>,
    project: Option<Option<ProjectRef>>,
    assignee: Option<Option<String>>,
    due_date: Option<Option<DateTime<Utc>>>,
    tags: Option<Vec<String>>,
}

impl TaskUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces or clears the project.
    #[must_use]
    pub fn with_project(mut self, project: Option<ProjectRef>) -> Self {
        self.project = Some(project);
        self
    }

    /// Replaces or clears the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Replaces or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the tag list.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }
}

/// Task aggregate root.
///
/// Tasks are serialized for transport but never deserialized; stored tasks
/// come back through [`Task::from_persisted`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: Priority,
    urgency: f64,
    project: Option<ProjectRef>,
    assignee: Option<String>,
    due_date: Option<DateTime<Utc>>,
    wait_until: Option<DateTime<Utc>>,
    tags: Vec<String>,
    depends: BTreeSet<TaskId>,
    annotations: Vec<Annotation>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted urgency score.
    pub urgency: f64,
    /// Persisted project reference.
    pub project: Option<ProjectRef>,
    /// Persisted assignee.
    pub assignee: Option<String>,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted wait-until date.
    pub wait_until: Option<DateTime<Utc>>,
    /// Persisted tags, in order.
    pub tags: Vec<String>,
    /// Persisted dependency identifiers.
    pub depends: BTreeSet<TaskId>,
    /// Persisted annotations, oldest first.
    pub annotations: Vec<Annotation>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the normalized title is
    /// empty.
    pub fn from_draft(draft: TaskDraft, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = normalize_title(&draft.title).ok_or(TaskDomainError::EmptyTitle)?;
        let timestamp = clock.utc();
        let mut task = Self {
            id: TaskId::new(),
            title,
            description: draft.description,
            status: TaskStatus::Pending,
            priority: draft.priority,
            urgency: 0.0,
            project: draft.project,
            assignee: draft.assignee,
            due_date: draft.due_date,
            wait_until: None,
            tags: draft.tags,
            depends: BTreeSet::new(),
            annotations: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        task.urgency = score(&task, timestamp);
        Ok(task)
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            urgency: data.urgency,
            project: data.project,
            assignee: data.assignee,
            due_date: data.due_date,
            wait_until: data.wait_until,
            tags: data.tags,
            depends: data.depends,
            annotations: data.annotations,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the normalized title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the urgency computed at the last mutation.
    #[must_use]
    pub const fn urgency(&self) -> f64 {
        self.urgency
    }

    /// Returns the project reference, if any.
    #[must_use]
    pub const fn project(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the wait-until date, if any.
    #[must_use]
    pub const fn wait_until(&self) -> Option<DateTime<Utc>> {
        self.wait_until
    }

    /// Returns the tags in insertion order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the identifiers this task depends on.
    #[must_use]
    pub const fn depends(&self) -> &BTreeSet<TaskId> {
        &self.depends
    }

    /// Returns the annotations, oldest first.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy moved to `target`.
    ///
    /// A self transition returns an unchanged copy without an annotation.
    /// Leaving [`TaskStatus::Waiting`] clears `wait_until`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the
    /// transition table does not allow the change.
    pub fn transition_to(
        &self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if self.status == target {
            return Ok(self.clone());
        }
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }

        let now = clock.utc();
        let mut next = self.clone();
        next.status = target;
        if self.status == TaskStatus::Waiting {
            next.wait_until = None;
        }
        next.annotations.push(Annotation::new(
            now,
            format!("status changed from {} to {}", self.status, target),
        ));
        next.touch(now);
        Ok(next)
    }

    /// Returns a copy with the named operation applied.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the
    /// operation's target status is not reachable, or
    /// [`TaskDomainError::EmptyAnnotation`] for a blank note.
    pub fn apply(
        &self,
        operation: TaskOperation,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        match operation {
            TaskOperation::Start => self.transition_to(TaskStatus::Active, clock),
            TaskOperation::Stop if self.status == TaskStatus::Active => {
                self.transition_to(TaskStatus::Pending, clock)
            }
            TaskOperation::Stop => Ok(self.clone()),
            TaskOperation::Done => self.transition_to(TaskStatus::Completed, clock),
            TaskOperation::Delete => self.transition_to(TaskStatus::Deleted, clock),
            TaskOperation::Wait { until } => {
                let mut next = self.transition_to(TaskStatus::Waiting, clock)?;
                if next.wait_until != Some(until) {
                    next.wait_until = Some(until);
                    next.touch(clock.utc());
                }
                Ok(next)
            }
            TaskOperation::Annotate(text) => {
                let note = text.trim();
                if note.is_empty() {
                    return Err(TaskDomainError::EmptyAnnotation);
                }
                let now = clock.utc();
                let mut next = self.clone();
                next.annotations.push(Annotation::new(now, note));
                next.touch(now);
                Ok(next)
            }
        }
    }

    /// Returns a copy with the given field edits applied.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when a replacement title is
    /// blank.
    pub fn update(&self, update: TaskUpdate, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let mut next = self.clone();
        if let Some(title) = update.title {
            next.title = normalize_title(&title).ok_or(TaskDomainError::EmptyTitle)?;
        }
        if let Some(description) = update.description {
            next.description = description;
        }
        if let Some(priority) = update.priority {
            next.priority = priority;
        }
        if let Some(project) = update.project {
            next.project = project;
        }
        if let Some(assignee) = update.assignee {
            next.assignee = assignee;
        }
        if let Some(due_date) = update.due_date {
            next.due_date = due_date;
        }
        if let Some(tags) = update.tags {
            next.tags = tags;
        }
        next.touch(clock.utc());
        Ok(next)
    }

    /// Returns a copy whose dependencies are replaced by `dependencies`.
    ///
    /// The edit is checked against the current dependency graph first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] or
    /// [`TaskDomainError::CyclicDependency`] when the edit is rejected.
    pub fn set_dependencies(
        &self,
        dependencies: impl IntoIterator<Item = TaskId>,
        graph: &impl DependencyGraph,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let candidates: BTreeSet<TaskId> = dependencies.into_iter().collect();
        check_dependencies(self.id, &candidates, graph)?;
        if candidates == self.depends {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        next.depends = candidates;
        next.touch(clock.utc());
        Ok(next)
    }

    /// Returns a copy with urgency recomputed by `scorer` at `now`.
    #[must_use]
    pub fn rescored(&self, scorer: &UrgencyScorer, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.urgency = scorer.score(self, now);
        next
    }

    /// Default-weight rescore; see the module docs.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.urgency = score(self, now);
    }
}

/// Collapses internal whitespace runs and trims; `None` when nothing remains.
pub(crate) fn normalize_title(raw: &str) -> Option<String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!normalized.is_empty()).then_some(normalized)
}
