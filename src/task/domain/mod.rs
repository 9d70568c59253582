//! Domain model for task management.
//!
//! The domain turns free-form or partial input into valid task state:
//! quick-capture parsing, urgency scoring, status transitions, dependency
//! cycle detection, and search predicate construction. Everything here is
//! synchronous and free of infrastructure concerns.

mod dependency;
mod error;
mod ids;
mod priority;
mod quick_capture;
mod search;
mod status;
mod task;
mod urgency;

#[cfg(test)]
pub(crate) use dependency::MockDependencyGraph;
pub use dependency::{DependencyEdges, DependencyGraph, LookupFn, check_dependencies};
pub use error::{ParsePriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{ProjectId, TaskId};
pub use priority::Priority;
pub use quick_capture::{TaskDraft, parse_quick_capture};
pub use search::{
    DueRange, FieldConstraint, StatusConstraint, TaskPredicate, TaskSearchCriteria, TextMatch,
    resolve_timezone,
};
pub use status::{ALL_STATUSES, TaskStatus};
pub use task::{Annotation, PersistedTaskData, ProjectRef, Task, TaskOperation, TaskUpdate};
pub use urgency::{
    IMPORTANT_TAG, MAX_URGENCY, MIN_URGENCY, URGENT_TAG, UrgencyScorer, UrgencyWeights, score,
};
