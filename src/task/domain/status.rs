//! Task status and the transition table that governs it.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is open and not being worked on.
    #[default]
    Pending,
    /// Task is parked until a later date or an external event.
    Waiting,
    /// Task is being worked on.
    Active,
    /// Task has been completed.
    Completed,
    /// Task has been deleted. Terminal.
    Deleted,
}

/// Every status, in declaration order.
pub const ALL_STATUSES: [TaskStatus; 5] = [
    TaskStatus::Pending,
    TaskStatus::Waiting,
    TaskStatus::Active,
    TaskStatus::Completed,
    TaskStatus::Deleted,
];

const FROM_PENDING: &[TaskStatus] = &[
    TaskStatus::Active,
    TaskStatus::Completed,
    TaskStatus::Waiting,
    TaskStatus::Deleted,
];
const FROM_ACTIVE: &[TaskStatus] = &[
    TaskStatus::Pending,
    TaskStatus::Completed,
    TaskStatus::Waiting,
    TaskStatus::Deleted,
];
const FROM_WAITING: &[TaskStatus] = &[
    TaskStatus::Pending,
    TaskStatus::Active,
    TaskStatus::Completed,
    TaskStatus::Deleted,
];
const FROM_COMPLETED: &[TaskStatus] = &[TaskStatus::Pending, TaskStatus::Deleted];
const FROM_DELETED: &[TaskStatus] = &[];

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }

    /// Returns the statuses reachable from `self` in one step.
    ///
    /// Self transitions are not listed; they are always permitted as no-ops.
    #[must_use]
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Pending => FROM_PENDING,
            Self::Active => FROM_ACTIVE,
            Self::Waiting => FROM_WAITING,
            Self::Completed => FROM_COMPLETED,
            Self::Deleted => FROM_DELETED,
        }
    }

    /// Returns `true` when moving from `self` to `target` is permitted.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self == target || self.allowed_targets().contains(&target)
    }

    /// Returns `true` when no outgoing transitions exist.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "waiting" => Ok(Self::Waiting),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
