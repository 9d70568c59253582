//! Urgency scoring.
//!
//! Urgency is an additive score over priority, due-date proximity, age,
//! status, and a pair of well-known tags, clamped to `[0, 100]`. It is a pure
//! function of the task and the evaluation instant.

#![expect(
    clippy::float_arithmetic,
    reason = "urgency is a weighted floating-point sum"
)]

use super::{Priority, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest possible urgency.
pub const MIN_URGENCY: f64 = 0.0;

/// Highest possible urgency.
pub const MAX_URGENCY: f64 = 100.0;

/// Tag that raises urgency by [`UrgencyWeights::urgent_tag`].
pub const URGENT_TAG: &str = "urgent";

/// Tag that raises urgency by [`UrgencyWeights::important_tag`].
pub const IMPORTANT_TAG: &str = "important";

/// Coefficients used by the urgency scorer.
///
/// Missing fields fall back to their defaults when deserialized, so hosts can
/// override a single coefficient from configuration.
///
/// # Examples
///
/// ```
/// use taskdeck::task::domain::UrgencyWeights;
///
/// let weights: UrgencyWeights = serde_json::from_str(r#"{"active": 6.0}"#)?;
/// assert_eq!(weights.active, 6.0);
/// assert_eq!(weights.priority_high, 6.0);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    /// Bonus for [`Priority::High`].
    pub priority_high: f64,
    /// Bonus for [`Priority::Medium`].
    pub priority_medium: f64,
    /// Bonus for [`Priority::Low`].
    pub priority_low: f64,
    /// Base bonus once the due date has passed.
    pub overdue_base: f64,
    /// Additional bonus per whole day overdue.
    pub overdue_per_day: f64,
    /// Upper bound (inclusive, days) of the near-due window.
    pub near_window_days: i64,
    /// Bonus when due today, decaying by [`Self::near_per_day`].
    pub near_base: f64,
    /// Decay per day inside the near-due window.
    pub near_per_day: f64,
    /// Upper bound (inclusive, days) of the far-due window.
    pub far_window_days: i64,
    /// Base bonus inside the far-due window, decaying by [`Self::far_per_day`].
    pub far_base: f64,
    /// Decay per day inside the far-due window.
    pub far_per_day: f64,
    /// Bonus per whole day since creation.
    pub age_per_day: f64,
    /// Bonus for [`TaskStatus::Active`].
    pub active: f64,
    /// Penalty for [`TaskStatus::Waiting`].
    pub waiting: f64,
    /// Bonus when the [`URGENT_TAG`] is present.
    pub urgent_tag: f64,
    /// Bonus when the [`IMPORTANT_TAG`] is present.
    pub important_tag: f64,
}

impl Default for UrgencyWeights {
    fn default() -> Self {
        Self {
            priority_high: 6.0,
            priority_medium: 3.9,
            priority_low: 1.8,
            overdue_base: 12.0,
            overdue_per_day: 0.2,
            near_window_days: 7,
            near_base: 12.0,
            near_per_day: 1.4,
            far_window_days: 14,
            far_base: 5.0,
            far_per_day: 0.3,
            age_per_day: 0.01,
            active: 4.0,
            waiting: 3.0,
            urgent_tag: 5.0,
            important_tag: 3.0,
        }
    }
}

/// Computes task urgency from configurable weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrgencyScorer {
    weights: UrgencyWeights,
}

impl UrgencyScorer {
    /// Creates a scorer with the given weights.
    #[must_use]
    pub const fn new(weights: UrgencyWeights) -> Self {
        Self { weights }
    }

    /// Returns the weights in use.
    #[must_use]
    pub const fn weights(&self) -> &UrgencyWeights {
        &self.weights
    }

    /// Scores `task` as of `now`. The result is always within `[0, 100]`.
    #[must_use]
    pub fn score(&self, task: &Task, now: DateTime<Utc>) -> f64 {
        let days_until_due = task.due_date().map(|due| (due - now).num_days());
        let age_days = (now - task.created_at()).num_days();

        let total = self.priority_component(task.priority())
            + self.due_component(days_until_due)
            + self.age_component(age_days)
            + self.status_component(task.status())
            + self.tag_component(task.tags());

        // `f64::max` discards NaN, so a degenerate weight set still lands at 0.
        total.max(MIN_URGENCY).min(MAX_URGENCY)
    }

    const fn priority_component(&self, priority: Priority) -> f64 {
        match priority {
            Priority::High => self.weights.priority_high,
            Priority::Medium => self.weights.priority_medium,
            Priority::Low => self.weights.priority_low,
            Priority::None => 0.0,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "day counts are far below 2^52"
    )]
    fn due_component(&self, days_until_due: Option<i64>) -> f64 {
        let Some(days) = days_until_due else {
            return 0.0;
        };
        let w = &self.weights;
        let d = days as f64;
        if days < 0 {
            w.overdue_base + d.abs() * w.overdue_per_day
        } else if days <= w.near_window_days {
            w.near_base - d * w.near_per_day
        } else if days <= w.far_window_days {
            w.far_base - d * w.far_per_day
        } else {
            0.0
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "day counts are far below 2^52"
    )]
    fn age_component(&self, age_days: i64) -> f64 {
        age_days as f64 * self.weights.age_per_day
    }

    fn status_component(&self, status: TaskStatus) -> f64 {
        match status {
            TaskStatus::Active => self.weights.active,
            TaskStatus::Waiting => -self.weights.waiting,
            TaskStatus::Pending | TaskStatus::Completed | TaskStatus::Deleted => 0.0,
        }
    }

    fn tag_component(&self, tags: &[String]) -> f64 {
        let has = |name: &str| tags.iter().any(|tag| tag == name);
        let mut bonus = 0.0;
        if has(URGENT_TAG) {
            bonus += self.weights.urgent_tag;
        }
        if has(IMPORTANT_TAG) {
            bonus += self.weights.important_tag;
        }
        bonus
    }
}

/// Scores `task` as of `now` with the default weights.
#[must_use]
pub fn score(task: &Task, now: DateTime<Utc>) -> f64 {
    UrgencyScorer::default().score(task, now)
}
