//! Search predicate construction.
//!
//! [`TaskSearchCriteria`] collects optional, independent filters as they
//! arrive from a caller. [`TaskPredicate::from_criteria`] turns them into a
//! flat list of [`FieldConstraint`]s that are ANDed together. The predicate
//! is a plain description: storage adapters translate it into their native
//! query form, and [`TaskPredicate::matches`] evaluates it in memory.
//!
//! Bad input never fails the build. A malformed project id yields a
//! predicate that matches nothing, an unknown timezone falls back to UTC, and
//! an unparseable date bound is dropped.

use super::{ProjectId, ProjectRef, Task, TaskStatus};
use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zone-less date-time layouts accepted for date bounds.
const NAIVE_DATETIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Bare calendar date layout accepted for date bounds.
const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Optional filter criteria for listing tasks.
///
/// Every field is independent. Absent or blank values impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearchCriteria {
    statuses: Vec<TaskStatus>,
    title: Option<String>,
    assignee: Option<String>,
    project_id: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    timezone: Option<String>,
}

impl TaskSearchCriteria {
    /// Creates empty criteria, matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to any of the given statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Restricts results to titles containing `title`, ignoring case.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Restricts results to assignees containing `assignee`, ignoring case.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Restricts results to the project with the given canonical id.
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the inclusive lower due-date bound.
    #[must_use]
    pub fn with_date_from(mut self, date_from: impl Into<String>) -> Self {
        self.date_from = Some(date_from.into());
        self
    }

    /// Sets the inclusive upper due-date bound.
    #[must_use]
    pub fn with_date_to(mut self, date_to: impl Into<String>) -> Self {
        self.date_to = Some(date_to.into());
        self
    }

    /// Sets the IANA timezone used to interpret date bounds.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// Constraint on task status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum StatusConstraint {
    /// Status equals the given value.
    Equals(TaskStatus),
    /// Status is one of the given values.
    OneOf(Vec<TaskStatus>),
}

impl StatusConstraint {
    /// Returns `true` when `status` satisfies the constraint.
    #[must_use]
    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            Self::Equals(expected) => *expected == status,
            Self::OneOf(allowed) => allowed.contains(&status),
        }
    }
}

/// Case-insensitive literal substring match.
///
/// The needle is kept verbatim; pattern renderings escape every character
/// that is special to the target engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    needle: String,
}

impl TextMatch {
    /// Creates a match from raw input; `None` when blank after trimming.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self {
            needle: trimmed.to_owned(),
        })
    }

    /// Returns the trimmed literal being searched for.
    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Returns `true` when `haystack` contains the needle, ignoring case.
    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        haystack
            .to_lowercase()
            .contains(&self.needle.to_lowercase())
    }

    /// Renders a case-insensitive regular expression matching the literal.
    #[must_use]
    pub fn regex_pattern(&self) -> String {
        format!("(?i){}", regex::escape(&self.needle))
    }

    /// Renders a SQL `LIKE`/`ILIKE` pattern using `\` as the escape
    /// character.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for ch in self.needle.chars() {
            if matches!(ch, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}

/// Inclusive due-date range; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueRange {
    /// Earliest accepted due date.
    pub from: Option<DateTime<Utc>>,
    /// Latest accepted due date.
    pub to: Option<DateTime<Utc>>,
}

impl DueRange {
    /// Returns `true` when `instant` lies within the range.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| instant >= from) && self.to.is_none_or(|to| instant <= to)
    }
}

/// A single constraint on one task field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "constraint", rename_all = "snake_case")]
pub enum FieldConstraint {
    /// Constraint on [`Task::status`].
    Status(StatusConstraint),
    /// Constraint on [`Task::title`].
    Title(TextMatch),
    /// Constraint on [`Task::assignee`]; tasks without one never match.
    Assignee(TextMatch),
    /// Task must reference this project by id.
    Project(ProjectId),
    /// Task must have a due date inside the range.
    DueDate(DueRange),
    /// No task matches.
    MatchNothing,
}

impl FieldConstraint {
    /// Returns `true` when `task` satisfies this constraint.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Status(constraint) => constraint.matches(task.status()),
            Self::Title(text) => text.matches(task.title()),
            Self::Assignee(text) => task.assignee().is_some_and(|name| text.matches(name)),
            Self::Project(id) => task.project().and_then(ProjectRef::id) == Some(*id),
            Self::DueDate(range) => task.due_date().is_some_and(|due| range.contains(due)),
            Self::MatchNothing => false,
        }
    }
}

/// Conjunction of field constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPredicate {
    constraints: Vec<FieldConstraint>,
}

impl TaskPredicate {
    /// Returns a predicate that matches every task.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Returns a predicate that matches no task.
    #[must_use]
    pub fn nothing() -> Self {
        Self {
            constraints: vec![FieldConstraint::MatchNothing],
        }
    }

    /// Builds a predicate from search criteria.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskdeck::task::domain::{TaskPredicate, TaskSearchCriteria};
    ///
    /// let criteria = TaskSearchCriteria::new().with_project_id("not-a-uuid");
    /// assert!(TaskPredicate::from_criteria(&criteria).matches_nothing());
    /// ```
    #[must_use]
    pub fn from_criteria(criteria: &TaskSearchCriteria) -> Self {
        let mut constraints = Vec::new();

        if let Some(status) = status_constraint(&criteria.statuses) {
            constraints.push(FieldConstraint::Status(status));
        }
        if let Some(title) = criteria.title.as_deref().and_then(TextMatch::new) {
            constraints.push(FieldConstraint::Title(title));
        }
        if let Some(assignee) = criteria.assignee.as_deref().and_then(TextMatch::new) {
            constraints.push(FieldConstraint::Assignee(assignee));
        }
        if let Some(project) = criteria.project_id.as_deref().and_then(project_constraint) {
            constraints.push(project);
        }
        if let Some(range) = due_range(
            criteria.date_from.as_deref(),
            criteria.date_to.as_deref(),
            criteria.timezone.as_deref(),
        ) {
            constraints.push(FieldConstraint::DueDate(range));
        }

        Self { constraints }
    }

    /// Returns the conjunction of `self` and `other`.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.constraints.extend(other.constraints);
        self
    }

    /// Returns the constraints in the order they were added.
    #[must_use]
    pub fn constraints(&self) -> &[FieldConstraint] {
        &self.constraints
    }

    /// Returns `true` when the predicate imposes no constraint.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Returns `true` when the predicate can never match.
    #[must_use]
    pub fn matches_nothing(&self) -> bool {
        self.constraints.contains(&FieldConstraint::MatchNothing)
    }

    /// Evaluates the predicate against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.matches(task))
    }
}

fn status_constraint(statuses: &[TaskStatus]) -> Option<StatusConstraint> {
    let mut distinct: Vec<TaskStatus> = Vec::with_capacity(statuses.len());
    for status in statuses {
        if !distinct.contains(status) {
            distinct.push(*status);
        }
    }
    match distinct.as_slice() {
        [] => None,
        [single] => Some(StatusConstraint::Equals(*single)),
        _ => Some(StatusConstraint::OneOf(distinct)),
    }
}

fn project_constraint(raw: &str) -> Option<FieldConstraint> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let constraint = ProjectId::parse_canonical(trimmed).map_or_else(
        || {
            tracing::debug!(project_id = trimmed, "malformed project id, matching nothing");
            FieldConstraint::MatchNothing
        },
        FieldConstraint::Project,
    );
    Some(constraint)
}

/// Resolves an IANA zone name, falling back to UTC.
///
/// The fallback is logged at warn level whether the name was missing or
/// unknown.
#[must_use]
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    let Some(trimmed) = name.map(str::trim).filter(|value| !value.is_empty()) else {
        tracing::warn!("no timezone given, interpreting dates in UTC");
        return Tz::UTC;
    };
    trimmed.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!(timezone = trimmed, "unknown timezone, falling back to UTC");
        Tz::UTC
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

fn due_range(
    date_from: Option<&str>,
    date_to: Option<&str>,
    timezone: Option<&str>,
) -> Option<DueRange> {
    if date_from.is_none() && date_to.is_none() {
        return None;
    }
    let zone = resolve_timezone(timezone);
    let from = date_from.and_then(|raw| resolve_bound(raw, &zone, Edge::Start));
    let to = date_to.and_then(|raw| resolve_bound(raw, &zone, Edge::End));
    (from.is_some() || to.is_some()).then_some(DueRange { from, to })
}

fn resolve_bound(raw: &str, zone: &Tz, edge: Edge) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let Some(day) = calendar_day(trimmed, zone) else {
        tracing::debug!(value = trimmed, ?edge, "dropping unparseable date bound");
        return None;
    };
    let time = match edge {
        Edge::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        Edge::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?,
    };
    local_instant(zone, day.and_time(time), edge)
}

/// Calendar day in `zone` named by `raw`, trying an explicit-offset
/// timestamp, then a zone-less timestamp, then a bare date.
fn calendar_day(raw: &str, zone: &Tz) -> Option<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(zone).date_naive());
    }
    if let Some(local) = NAIVE_DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Some(local.date());
    }
    NaiveDate::parse_from_str(raw, DATE_LAYOUT).ok()
}

/// Maps a local wall-clock time to an instant.
///
/// Ambiguous times take the earlier instant for a start bound and the later
/// one for an end bound. Times inside a DST gap move one hour towards the
/// middle of the day.
fn local_instant(zone: &Tz, local: NaiveDateTime, edge: Edge) -> Option<DateTime<Utc>> {
    let resolved = match zone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(earliest, latest) => Some(match edge {
            Edge::Start => earliest,
            Edge::End => latest,
        }),
        LocalResult::None => {
            let shifted = match edge {
                Edge::Start => local.checked_add_signed(TimeDelta::hours(1))?,
                Edge::End => local.checked_sub_signed(TimeDelta::hours(1))?,
            };
            match edge {
                Edge::Start => zone.from_local_datetime(&shifted).earliest(),
                Edge::End => zone.from_local_datetime(&shifted).latest(),
            }
        }
    };
    resolved.map(|instant| instant.with_timezone(&Utc))
}
