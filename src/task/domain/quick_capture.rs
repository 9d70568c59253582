//! Quick-capture parsing.
//!
//! A quick-capture line is free text sprinkled with modifier tokens:
//!
//! ```text
//! Buy groceries due:tomorrow +shopping priority:H project:home
//! ```
//!
//! Each modifier kind has its own extractor that claims whole
//! whitespace-delimited tokens from a shared buffer. Whatever is left over
//! becomes the title. Unrecognised or malformed modifier values never fail
//! the parse; the affected field keeps its default.

use super::{Priority, ProjectRef};
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

static PRIORITY_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"^priority:([HMLhml])$"));
static DUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"^due:(\S+)$"));
static PROJECT_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"^project:(\S+)$"));
static TAG_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"^\+(\w+)$"));

/// Local date-time layouts accepted after `due:`.
const DUE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals covered by unit tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("quick-capture pattern must compile")
}

/// Unsaved task fields produced by quick capture or an explicit create
/// request.
///
/// A draft carries no status; every created task starts pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title text, not yet normalized.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority; [`Priority::None`] unless specified.
    pub priority: Priority,
    /// Project reference.
    pub project: Option<ProjectRef>,
    /// Assignee.
    pub assignee: Option<String>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Tags in order of appearance, duplicates preserved.
    pub tags: Vec<String>,
}

impl TaskDraft {
    /// Creates a draft with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the project.
    #[must_use]
    pub fn with_project(mut self, project: ProjectRef) -> Self {
        self.project = Some(project);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Returns `true` when the title has no visible characters.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}

/// Whitespace-delimited input with per-token claim flags.
struct TokenBuffer<'a> {
    tokens: Vec<(&'a str, bool)>,
}

impl<'a> TokenBuffer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace().map(|token| (token, false)).collect(),
        }
    }

    /// Claims every unclaimed token matching `pattern`, returning their first
    /// capture groups in order.
    fn claim_all(&mut self, pattern: &Regex) -> Vec<String> {
        let mut values = Vec::new();
        for (token, claimed) in &mut self.tokens {
            if *claimed {
                continue;
            }
            if let Some(value) = pattern.captures(*token).and_then(|caps| caps.get(1)) {
                values.push(value.as_str().to_owned());
                *claimed = true;
            }
        }
        values
    }

    /// Claims all matches but keeps only the first value.
    fn claim_first(&mut self, pattern: &Regex) -> Option<String> {
        self.claim_all(pattern).into_iter().next()
    }

    fn remainder(&self) -> String {
        self.tokens
            .iter()
            .filter(|(_, claimed)| !claimed)
            .map(|(token, _)| *token)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parses one quick-capture line into a pending draft.
///
/// `now` supplies both the reference instant and the caller's local zone for
/// `due:` values.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use taskdeck::task::domain::{Priority, parse_quick_capture};
///
/// let now = Utc.with_ymd_and_hms(2025, 8, 15, 9, 0, 0).unwrap();
/// let draft = parse_quick_capture("Call bank +finance priority:M", &now);
/// assert_eq!(draft.title, "Call bank");
/// assert_eq!(draft.priority, Priority::Medium);
/// assert_eq!(draft.tags, vec!["finance".to_owned()]);
/// ```
#[must_use]
pub fn parse_quick_capture<Z: TimeZone>(input: &str, now: &DateTime<Z>) -> TaskDraft {
    let mut buffer = TokenBuffer::new(input);

    let priority = buffer
        .claim_first(&PRIORITY_TOKEN)
        .and_then(|code| code.chars().next())
        .and_then(Priority::from_code)
        .unwrap_or_default();
    let due_date = buffer
        .claim_first(&DUE_TOKEN)
        .and_then(|value| resolve_due(&value, now));
    let project = buffer
        .claim_first(&PROJECT_TOKEN)
        .map(|token| ProjectRef::from_token(&token));
    let tags = buffer.claim_all(&TAG_TOKEN);

    TaskDraft {
        title: buffer.remainder(),
        description: None,
        priority,
        project,
        assignee: None,
        due_date,
        tags,
    }
}

fn resolve_due<Z: TimeZone>(value: &str, now: &DateTime<Z>) -> Option<DateTime<Utc>> {
    let resolved = match value.to_ascii_lowercase().as_str() {
        "today" => end_of_day(now, 0),
        "tomorrow" => end_of_day(now, 1),
        _ => parse_local_datetime(value, &now.timezone()),
    };
    if resolved.is_none() {
        tracing::debug!(value, "ignoring unparseable due date in quick capture");
    }
    resolved
}

/// 23:59 local time, `days_ahead` calendar days after `now`.
fn end_of_day<Z: TimeZone>(now: &DateTime<Z>, days_ahead: u64) -> Option<DateTime<Utc>> {
    let date = now
        .date_naive()
        .checked_add_days(chrono::Days::new(days_ahead))?;
    let local = date.and_time(NaiveTime::from_hms_opt(23, 59, 0)?);
    to_utc(&now.timezone(), &local)
}

fn parse_local_datetime<Z: TimeZone>(value: &str, zone: &Z) -> Option<DateTime<Utc>> {
    DUE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .and_then(|local| to_utc(zone, &local))
}

fn to_utc<Z: TimeZone>(zone: &Z, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(local)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}
