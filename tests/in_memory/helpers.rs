//! Shared test helpers for in-memory repository integration tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use taskdeck::task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService};

/// Clock pinned to one instant so urgency and date bounds are reproducible.
#[derive(Debug, Clone, Copy)]
pub struct PinnedClock(pub DateTime<Utc>);

impl Clock for PinnedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Service type used by the in-memory integration tests.
pub type TestService = TaskLifecycleService<InMemoryTaskRepository, PinnedClock>;

/// Returns the instant every test clock is pinned to.
#[must_use]
pub fn pinned_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 15, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Provides a service over a fresh in-memory repository.
#[fixture]
pub fn service() -> TestService {
    TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(PinnedClock(pinned_now())),
    )
}
