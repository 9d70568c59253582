//! Shared world state for quick-capture BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskdeck::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleService},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for quick-capture behaviour tests.
pub struct QuickCaptureWorld {
    pub service: TestTaskService,
    pub capture_result: Option<Result<Task, TaskLifecycleError>>,
}

impl QuickCaptureWorld {
    /// Creates a world with an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: TaskLifecycleService::new(
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(DefaultClock),
            ),
            capture_result: None,
        }
    }

    /// Returns the successfully captured task.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing was captured or the capture failed.
    pub fn captured(&self) -> Result<&Task, eyre::Report> {
        match self.capture_result.as_ref() {
            Some(Ok(task)) => Ok(task),
            Some(Err(err)) => Err(eyre::eyre!("capture failed: {err}")),
            None => Err(eyre::eyre!("missing capture result in scenario world")),
        }
    }
}

impl Default for QuickCaptureWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> QuickCaptureWorld {
    QuickCaptureWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
