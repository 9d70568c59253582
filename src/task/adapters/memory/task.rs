//! In-memory repository for task management tests.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{DependencyEdges, Task, TaskId, TaskPredicate},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, HashMap<TaskId, Task>>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, HashMap<TaskId, Task>>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Most urgent first; older tasks first among equals.
fn by_urgency(left: &Task, right: &Task) -> Ordering {
    right
        .urgency()
        .total_cmp(&left.urgency())
        .then_with(|| left.created_at().cmp(&right.created_at()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.write()?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.write()?;
        let slot = tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn search(&self, predicate: &TaskPredicate) -> TaskRepositoryResult<Vec<Task>> {
        if predicate.matches_nothing() {
            return Ok(Vec::new());
        }
        let tasks = self.read()?;
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|task| predicate.matches(task))
            .cloned()
            .collect();
        found.sort_by(by_urgency);
        Ok(found)
    }

    async fn dependency_edges(&self) -> TaskRepositoryResult<DependencyEdges> {
        let tasks = self.read()?;
        Ok(tasks
            .values()
            .filter(|task| !task.depends().is_empty())
            .map(|task| (task.id(), task.depends().clone()))
            .collect())
    }
}
