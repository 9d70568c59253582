//! Dependency cycle detection.
//!
//! The detector holds no data. It walks the persisted dependency graph
//! through a [`DependencyGraph`] lookup supplied by the caller, visiting each
//! node at most once so that an already-corrupt stored graph cannot make it
//! loop.

use super::{TaskDomainError, TaskId};
use std::collections::{BTreeSet, HashMap, HashSet, btree_set};
use std::hash::BuildHasher;

/// Read access to persisted dependency edges.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyGraph {
    /// Returns the identifiers `id` currently depends on.
    ///
    /// Unknown identifiers yield an empty set.
    fn edges_of(&self, id: TaskId) -> BTreeSet<TaskId>;
}

/// Snapshot of every task's dependency edges.
pub type DependencyEdges = HashMap<TaskId, BTreeSet<TaskId>>;

impl<S: BuildHasher> DependencyGraph for HashMap<TaskId, BTreeSet<TaskId>, S> {
    fn edges_of(&self, id: TaskId) -> BTreeSet<TaskId> {
        self.get(&id).cloned().unwrap_or_default()
    }
}

/// Adapts a lookup closure to [`DependencyGraph`].
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use taskdeck::task::domain::{LookupFn, TaskId, check_dependencies};
///
/// let task = TaskId::new();
/// let graph = LookupFn(|_| BTreeSet::new());
/// let candidates = BTreeSet::from([TaskId::new()]);
/// assert!(check_dependencies(task, &candidates, &graph).is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LookupFn<F>(pub F);

impl<F> DependencyGraph for LookupFn<F>
where
    F: Fn(TaskId) -> BTreeSet<TaskId>,
{
    fn edges_of(&self, id: TaskId) -> BTreeSet<TaskId> {
        (self.0)(id)
    }
}

/// Checks whether `task_id` may depend on every id in `candidates`.
///
/// # Errors
///
/// Returns [`TaskDomainError::SelfDependency`] when `candidates` contains
/// `task_id` (the graph is not consulted), or
/// [`TaskDomainError::CyclicDependency`] when `task_id` is reachable from any
/// candidate through the stored edges.
pub fn check_dependencies(
    task_id: TaskId,
    candidates: &BTreeSet<TaskId>,
    graph: &impl DependencyGraph,
) -> Result<(), TaskDomainError> {
    if candidates.contains(&task_id) {
        return Err(TaskDomainError::SelfDependency(task_id));
    }

    let mut visited = HashSet::new();
    for &root in candidates {
        if visited.contains(&root) {
            continue;
        }
        if let Some(cycle) = walk_from(task_id, root, graph, &mut visited) {
            return Err(TaskDomainError::CyclicDependency { task_id, cycle });
        }
    }
    Ok(())
}

type Frame = (TaskId, btree_set::IntoIter<TaskId>);

/// Depth-first walk from `root`; returns the closing path when `target` is
/// reached.
///
/// `visited` is shared across roots. A node seen through an earlier root has
/// already been shown not to reach `target`.
fn walk_from(
    target: TaskId,
    root: TaskId,
    graph: &impl DependencyGraph,
    visited: &mut HashSet<TaskId>,
) -> Option<Vec<TaskId>> {
    let mut on_path = HashSet::from([root]);
    let mut stack: Vec<Frame> = vec![(root, graph.edges_of(root).into_iter())];
    visited.insert(root);

    while let Some(frame) = stack.last_mut() {
        let current = frame.0;
        let next_edge = frame.1.next();
        match next_edge {
            Some(next) if next == target => {
                let mut cycle = Vec::with_capacity(stack.len() + 2);
                cycle.push(target);
                cycle.extend(stack.iter().map(|(id, _)| *id));
                cycle.push(target);
                return Some(cycle);
            }
            Some(next) if on_path.contains(&next) => {
                tracing::warn!(
                    from = %current,
                    to = %next,
                    "stored dependency graph already contains a cycle"
                );
            }
            Some(next) => {
                if visited.insert(next) {
                    on_path.insert(next);
                    stack.push((next, graph.edges_of(next).into_iter()));
                }
            }
            None => {
                on_path.remove(&current);
                stack.pop();
            }
        }
    }
    None
}
