//! Task store trait definitions.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{NewTask, Task, TaskPatch, TaskStoreResult};

/// Selection criterion for listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Completed tasks.
    Completed,
}

impl TaskFilter {
    /// Returns true when a task with the given completion flag matches.
    pub fn matches(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }
}

/// Trait for task storage operations.
///
/// Every implementation satisfies the same contract: ids are unique and
/// strictly increasing within one store instance, `created_at <= updated_at`
/// holds on every record, and the bulk deletions are atomic with respect to
/// concurrent reads.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists tasks matching the filter, most recently created first.
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<Task>>;

    /// Gets a task by id.
    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>>;

    /// Creates a new task with a freshly assigned id.
    async fn create_task(&self, new_task: NewTask) -> TaskStoreResult<Task>;

    /// Applies a partial update and returns the task as stored afterwards.
    ///
    /// Empty patches are rejected, so `updated_at` only advances when at
    /// least one field was actually supplied.
    async fn update_task(&self, id: i64, patch: TaskPatch) -> TaskStoreResult<Task>;

    /// Deletes a task by id.
    async fn delete_task(&self, id: i64) -> TaskStoreResult<()>;

    /// Deletes every completed task, returning how many were removed.
    async fn delete_completed(&self) -> TaskStoreResult<u64>;

    /// Deletes every task, returning how many were removed.
    async fn delete_all(&self) -> TaskStoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches() {
        assert!(TaskFilter::All.matches(true));
        assert!(TaskFilter::All.matches(false));
        assert!(TaskFilter::Active.matches(false));
        assert!(!TaskFilter::Active.matches(true));
        assert!(TaskFilter::Completed.matches(true));
        assert!(!TaskFilter::Completed.matches(false));
    }

    #[test]
    fn filter_deserializes_from_lowercase() {
        assert_eq!(
            serde_json::from_str::<TaskFilter>("\"active\"").unwrap(),
            TaskFilter::Active
        );
        assert_eq!(
            serde_json::from_str::<TaskFilter>("\"completed\"").unwrap(),
            TaskFilter::Completed
        );
        assert_eq!(
            serde_json::from_str::<TaskFilter>("\"all\"").unwrap(),
            TaskFilter::All
        );
    }
}
