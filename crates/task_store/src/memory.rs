//! In-memory task store implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::entities::normalize_title;
use crate::{
    NewTask, Task, TaskFilter, TaskPatch, TaskStore, TaskStoreError, TaskStoreResult,
};

/// The id counter and the records share one lock so id assignment stays
/// atomic with insertion.
#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
}

/// Volatile task store. Records live in process memory and are lost on
/// restart.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    inner: RwLock<Inner>,
}

impl MemoryTaskStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| filter.matches(t.completed))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn create_task(&self, new_task: NewTask) -> TaskStoreResult<Task> {
        let title = normalize_title(&new_task.title)?;
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.next_id,
            title,
            completed: new_task.completed,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        tracing::debug!(id = task.id, "task created");
        Ok(task)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> TaskStoreResult<Task> {
        let patch = patch.normalized()?;
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or(TaskStoreError::NotFound(id))?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> TaskStoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.tasks.remove(&id).is_none() {
            return Err(TaskStoreError::NotFound(id));
        }
        tracing::debug!(id, "task deleted");
        Ok(())
    }

    async fn delete_completed(&self) -> TaskStoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|_, t| !t.completed);
        let removed = (before - inner.tasks.len()) as u64;
        tracing::debug!(removed, "completed tasks cleared");
        Ok(removed)
    }

    async fn delete_all(&self) -> TaskStoreResult<u64> {
        let mut inner = self.inner.write().await;
        let removed = inner.tasks.len() as u64;
        inner.tasks.clear();
        tracing::debug!(removed, "all tasks cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryTaskStore::new();

        let first = store.create_task(NewTask::new("first")).await.unwrap();
        let second = store.create_task(NewTask::new("second")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.created_at, first.updated_at);
        assert!(!first.completed);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryTaskStore::new();

        let task = store.create_task(NewTask::new("gone soon")).await.unwrap();
        store.delete_task(task.id).await.unwrap();

        let next = store.create_task(NewTask::new("after")).await.unwrap();
        assert!(next.id > task.id);
        assert!(store.get_task(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_get_unique_ids() {
        let store = Arc::new(MemoryTaskStore::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_task(NewTask::new(format!("task {i}"))).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let store = MemoryTaskStore::new();
        let task = store.create_task(NewTask::new("original")).await.unwrap();

        let updated = store
            .update_task(
                task.id,
                TaskPatch {
                    title: Some("renamed".to_string()),
                    completed: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert!(!updated.completed);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_without_timestamp_churn() {
        let store = MemoryTaskStore::new();
        let task = store.create_task(NewTask::new("untouched")).await.unwrap();

        let result = store.update_task(task.id, TaskPatch::default()).await;
        assert!(matches!(result, Err(TaskStoreError::Validation(_))));

        let stored = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, task.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_fail_with_not_found() {
        let store = MemoryTaskStore::new();

        let update = store
            .update_task(
                99,
                TaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(update, Err(TaskStoreError::NotFound(99))));
        assert!(matches!(
            store.delete_task(99).await,
            Err(TaskStoreError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_completion() {
        let store = MemoryTaskStore::new();
        let open = store.create_task(NewTask::new("open")).await.unwrap();
        let done = store
            .create_task(NewTask::new("done").completed(true))
            .await
            .unwrap();

        let active = store.list_tasks(TaskFilter::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, open.id);

        let completed = store.list_tasks(TaskFilter::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);

        assert_eq!(store.list_tasks(TaskFilter::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_orders_most_recent_first() {
        let store = MemoryTaskStore::new();
        for i in 0..5 {
            store
                .create_task(NewTask::new(format!("task {i}")))
                .await
                .unwrap();
        }

        let tasks = store.list_tasks(TaskFilter::All).await.unwrap();
        for pair in tasks.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[tokio::test]
    async fn delete_completed_removes_exactly_the_completed_subset() {
        let store = MemoryTaskStore::new();
        for i in 0..3 {
            store
                .create_task(NewTask::new(format!("open {i}")))
                .await
                .unwrap();
        }
        for i in 0..2 {
            store
                .create_task(NewTask::new(format!("done {i}")).completed(true))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_completed().await.unwrap(), 2);
        assert!(store
            .list_tasks(TaskFilter::Completed)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.list_tasks(TaskFilter::All).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_all_on_empty_store_returns_zero() {
        let store = MemoryTaskStore::new();
        assert_eq!(store.delete_all().await.unwrap(), 0);

        store.create_task(NewTask::new("a")).await.unwrap();
        store.create_task(NewTask::new("b")).await.unwrap();
        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.list_tasks(TaskFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_list_roundtrip_preserves_fields() {
        let store = MemoryTaskStore::new();
        let created = store
            .create_task(NewTask::new("  Buy milk  "))
            .await
            .unwrap();
        assert_eq!(created.title, "Buy milk");

        let listed = store.list_tasks(TaskFilter::All).await.unwrap();
        assert_eq!(listed, vec![created]);
    }
}
