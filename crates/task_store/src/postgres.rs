//! PostgreSQL-backed task store.
//!
//! Same operation contract as the embedded store, but the backend lives
//! across the network: connection acquisition is bounded and surfaces as
//! [`TaskStoreError::Unavailable`], and all timestamps come from the server
//! clock (`now()`) so replicas never disagree with a caller's clock.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use crate::entities::normalize_title;
use crate::{
    NewTask, Task, TaskFilter, TaskPatch, TaskStore, TaskStoreError, TaskStoreResult,
};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS todos (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// Database row for a task
#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Networked task store persisting to a remote PostgreSQL server.
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Creates a store over an existing connection pool. The schema must be
    /// initialized separately.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the server at `url` and initializes the schema.
    ///
    /// Any failure to establish the connection (network, TLS, auth) is
    /// reported as [`TaskStoreError::Unavailable`].
    pub async fn connect(url: &str) -> TaskStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .map_err(|e| TaskStoreError::Unavailable(e.to_string()))?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Creates the todos table and its indexes.
    pub async fn init_schema(&self) -> TaskStoreResult<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at)")
            .execute(&self.pool)
            .await?;
        tracing::debug!("postgres schema initialized");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let query = match filter {
            TaskFilter::All => {
                "SELECT id, title, completed, created_at, updated_at FROM todos \
                 ORDER BY created_at DESC, id DESC"
            }
            TaskFilter::Active => {
                "SELECT id, title, completed, created_at, updated_at FROM todos \
                 WHERE completed = FALSE ORDER BY created_at DESC, id DESC"
            }
            TaskFilter::Completed => {
                "SELECT id, title, completed, created_at, updated_at FROM todos \
                 WHERE completed = TRUE ORDER BY created_at DESC, id DESC"
            }
        };

        let rows = sqlx::query_as::<_, TaskRow>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, completed, created_at, updated_at FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Task::from))
    }

    async fn create_task(&self, new_task: NewTask) -> TaskStoreResult<Task> {
        let title = normalize_title(&new_task.title)?;

        let row = sqlx::query_as::<_, TaskRow>(
            "INSERT INTO todos (title, completed) VALUES ($1, $2) \
             RETURNING id, title, completed, created_at, updated_at",
        )
        .bind(&title)
        .bind(new_task.completed)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, "task created");
        Ok(row.into())
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> TaskStoreResult<Task> {
        let patch = patch.normalized()?;

        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE todos SET \
                 title = COALESCE($1, title), \
                 completed = COALESCE($2, completed), \
                 updated_at = now() \
             WHERE id = $3 \
             RETURNING id, title, completed, created_at, updated_at",
        )
        .bind(patch.title.as_deref())
        .bind(patch.completed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TaskStoreError::NotFound(id))?;

        Ok(row.into())
    }

    async fn delete_task(&self, id: i64) -> TaskStoreResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        tracing::debug!(id, "task deleted");
        Ok(())
    }

    async fn delete_completed(&self) -> TaskStoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE completed = TRUE")
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected();
        tracing::debug!(removed, "completed tasks cleared");
        Ok(removed)
    }

    async fn delete_all(&self) -> TaskStoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        let removed = result.rows_affected();
        tracing::debug!(removed, "all tasks cleared");
        Ok(removed)
    }
}
