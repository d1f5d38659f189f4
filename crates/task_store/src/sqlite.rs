//! SQLite-backed task store.
//!
//! Identity and creation timestamps are delegated to the engine
//! (AUTOINCREMENT and column defaults); every statement reads the resulting
//! row back with `RETURNING`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::entities::normalize_title;
use crate::{
    NewTask, Task, TaskFilter, TaskPatch, TaskStore, TaskStoreError, TaskStoreResult,
};

// Timestamps are stored as RFC 3339 text. The strftime default keeps
// millisecond precision, where CURRENT_TIMESTAMP would truncate to whole
// seconds and let close mutations share one updated_at.
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

/// Database row for a task
#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    completed: bool,
    created_at: String,
    updated_at: String,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            completed: row.completed,
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
        }
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Embedded task store persisting to a single local SQLite file.
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Creates a store over an existing connection pool. The schema must be
    /// initialized separately.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`, creating the file and the schema
    /// if missing.
    pub async fn connect(url: &str) -> TaskStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

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
        tracing::debug!("sqlite schema initialized");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let query = match filter {
            TaskFilter::All => {
                "SELECT id, title, completed, created_at, updated_at FROM todos \
                 ORDER BY created_at DESC, id DESC"
            }
            TaskFilter::Active => {
                "SELECT id, title, completed, created_at, updated_at FROM todos \
                 WHERE completed = 0 ORDER BY created_at DESC, id DESC"
            }
            TaskFilter::Completed => {
                "SELECT id, title, completed, created_at, updated_at FROM todos \
                 WHERE completed = 1 ORDER BY created_at DESC, id DESC"
            }
        };

        let rows = sqlx::query_as::<_, TaskRow>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, completed, created_at, updated_at FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Task::from))
    }

    async fn create_task(&self, new_task: NewTask) -> TaskStoreResult<Task> {
        let title = normalize_title(&new_task.title)?;

        let row = sqlx::query_as::<_, TaskRow>(
            "INSERT INTO todos (title, completed) VALUES (?, ?) \
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
                 title = COALESCE(?, title), \
                 completed = COALESCE(?, completed), \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             WHERE id = ? \
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
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
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
        let result = sqlx::query("DELETE FROM todos WHERE completed = 1")
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
