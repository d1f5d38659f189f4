//! Todo API endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use task_store::{NewTask, Task, TaskFilter, TaskPatch, TaskStore};

use crate::error::ServerResult;
use crate::state::AppState;

/// Query parameters for listing todos.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Filter: all (default), active or completed.
    #[serde(default)]
    pub status: TaskFilter,
}

/// Request body for creating a todo.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request body for updating a todo. Omitted fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Response body for the single-delete endpoint.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response body for the bulk-delete endpoints.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub count: u64,
}

/// Lists todos, optionally filtered by completion status.
pub async fn list_todos<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> ServerResult<Json<Vec<Task>>> {
    let tasks = state.store.list_tasks(params.status).await?;
    Ok(Json(tasks))
}

/// Creates a new todo.
pub async fn create_todo<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<CreateTodoRequest>,
) -> ServerResult<Json<Task>> {
    let task = state
        .store
        .create_task(NewTask::new(request.title).completed(request.completed))
        .await?;

    tracing::info!(id = task.id, "todo created");
    Ok(Json(task))
}

/// Updates the supplied fields of a todo.
pub async fn update_todo<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTodoRequest>,
) -> ServerResult<Json<Task>> {
    let patch = TaskPatch {
        title: request.title,
        completed: request.completed,
    };
    let task = state.store.update_task(id, patch).await?;

    tracing::info!(id, completed = task.completed, "todo updated");
    Ok(Json(task))
}

/// Deletes a todo by id.
pub async fn delete_todo<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> ServerResult<Json<MessageResponse>> {
    state.store.delete_task(id).await?;

    tracing::info!(id, "todo deleted");
    Ok(Json(MessageResponse {
        message: format!("todo {id} deleted"),
    }))
}

/// Deletes every completed todo.
pub async fn delete_completed<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<BulkDeleteResponse>> {
    let count = state.store.delete_completed().await?;

    tracing::info!(count, "completed todos cleared");
    Ok(Json(BulkDeleteResponse {
        message: format!("removed {count} completed todos"),
        count,
    }))
}

/// Deletes every todo.
pub async fn delete_all<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<BulkDeleteResponse>> {
    let count = state.store.delete_all().await?;

    tracing::info!(count, "all todos cleared");
    Ok(Json(BulkDeleteResponse {
        message: format!("cleared {count} todos"),
        count,
    }))
}
