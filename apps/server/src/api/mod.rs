//! API endpoints.

pub mod todos;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{delete, get, put},
};
use serde_json::{Value, json};
use task_store::TaskStore;

use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: TaskStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Todo endpoints. The static bulk-delete segments are preferred
        // over the :id capture by the router.
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route("/todos/completed", delete(todos::delete_completed))
        .route("/todos/all", delete(todos::delete_all))
        .route(
            "/todos/:id",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
