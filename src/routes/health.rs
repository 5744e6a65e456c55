use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports collection sizes; used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let tasks = state.tasks.len().await;
    let users = state.users.len().await;

    Json(json!({
        "status": "healthy",
        "tasks": tasks,
        "users": users,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
