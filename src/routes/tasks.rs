use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::constants::ERR_INVALID_PRIORITY_LEVEL;
use crate::error::{AppError, Result};
use crate::models::{Priority, Task, TaskPayload};
use crate::repository::TaskFilter;
use crate::routes::validation::{
    parse_completed_filter, parse_task_id, JsonBody, PathParam, QueryParams,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTasksParams {
    pub completed: Option<String>,
    pub sort: Option<String>,
}

/// List tasks
///
/// `GET /tasks?completed=<true|false>&sort=createdAt`
///
/// Any `completed` value other than `true`/`false` is rejected with 400.
/// Unknown `sort` values are ignored.
pub async fn list_tasks(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListTasksParams>,
) -> Result<Json<Vec<Task>>> {
    let filter = TaskFilter {
        completed: parse_completed_filter(params.completed.as_deref())?,
        sort_by_created: params.sort.as_deref() == Some("createdAt"),
    };

    Ok(Json(state.tasks.list(filter).await))
}

pub async fn get_task(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Task>> {
    let id = parse_task_id(&id)?;
    Ok(Json(state.tasks.get(id).await?))
}

pub async fn tasks_by_priority(
    State(state): State<AppState>,
    PathParam(level): PathParam<String>,
) -> Result<Json<Vec<Task>>> {
    let priority: Priority = level
        .parse()
        .map_err(|_| AppError::InvalidInput(ERR_INVALID_PRIORITY_LEVEL.to_string()))?;

    Ok(Json(state.tasks.list_by_priority(priority).await))
}

pub async fn create_task(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TaskPayload>,
) -> Result<(StatusCode, Json<Task>)> {
    let input = payload.validate()?;
    let task = state.tasks.create(input).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Replace title, description, completed and priority of a task
///
/// A missing task is reported before any validation error.
pub async fn update_task(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<TaskPayload>,
) -> Result<Json<Task>> {
    let id = parse_task_id(&id)?;
    state.tasks.get(id).await?;

    let input = payload.validate()?;
    Ok(Json(state.tasks.update(id, input).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode> {
    let id = parse_task_id(&id)?;
    state.tasks.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
