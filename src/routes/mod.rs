pub mod health;
pub mod news;
pub mod preferences;
pub mod tasks;
pub mod users;
pub mod validation;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

use crate::auth::require_auth;
use crate::constants::ERR_INTERNAL;
use crate::error::AppError;
use crate::AppState;

pub use health::health_check;
pub use news::{get_news, mark_favorite, mark_read, search_news};
pub use preferences::{get_preferences, update_preferences};
pub use tasks::{create_task, delete_task, get_task, list_tasks, tasks_by_priority, update_task};
pub use users::{list_users, login, me, register_user};

/// Build the full API router
///
/// Routes behind the token gate are grouped with `route_layer`, so unknown
/// paths still reach the fallback instead of the gate.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/preferences", get(get_preferences).put(update_preferences))
        .route("/users", get(list_users))
        .route("/me", get(me))
        .route("/news", get(get_news))
        .route("/news/search/:keyword", get(search_news))
        .route("/news/read/:url", post(mark_read))
        .route("/news/favorite/:url", post(mark_favorite))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/priority/:level", get(tasks_by_priority))
        .route("/register", post(register_user))
        .route("/login", post(login))
        .merge(protected)
        .fallback(endpoint_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn endpoint_not_found() -> AppError {
    AppError::EndpointNotFound
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Unhandled error: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": ERR_INTERNAL })),
    )
        .into_response()
}
