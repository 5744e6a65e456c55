use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Claims;
use crate::error::Result;
use crate::models::Preferences;
use crate::routes::validation::JsonBody;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesRequest {
    #[serde(default)]
    pub categories: Value,
    #[serde(default)]
    pub languages: Value,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub preferences: Preferences,
}

#[derive(Debug, Serialize)]
pub struct PreferencesUpdatedResponse {
    pub message: String,
    pub preferences: Preferences,
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PreferencesResponse>> {
    let user = state.users.find_by_id(claims.id).await?;
    Ok(Json(PreferencesResponse {
        preferences: user.preferences,
    }))
}

/// Replace the caller's preferences
///
/// Non-array `categories` / `languages` are stored as empty lists.
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<PreferencesRequest>,
) -> Result<Json<PreferencesUpdatedResponse>> {
    let preferences = Preferences::from_values(&payload.categories, &payload.languages);
    let preferences = state.users.set_preferences(claims.id, preferences).await?;

    Ok(Json(PreferencesUpdatedResponse {
        message: "Preferences updated".to_string(),
        preferences,
    }))
}
