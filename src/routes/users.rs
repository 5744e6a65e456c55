use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Claims;
use crate::constants::{
    ADMIN_ROLE, ERR_INVALID_EMAIL, ERR_PASSWORD_TOO_SHORT, MIN_PASSWORD_LEN, TOKEN_TTL_SECS,
};
use crate::error::{AppError, Result};
use crate::models::{User, UserProfile};
use crate::repository::NewUser;
use crate::routes::validation::JsonBody;
use crate::security::{hash_password, issue_token, verify_password};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Value,
    #[serde(default)]
    pub password: Value,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

/// Register a new user
///
/// Username must be email-shaped and the password at least 6 characters.
/// The password is stored as a salted PBKDF2 hash.
///
/// Returns 409 Conflict if the username is already registered.
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let username = payload
        .username
        .as_str()
        .filter(|u| User::validate_username(u))
        .ok_or_else(|| AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()))?
        .to_string();

    let password = payload
        .password
        .as_str()
        .filter(|p| p.chars().count() >= MIN_PASSWORD_LEN)
        .ok_or_else(|| AppError::InvalidInput(ERR_PASSWORD_TOO_SHORT.to_string()))?
        .to_string();

    // Skip the hashing cost for obvious duplicates; create() re-checks
    if state.users.find_by_username(&username).await.is_some() {
        return Err(AppError::UsernameTaken);
    }

    let rounds = state.config.password_hash_rounds;
    let password_hash =
        tokio::task::spawn_blocking(move || hash_password(&password, rounds)).await?;

    let role = state
        .config
        .is_admin_username(&username)
        .then(|| ADMIN_ROLE.to_string());

    state
        .users
        .create(NewUser {
            username,
            password_hash,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully.".to_string(),
        }),
    ))
}

/// Exchange username and password for an access token valid for one hour
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<Json<LoginResponse>> {
    let (Some(username), Some(password)) = (payload.username.as_str(), payload.password.as_str())
    else {
        return Err(AppError::InvalidCredentials);
    };

    let Some(user) = state.users.find_by_username(username).await else {
        tracing::warn!("Login attempt for unknown user");
        return Err(AppError::InvalidCredentials);
    };

    let password = password.to_string();
    let stored = user.password.clone();
    let matches =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?;

    if !matches {
        tracing::warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        Utc::now().timestamp(),
        TOKEN_TTL_SECS,
    );

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse { token }))
}

/// Profile of the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>> {
    let user = state.users.find_by_id(claims.id).await?;
    Ok(Json(user.profile()))
}

/// List all users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UsersResponse>> {
    let caller = state.users.find_by_id(claims.id).await?;
    if !caller.is_admin() {
        tracing::warn!(user_id = caller.id, "Non-admin requested user list");
        return Err(AppError::AccessDenied);
    }

    let users = state
        .users
        .all()
        .await
        .iter()
        .map(User::profile)
        .collect();

    Ok(Json(UsersResponse { users }))
}
