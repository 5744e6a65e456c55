use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::auth::Claims;
use crate::error::{AppError, Result};
use crate::models::Article;
use crate::repository::ArticleList;
use crate::routes::validation::PathParam;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct MarkedResponse {
    pub message: String,
    pub url: String,
}

/// Latest news for the caller's preferences
///
/// Served from the per-user cache while it is younger than 10 minutes.
pub async fn get_news(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ArticlesResponse>> {
    let user = state.users.find_by_id(claims.id).await?;

    let articles = state
        .news
        .articles_for_user(user.id, &user.preferences)
        .await
        .map_err(|e| {
            tracing::error!(user_id = user.id, error = %e, "News fetching error");
            AppError::News(e)
        })?;

    Ok(Json(ArticlesResponse { articles }))
}

/// Keyword search, bypassing the cache
pub async fn search_news(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<ArticlesResponse>> {
    let articles = state.news.search(&keyword).await.map_err(|e| {
        tracing::error!(user_id = claims.id, keyword = %keyword, error = %e, "News search error");
        AppError::NewsSearch(e)
    })?;

    Ok(Json(ArticlesResponse { articles }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(url): PathParam<String>,
) -> Result<Json<MarkedResponse>> {
    mark_article(&state, &claims, ArticleList::Read, url, "Article marked as read.").await
}

pub async fn mark_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParam(url): PathParam<String>,
) -> Result<Json<MarkedResponse>> {
    mark_article(
        &state,
        &claims,
        ArticleList::Favorites,
        url,
        "Article marked as favorite.",
    )
    .await
}

/// `url` arrives percent-decoded from the path extractor
async fn mark_article(
    state: &AppState,
    claims: &Claims,
    list: ArticleList,
    url: String,
    message: &str,
) -> Result<Json<MarkedResponse>> {
    let added = state.users.add_article(claims.id, list, &url).await?;
    tracing::debug!(user_id = claims.id, ?list, added, "article marked");

    Ok(Json(MarkedResponse {
        message: message.to_string(),
        url,
    }))
}
