//! Task & News Server Library
//!
//! Task CRUD over a JSON file, user accounts with bearer tokens, and a cached
//! proxy to an external news search API.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod news;
pub mod repository;
pub mod routes;
pub mod security;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};

use std::sync::Arc;

use crate::constants::NEWS_CACHE_TTL_SECS;
use crate::models::{TaskSnapshot, UserSnapshot};
use crate::news::{NewsCache, NewsClient, NewsService};
use crate::repository::{TaskRepository, UserRepository};
use crate::storage::JsonFileStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskRepository>,
    pub users: Arc<UserRepository>,
    pub news: Arc<NewsService>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState from already loaded components
    pub fn new(
        tasks: Arc<TaskRepository>,
        users: Arc<UserRepository>,
        news: Arc<NewsService>,
        config: Config,
    ) -> Self {
        Self {
            tasks,
            users,
            news,
            config,
        }
    }

    /// Load both collections from their JSON files and set up the news client
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let task_store: JsonFileStore<TaskSnapshot> = JsonFileStore::new(&config.tasks_path);
        let user_store: JsonFileStore<UserSnapshot> = JsonFileStore::new(&config.users_path);

        let tasks = TaskRepository::load(Arc::new(task_store)).await?;
        let users = UserRepository::load(Arc::new(user_store)).await?;

        let client = NewsClient::new(
            config.news_api_url.clone(),
            config.news_api_key.clone(),
            config.news_request_timeout(),
        )?;
        let cache = NewsCache::new(chrono::Duration::seconds(NEWS_CACHE_TTL_SECS));

        Ok(Self::new(
            Arc::new(tasks),
            Arc::new(users),
            Arc::new(NewsService::new(client, cache)),
            config,
        ))
    }
}
