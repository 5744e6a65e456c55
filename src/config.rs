use std::env;
use std::time::Duration;

use crate::constants::{NEWS_REFRESH_INTERVAL_SECS, PASSWORD_HASH_ROUNDS};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub tasks_path: String,
    pub users_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub password_hash_rounds: u32,
    pub news_api_key: String,
    pub news_api_url: String,
    pub news_request_timeout_secs: u64,
    pub news_refresh_interval_secs: u64,
    pub admin_usernames: Vec<String>,
    pub log_requests: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let tasks_path =
            env::var("TASKS_PATH").unwrap_or_else(|_| "./data/tasks.json".to_string());
        let users_path =
            env::var("USERS_PATH").unwrap_or_else(|_| "./data/users.json".to_string());

        let allowed_origins = split_list(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set for token signing")?;

        let password_hash_rounds = env::var("PASSWORD_HASH_ROUNDS")
            .unwrap_or_else(|_| PASSWORD_HASH_ROUNDS.to_string())
            .parse()
            .map_err(|_| "Invalid PASSWORD_HASH_ROUNDS")?;

        let news_api_key = env::var("NEWS_API_KEY").unwrap_or_default();
        if news_api_key.is_empty() {
            tracing::warn!("NEWS_API_KEY is not set; news requests will be rejected upstream");
        }

        let news_api_url = env::var("NEWS_API_URL")
            .unwrap_or_else(|_| "https://newsapi.org/v2/everything".to_string());

        let news_request_timeout_secs = env::var("NEWS_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "Invalid NEWS_REQUEST_TIMEOUT_SECS")?;

        let news_refresh_interval_secs = env::var("NEWS_REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| NEWS_REFRESH_INTERVAL_SECS.to_string())
            .parse()
            .map_err(|_| "Invalid NEWS_REFRESH_INTERVAL_SECS")?;

        let admin_usernames = split_list(&env::var("ADMIN_USERNAMES").unwrap_or_default());

        let log_requests = env::var("LOG_REQUESTS")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| "Invalid LOG_REQUESTS")?;

        Ok(Config {
            server_host,
            server_port,
            tasks_path,
            users_path,
            allowed_origins,
            environment,
            jwt_secret,
            password_hash_rounds,
            news_api_key,
            news_api_url,
            news_request_timeout_secs,
            news_refresh_interval_secs,
            admin_usernames,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn news_request_timeout(&self) -> Duration {
        Duration::from_secs(self.news_request_timeout_secs)
    }

    pub fn news_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.news_refresh_interval_secs)
    }

    /// Whether a newly registered username should receive the admin role
    pub fn is_admin_username(&self, username: &str) -> bool {
        self.admin_usernames
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(username))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
