use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::Article;

#[derive(Debug, Clone)]
pub struct NewsCacheEntry {
    pub articles: Vec<Article>,
    pub timestamp: DateTime<Utc>,
}

impl NewsCacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp < ttl
    }
}

/// Most recent news result per user id, process lifetime only
#[derive(Debug)]
pub struct NewsCache {
    entries: RwLock<HashMap<u64, NewsCacheEntry>>,
    ttl: Duration,
}

impl NewsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached articles for `user_id` if younger than the freshness window
    pub async fn get_fresh(&self, user_id: u64, now: DateTime<Utc>) -> Option<Vec<Article>> {
        let entries = self.entries.read().await;
        entries
            .get(&user_id)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.articles.clone())
    }

    /// Store `articles` for `user_id`, replacing any previous entry
    pub async fn insert(&self, user_id: u64, articles: Vec<Article>, now: DateTime<Utc>) {
        self.entries.write().await.insert(
            user_id,
            NewsCacheEntry {
                articles,
                timestamp: now,
            },
        );
    }

    pub async fn entry(&self, user_id: u64) -> Option<NewsCacheEntry> {
        self.entries.read().await.get(&user_id).cloned()
    }
}
