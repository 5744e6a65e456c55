use chrono::Utc;

use super::cache::NewsCache;
use super::client::{NewsClient, NewsQuery, SortBy};
use super::NewsError;
use crate::constants::{DEFAULT_NEWS_LANGUAGE, DEFAULT_NEWS_QUERY, NEWS_PAGE_SIZE};
use crate::models::{Article, Preferences};

/// Build the provider query for a user's preferences
///
/// Categories are OR-joined (default `general`); only the first preferred
/// language is used (default `en`).
pub fn preference_query(preferences: &Preferences) -> NewsQuery {
    let q = if preferences.categories.is_empty() {
        DEFAULT_NEWS_QUERY.to_string()
    } else {
        preferences.categories.join(" OR ")
    };

    let language = preferences
        .languages
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_NEWS_LANGUAGE.to_string());

    NewsQuery {
        q,
        language: Some(language),
        sort_by: SortBy::PublishedAt,
        page_size: NEWS_PAGE_SIZE,
    }
}

/// News retrieval with a per-user freshness cache in front of the provider
#[derive(Debug)]
pub struct NewsService {
    client: NewsClient,
    cache: NewsCache,
}

impl NewsService {
    pub fn new(client: NewsClient, cache: NewsCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    /// Latest articles for a user, served from cache while fresh
    pub async fn articles_for_user(
        &self,
        user_id: u64,
        preferences: &Preferences,
    ) -> Result<Vec<Article>, NewsError> {
        if let Some(articles) = self.cache.get_fresh(user_id, Utc::now()).await {
            tracing::debug!(user_id, "news cache hit");
            return Ok(articles);
        }

        let query = preference_query(preferences);
        let articles = self
            .client
            .fetch(&query)
            .await?
            .ok_or_else(|| NewsError::Malformed("response has no articles".to_string()))?;

        self.cache.insert(user_id, articles.clone(), Utc::now()).await;
        tracing::debug!(user_id, count = articles.len(), "news cache refreshed");

        Ok(articles)
    }

    /// Re-query the provider and overwrite the user's cache entry regardless
    /// of its freshness. Returns the number of cached articles.
    pub async fn refresh_user(
        &self,
        user_id: u64,
        preferences: &Preferences,
    ) -> Result<usize, NewsError> {
        let query = preference_query(preferences);
        let articles = self.client.fetch(&query).await?.unwrap_or_default();
        let count = articles.len();

        self.cache.insert(user_id, articles, Utc::now()).await;
        Ok(count)
    }

    /// Keyword search, always hitting the provider
    pub async fn search(&self, keyword: &str) -> Result<Vec<Article>, NewsError> {
        let query = NewsQuery {
            q: keyword.to_string(),
            language: None,
            sort_by: SortBy::Relevancy,
            page_size: NEWS_PAGE_SIZE,
        };

        Ok(self.client.fetch(&query).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_query_defaults() {
        let query = preference_query(&Preferences::default());

        assert_eq!(query.q, "general");
        assert_eq!(query.language.as_deref(), Some("en"));
        assert_eq!(query.sort_by, SortBy::PublishedAt);
        assert_eq!(query.page_size, 5);
    }

    #[test]
    fn test_preference_query_joins_categories() {
        let preferences = Preferences {
            categories: vec!["tech".into(), "sports".into()],
            languages: vec!["de".into(), "en".into()],
        };

        let query = preference_query(&preferences);
        assert_eq!(query.q, "tech OR sports");
        assert_eq!(query.language.as_deref(), Some("de"));
    }
}
