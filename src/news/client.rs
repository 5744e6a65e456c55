use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::NewsError;
use crate::models::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PublishedAt,
    Relevancy,
}

impl SortBy {
    fn as_param(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
        }
    }
}

/// One request against the provider's `everything` endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    pub q: String,
    pub language: Option<String>,
    pub sort_by: SortBy,
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    articles: Option<Vec<Article>>,
}

/// HTTP client for the external news provider
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NewsError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Run a query, returning `None` when the response carries no `articles`.
    ///
    /// Non-success statuses and transport failures are [`NewsError::Network`];
    /// a body that is not JSON is [`NewsError::Malformed`].
    pub async fn fetch(&self, query: &NewsQuery) -> Result<Option<Vec<Article>>, NewsError> {
        let page_size = query.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query.q.as_str()),
            ("sortBy", query.sort_by.as_param()),
            ("pageSize", page_size.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];
        if let Some(language) = &query.language {
            params.push(("language", language.as_str()));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        let body: ProviderResponse = serde_json::from_slice(&bytes)
            .map_err(|e| NewsError::Malformed(e.to_string()))?;

        Ok(body.articles)
    }
}
