//! News proxy tests against a mock provider

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskfeed_server::models::{Article, Preferences, TaskSnapshot, UserSnapshot};
use taskfeed_server::news::{refresh_all, spawn_refresher, NewsCache, NewsClient, NewsService};
use taskfeed_server::repository::{NewUser, TaskRepository, UserRepository};
use taskfeed_server::storage::MemoryStore;
use taskfeed_server::{routes, AppState, Config};

const TEST_SECRET: &str = "test-secret-key";
const API_KEY: &str = "test-key";

fn test_config(news_api_url: String) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        tasks_path: String::new(),
        users_path: String::new(),
        allowed_origins: vec![],
        environment: "test".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        password_hash_rounds: 1_000,
        news_api_key: API_KEY.to_string(),
        news_api_url,
        news_request_timeout_secs: 2,
        news_refresh_interval_secs: 600,
        admin_usernames: vec![],
        log_requests: false,
    }
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/v2/everything", server.uri())
}

fn news_service(server: &MockServer, ttl: chrono::Duration) -> Arc<NewsService> {
    let client = NewsClient::new(endpoint(server), API_KEY, Duration::from_secs(2)).unwrap();
    Arc::new(NewsService::new(client, NewsCache::new(ttl)))
}

async fn empty_users() -> Arc<UserRepository> {
    Arc::new(
        UserRepository::load(Arc::new(MemoryStore::<UserSnapshot>::new()))
            .await
            .unwrap(),
    )
}

/// Router over in-memory stores with news served from `server`
async fn create_test_app(server: &MockServer, ttl: chrono::Duration) -> Router {
    let tasks = TaskRepository::load(Arc::new(MemoryStore::<TaskSnapshot>::new()))
        .await
        .unwrap();
    let state = AppState::new(
        Arc::new(tasks),
        empty_users().await,
        news_service(server, ttl),
        test_config(endpoint(server)),
    );
    routes::router(state)
}

fn ten_minutes() -> chrono::Duration {
    chrono::Duration::minutes(10)
}

fn articles_body(titles: &[&str]) -> Value {
    let articles: Vec<Value> = titles
        .iter()
        .map(|title| {
            json!({
                "source": { "id": null, "name": "Example Wire" },
                "author": "Staff",
                "title": title,
                "description": "desc",
                "url": format!("https://example.com/{}", title),
                "urlToImage": null,
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": "body"
            })
        })
        .collect();
    json!({ "status": "ok", "totalResults": articles.len(), "articles": articles })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn login(app: &Router) -> String {
    let credentials = json!({ "username": "reader@example.com", "password": "secret1" });
    let (status, _) = send(app, json_request("POST", "/register", None, credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, json_request("POST", "/login", None, credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

// =============================================================================
// GET /news
// =============================================================================

#[tokio::test]
async fn test_news_served_from_cache_within_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "general"))
        .and(query_param("language", "en"))
        .and(query_param("sortBy", "publishedAt"))
        .and(query_param("pageSize", "5"))
        .and(query_param("apiKey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    let (status, first) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["articles"].as_array().unwrap().len(), 2);
    assert_eq!(first["articles"][0]["source"]["name"], "Example Wire");

    let (status, second) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_news_refetched_after_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["a"])))
        .expect(2)
        .mount(&server)
        .await;

    // A zero-length window makes every entry stale immediately
    let app = create_test_app(&server, chrono::Duration::zero()).await;
    let token = login(&app).await;

    send(&app, get_with_token("/news", &token)).await;
    let (status, _) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_news_uses_preferences() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "tech OR sports"))
        .and(query_param("language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["x"])))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/preferences",
            Some(&token),
            json!({ "categories": ["tech", "sports"], "languages": ["de", "en"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"][0]["title"], "x");
}

#[tokio::test]
async fn test_news_relays_articles_unchanged() {
    let server = MockServer::start().await;
    let articles = json!([
        { "title": "a", "sentiment": 0.7, "tags": ["x", "y"] },
        "not-an-object"
    ]);
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "articles": articles.clone() })),
        )
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"], articles);
}

#[tokio::test]
async fn test_news_without_articles_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch articles from NewsAPI");
}

#[tokio::test]
async fn test_news_provider_failure_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get_with_token("/news", &token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error while fetching news");
}

// =============================================================================
// GET /news/search/:keyword
// =============================================================================

#[tokio::test]
async fn test_search_bypasses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "rust lang"))
        .and(query_param("sortBy", "relevancy"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["r"])))
        .expect(2)
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    for _ in 0..2 {
        let (status, body) = send(&app, get_with_token("/news/search/rust%20lang", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["articles"][0]["title"], "r");
    }
}

#[tokio::test]
async fn test_search_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = create_test_app(&server, ten_minutes()).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get_with_token("/news/search/anything", &token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to search news.");
}

// =============================================================================
// Periodic refresh
// =============================================================================

async fn add_user(users: &UserRepository, username: &str, categories: &[&str]) -> u64 {
    let user = users
        .create(NewUser {
            username: username.to_string(),
            password_hash: "unused".to_string(),
            role: None,
        })
        .await
        .unwrap();
    users
        .set_preferences(
            user.id,
            Preferences {
                categories: categories.iter().map(|c| c.to_string()).collect(),
                languages: vec![],
            },
        )
        .await
        .unwrap();
    user.id
}

#[tokio::test]
async fn test_refresh_all_overwrites_fresh_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["new"])))
        .mount(&server)
        .await;

    let users = empty_users().await;
    let news = news_service(&server, ten_minutes());
    let id = add_user(&users, "a@example.com", &[]).await;

    let stale: Article = json!({ "title": "old" });
    news.cache().insert(id, vec![stale], chrono::Utc::now()).await;

    let refreshed = refresh_all(&users, &news).await;
    assert_eq!(refreshed, 1);

    let entry = news.cache().entry(id).await.unwrap();
    assert_eq!(entry.articles.len(), 1);
    assert_eq!(entry.articles[0]["title"], "new");
}

#[tokio::test]
async fn test_refresh_all_continues_past_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "tech"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["t"])))
        .mount(&server)
        .await;

    let users = empty_users().await;
    let news = news_service(&server, ten_minutes());
    let failing = add_user(&users, "a@example.com", &["broken"]).await;
    let working = add_user(&users, "b@example.com", &["tech"]).await;

    let refreshed = refresh_all(&users, &news).await;

    assert_eq!(refreshed, 1);
    assert!(news.cache().entry(failing).await.is_none());
    assert_eq!(news.cache().entry(working).await.unwrap().articles.len(), 1);
}

#[tokio::test]
async fn test_refresh_without_articles_caches_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let users = empty_users().await;
    let news = news_service(&server, ten_minutes());
    let id = add_user(&users, "a@example.com", &[]).await;

    assert_eq!(refresh_all(&users, &news).await, 1);
    assert!(news.cache().entry(id).await.unwrap().articles.is_empty());
}

#[tokio::test]
async fn test_refresher_runs_until_stopped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body(&["p"])))
        .mount(&server)
        .await;

    let users = empty_users().await;
    let news = news_service(&server, ten_minutes());
    let id = add_user(&users, "a@example.com", &[]).await;

    let handle = spawn_refresher(users.clone(), news.clone(), Duration::from_millis(50));

    let populated = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if news.cache().entry(id).await.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(populated.is_ok(), "refresher never populated the cache");

    handle.stop().await.unwrap();
}
