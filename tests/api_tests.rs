use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use ratings_api::api::{create_router, AppState};
use ratings_api::db::{
    MemoryRepository, MemorySessionStore, RatingsRepository, SessionStore, SessionToken,
};
use ratings_api::error::{AppError, AppResult};
use ratings_api::models::{Movie, NewMovie, UserId};

struct TestApp {
    server: TestServer,
    repo: Arc<MemoryRepository>,
}

/// Session store standing in for an unreachable Redis
struct UnavailableSessionStore;

#[async_trait::async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn create(&self, _user_id: UserId) -> AppResult<SessionToken> {
        Err(AppError::Internal("session store unavailable".to_string()))
    }

    async fn resolve(&self, _token: &SessionToken) -> AppResult<Option<UserId>> {
        Err(AppError::Internal("session store unavailable".to_string()))
    }

    async fn revoke(&self, _token: &SessionToken) -> AppResult<()> {
        Err(AppError::Internal("session store unavailable".to_string()))
    }

    fn ttl_secs(&self) -> u64 {
        0
    }
}

fn create_test_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(repo.clone(), Arc::new(MemorySessionStore::new(3600)));
    let server = TestServer::new(create_router(state)).unwrap();
    TestApp { server, repo }
}

async fn add_movie(app: &TestApp, title: &str) -> Movie {
    app.repo
        .create_movie(NewMovie {
            title: title.to_string(),
            released_at: Utc.with_ymd_and_hms(1996, 3, 8, 0, 0, 0).unwrap(),
            imdb_url: format!("http://www.imdb.com/title/{}", title),
        })
        .await
        .unwrap()
}

/// Registers and logs in a user, returning the `Cookie` header value for their session
async fn sign_up(app: &TestApp, email: &str) -> HeaderValue {
    app.server
        .post("/register")
        .json(&json!({ "email": email, "password": "pw" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/login")
        .json(&json!({ "email": email, "password": "pw" }))
        .await;
    response.assert_status_ok();

    let set_cookie = response.header(header::SET_COOKIE);
    let cookie = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
    HeaderValue::from_str(&cookie).unwrap()
}

fn cookie_header() -> HeaderName {
    header::COOKIE
}

async fn rate(app: &TestApp, cookie: &HeaderValue, movie: &Movie, score: i32) {
    app.server
        .post(&format!("/movies/{}/rating", movie.movie_id))
        .add_header(cookie_header(), cookie.clone())
        .json(&json!({ "score": score }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_and_list_users() {
    let app = create_test_app();

    let response = app
        .server
        .post("/register")
        .json(&json!({
            "email": "ada@example.com",
            "password": "secret",
            "age": 36,
            "zipcode": "94110"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["email"], "ada@example.com");
    assert_eq!(created["age"], 36);
    assert!(created.get("password").is_none());

    let response = app.server.get("/users").await;
    response.assert_status_ok();
    let users: Vec<Value> = response.json();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["zipcode"], "94110");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_test_app();
    let body = json!({ "email": "ada@example.com", "password": "secret" });

    app.server.post("/register").json(&body).await.assert_status(StatusCode::CREATED);

    let response = app.server.post("/register").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["code"], "CONFLICT");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = create_test_app();
    app.server
        .post("/register")
        .json(&json!({ "email": "ada@example.com", "password": "secret" }))
        .await;

    let response = app
        .server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "guess" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = create_test_app();
    let cookie = sign_up(&app, "ada@example.com").await;

    let response = app
        .server
        .get("/me")
        .add_header(cookie_header(), cookie.clone())
        .await;
    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["email"], "ada@example.com");

    app.server
        .post("/logout")
        .add_header(cookie_header(), cookie.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/me")
        .add_header(cookie_header(), cookie)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = create_test_app();
    let response = app.server.get("/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let error: Value = response.json();
    assert_eq!(error["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app();
    let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    let response = app
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_list_and_get_movies() {
    let app = create_test_app();
    add_movie(&app, "Twelve Monkeys").await;
    let heat = add_movie(&app, "Heat").await;

    let response = app.server.get("/movies").await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["title"], "Heat");

    let response = app.server.get(&format!("/movies/{}", heat.movie_id)).await;
    response.assert_status_ok();
    let detail: Value = response.json();
    assert_eq!(detail["title"], "Heat");
    assert_eq!(detail["ratings"].as_array().unwrap().len(), 0);
    assert!(detail["prediction"].is_null());

    app.server
        .get("/movies/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rate_movie() {
    let app = create_test_app();
    let heat = add_movie(&app, "Heat").await;

    app.server
        .post(&format!("/movies/{}/rating", heat.movie_id))
        .json(&json!({ "score": 4 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let cookie = sign_up(&app, "ada@example.com").await;

    app.server
        .post(&format!("/movies/{}/rating", heat.movie_id))
        .add_header(cookie_header(), cookie.clone())
        .json(&json!({ "score": 9 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/movies/999/rating")
        .add_header(cookie_header(), cookie.clone())
        .json(&json!({ "score": 3 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    rate(&app, &cookie, &heat, 2).await;
    rate(&app, &cookie, &heat, 5).await;

    let response = app
        .server
        .get(&format!("/movies/{}", heat.movie_id))
        .add_header(cookie_header(), cookie)
        .await;
    let detail: Value = response.json();
    assert_eq!(detail["ratings"].as_array().unwrap().len(), 1);
    assert_eq!(detail["user_score"], 5);

    let response = app.server.get("/users/1").await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["ratings"][0]["title"], "Heat");
    assert_eq!(user["ratings"][0]["score"], 5);
}

#[tokio::test]
async fn test_prediction_flow() {
    let app = create_test_app();
    let alien = add_movie(&app, "Alien").await;
    let brazil = add_movie(&app, "Brazil").await;
    let clue = add_movie(&app, "Clue").await;
    let dune = add_movie(&app, "Dune").await;

    let target = sign_up(&app, "target@example.com").await;
    let alike = sign_up(&app, "alike@example.com").await;
    let opposite = sign_up(&app, "opposite@example.com").await;

    for (movie, score) in [(&alien, 5), (&brazil, 1), (&clue, 3)] {
        rate(&app, &target, movie, score).await;
        rate(&app, &alike, movie, score).await;
        rate(&app, &opposite, movie, 6 - score).await;
    }
    rate(&app, &alike, &dune, 4).await;
    rate(&app, &opposite, &dune, 1).await;

    let response = app
        .server
        .get(&format!("/movies/{}/prediction", dune.movie_id))
        .add_header(cookie_header(), target.clone())
        .await;
    response.assert_status_ok();
    let prediction: Value = response.json();
    assert_eq!(prediction["predicted_score"], 4.0);
    assert_eq!(prediction["most_similar_rater"]["user_id"], 2);

    let response = app
        .server
        .get(&format!("/movies/{}", dune.movie_id))
        .add_header(cookie_header(), target)
        .await;
    let detail: Value = response.json();
    assert_eq!(detail["prediction"], 4.0);
    assert!(detail["user_score"].is_null());
}

#[tokio::test]
async fn test_prediction_without_comparable_raters() {
    let app = create_test_app();
    let heat = add_movie(&app, "Heat").await;
    let cookie = sign_up(&app, "ada@example.com").await;

    let response = app
        .server
        .get(&format!("/movies/{}/prediction", heat.movie_id))
        .add_header(cookie_header(), cookie)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = response.json();
    assert_eq!(error["code"], "NO_COMPARABLE_RATERS");
}

#[tokio::test]
async fn test_register_without_email_is_bad_request() {
    let app = create_test_app();

    let response = app
        .server
        .post("/register")
        .json(&json!({ "password": "p" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_fractional_score_is_bad_request() {
    let app = create_test_app();
    let heat = add_movie(&app, "Heat").await;
    let cookie = sign_up(&app, "ada@example.com").await;

    let response = app
        .server
        .post(&format!("/movies/{}/rating", heat.movie_id))
        .add_header(cookie_header(), cookie)
        .json(&json!({ "score": 4.5 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_INPUT");
    assert!(error["error"].as_str().unwrap().contains("score"));
}

#[tokio::test]
async fn test_movie_page_reports_session_store_failure() {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(repo.clone(), Arc::new(UnavailableSessionStore));
    let server = TestServer::new(create_router(state)).unwrap();
    let app = TestApp { server, repo };
    let heat = add_movie(&app, "Heat").await;

    // Without a cookie the store is never consulted
    app.server
        .get(&format!("/movies/{}", heat.movie_id))
        .await
        .assert_status_ok();

    let cookie = format!("ratings_session={}", SessionToken::new());
    let response = app
        .server
        .get(&format!("/movies/{}", heat.movie_id))
        .add_header(cookie_header(), HeaderValue::from_str(&cookie).unwrap())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
