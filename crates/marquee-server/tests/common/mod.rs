#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use base64::Engine;
use tempfile::TempDir;

use marquee_server::config::Config;
use marquee_server::db;
use marquee_server::routes::{create_router, AppState};

pub struct TestApp {
    pub server: TestServer,
    // Keeps the database file alive for the duration of the test.
    _data_dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let sqlite_path = data_dir
        .path()
        .join("marquee-test.db")
        .to_string_lossy()
        .into_owned();

    let config = Config {
        server_port: 0,
        sqlite_path: sqlite_path.clone(),
        cors_origin: "http://localhost:3000".to_string(),
    };
    let state = AppState {
        db: db::create_pool(&sqlite_path),
        config,
    };

    TestApp {
        server: TestServer::new(create_router(state)).expect("Failed to start test server"),
        _data_dir: data_dir,
    }
}

pub fn auth_header(value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(value).expect("header value"),
    )
}

pub fn basic_auth(username: &str, password: &str) -> (HeaderName, HeaderValue) {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    auth_header(&format!("Basic {encoded}"))
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    auth_header(&format!("Bearer {token}"))
}

/// Sign up a user and return the signup response body.
pub async fn signup(server: &TestServer, username: &str, password: &str) -> serde_json::Value {
    let response = server
        .post("/api/auth/signup")
        .json(&serde_json::json!({
            "email_address": format!("{username}@example.com"),
            "password": password,
            "first_name": "Test",
            "last_name": "User",
            "username": username,
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    response.json()
}

/// Log in via Basic auth and return (session uuid, access token).
pub async fn login(server: &TestServer, username: &str, password: &str) -> (String, String) {
    let (name, value) = basic_auth(username, password);
    let response = server
        .post("/api/auth/login")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let body: serde_json::Value = response.json();
    (
        body["id"].as_str().expect("session uuid").to_string(),
        body["access-token"].as_str().expect("access token").to_string(),
    )
}
