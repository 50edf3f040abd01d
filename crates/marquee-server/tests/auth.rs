mod common;

use common::{basic_auth, bearer, login, signup, spawn_app};

#[tokio::test]
async fn signup_assigns_sequential_user_ids() {
    let app = spawn_app().await;

    let alice = signup(&app.server, "alice", "password-1").await;
    assert_eq!(alice["userid"], 1);
    assert_eq!(alice["username"], "alice");
    assert_eq!(alice["isLoggedIn"], false);
    assert_eq!(alice["uuid"], "");
    assert_eq!(alice["accesstoken"], "");
    // the password hash never leaves the server
    assert!(alice.get("password").is_none());
    assert!(alice.get("password_hash").is_none());

    let bob = signup(&app.server, "bob", "password-2").await;
    assert_eq!(bob["userid"], 2);
}

#[tokio::test]
async fn signup_defaults_username_from_names() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&serde_json::json!({
            "email_address": "grace@example.com",
            "password": "hopper",
            "first_name": "Grace",
            "last_name": "Hopper",
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "Grace_Hopper");
}

#[tokio::test]
async fn signup_rejects_missing_required_fields() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&serde_json::json!({
            "email_address": "x@example.com",
            "password": "secret",
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["message"],
        "Email, password, first name, and last name are required!"
    );
}

#[tokio::test]
async fn login_issues_session_and_token() {
    let app = spawn_app().await;
    signup(&app.server, "carol", "pa55word").await;

    let (name, value) = basic_auth("carol", "pa55word");
    let response = app.server.post("/api/auth/login").add_header(name, value).await;
    assert_eq!(response.status_code().as_u16(), 200);

    let header_token = response
        .headers()
        .get("access-token")
        .expect("access-token header")
        .to_str()
        .unwrap()
        .to_string();

    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "carol");
    assert_eq!(body["isLoggedIn"], true);
    assert_eq!(body["access-token"], header_token.as_str());
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected_without_a_session() {
    let app = spawn_app().await;
    signup(&app.server, "dave", "right-password").await;

    let (name, value) = basic_auth("dave", "wrong-password");
    let response = app.server.post("/api/auth/login").add_header(name, value).await;
    assert_eq!(response.status_code().as_u16(), 401);

    // no session identifier was minted
    let lookup = app.server.get("/api/users/dave").await;
    let body: serde_json::Value = lookup.json();
    assert_eq!(body["user"]["uuid"], "");
    assert_eq!(body["user"]["isLoggedIn"], false);
}

#[tokio::test]
async fn login_with_unknown_username_is_rejected() {
    let app = spawn_app().await;

    let (name, value) = basic_auth("nobody", "whatever");
    let response = app.server.post("/api/auth/login").add_header(name, value).await;
    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn login_without_basic_header_is_a_bad_request() {
    let app = spawn_app().await;

    let response = app.server.post("/api/auth/login").await;
    assert_eq!(response.status_code().as_u16(), 400);

    // credentials without a colon are incomplete
    let (name, value) = common::auth_header("Basic bm9jb2xvbg");
    let response = app.server.post("/api/auth/login").add_header(name, value).await;
    assert_eq!(response.status_code().as_u16(), 400);
}

#[tokio::test]
async fn logout_with_unknown_session_is_not_found() {
    let app = spawn_app().await;

    let response = app.server.post("/api/auth/logout/no-such-session").await;
    assert_eq!(response.status_code().as_u16(), 404);
}

#[tokio::test]
async fn logout_invalidates_session_and_token() {
    let app = spawn_app().await;
    signup(&app.server, "erin", "secret-pw").await;
    let (session_uuid, token) = login(&app.server, "erin", "secret-pw").await;

    let response = app
        .server
        .post(&format!("/api/auth/logout/{session_uuid}"))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);

    // the old token no longer opens the gate
    let (name, value) = bearer(&token);
    let me = app.server.get("/api/auth/me").add_header(name, value).await;
    assert_eq!(me.status_code().as_u16(), 401);

    // and both identifiers are blanked on the record
    let lookup = app.server.get("/api/users/erin").await;
    let body: serde_json::Value = lookup.json();
    assert_eq!(body["user"]["uuid"], "");
    assert_eq!(body["user"]["accesstoken"], "");
    assert_eq!(body["user"]["isLoggedIn"], false);

    // a second logout on the same uuid finds nothing
    let again = app
        .server
        .post(&format!("/api/auth/logout/{session_uuid}"))
        .await;
    assert_eq!(again.status_code().as_u16(), 404);
}

#[tokio::test]
async fn me_returns_the_profile_for_a_valid_token() {
    let app = spawn_app().await;
    signup(&app.server, "frank", "secret-pw").await;
    let (session_uuid, token) = login(&app.server, "frank", "secret-pw").await;

    let (name, value) = bearer(&token);
    let response = app.server.get("/api/auth/me").add_header(name, value).await;
    assert_eq!(response.status_code().as_u16(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], session_uuid.as_str());
    assert_eq!(body["username"], "frank");
    assert_eq!(body["isLoggedIn"], true);
}

#[tokio::test]
async fn me_without_a_token_is_unauthorized() {
    let app = spawn_app().await;

    let response = app.server.get("/api/auth/me").await;
    assert_eq!(response.status_code().as_u16(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Authentication token is required!");
}

#[tokio::test]
async fn session_check_reports_validity() {
    let app = spawn_app().await;
    signup(&app.server, "gina", "secret-pw").await;
    let (session_uuid, token) = login(&app.server, "gina", "secret-pw").await;

    let response = app.server.get("/api/auth/session").await;
    assert_eq!(response.status_code().as_u16(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["valid"], false);

    let (name, value) = bearer(&token);
    let response = app
        .server
        .get("/api/auth/session")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["valid"], true);
    assert_eq!(body["userId"], session_uuid.as_str());

    let (name, value) = bearer("bogus-token");
    let response = app
        .server
        .get("/api/auth/session")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code().as_u16(), 401);
}
