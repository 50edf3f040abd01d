use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{password, session};
use crate::error::{AppError, AppResult};
use crate::models::{BookingRequest, Coupon, User, UserProfile};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email_address: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub mobile_number: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "coupens", default)]
    pub coupons: Vec<Coupon>,
    #[serde(rename = "bookingRequests", default)]
    pub booking_requests: Vec<BookingRequest>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> AppResult<Json<User>> {
    let missing = |field: &Option<String>| field.as_deref().map_or(true, str::is_empty);
    if missing(&body.email_address)
        || missing(&body.password)
        || missing(&body.first_name)
        || missing(&body.last_name)
    {
        return Err(AppError::BadRequest(
            "Email, password, first name, and last name are required!".to_string(),
        ));
    }

    let email = body.email_address.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    let first_name = body.first_name.unwrap_or_default();
    let last_name = body.last_name.unwrap_or_default();
    let username = body
        .username
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("{first_name}_{last_name}"));
    let role = body.role.unwrap_or_else(|| "user".to_string());

    let password_hash = password::hash_password(&password)?;
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    let conn = state.db.get()?;

    // Numeric user ids are issued as max + 1; the subquery keeps the read
    // and the insert in one statement.
    conn.execute(
        "INSERT INTO users (id, userid, email, first_name, last_name, username, contact, password_hash, role, is_logged_in, uuid, access_token, coupons, booking_requests, created_at)
         VALUES (?1, (SELECT COALESCE(MAX(userid), 0) + 1 FROM users), ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, '', '', ?9, ?10, ?11)",
        rusqlite::params![
            id,
            email,
            first_name,
            last_name,
            username,
            body.mobile_number,
            password_hash,
            role,
            serde_json::to_string(&body.coupons)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            serde_json::to_string(&body.booking_requests)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            now,
        ],
    )?;

    let user = conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        rusqlite::params![id],
        User::from_row,
    )?;

    Ok(Json(user))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let (username, password) = decode_basic_auth(&headers)?;

    let conn = state.db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", User::COLUMNS),
            rusqlite::params![username],
            User::from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            e => AppError::Database(e),
        })?;

    if !password::verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let creds = session::issue_session(&conn, &user.id)?;

    // Token rides both the response header and the body.
    let body = json!({
        "id": creds.session_uuid,
        "username": user.username,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "email": user.email,
        "isLoggedIn": true,
        "access-token": creds.access_token.clone(),
    });

    Ok(([("access-token", creds.access_token)], Json(body)))
}

fn decode_basic_auth(headers: &HeaderMap) -> AppResult<(String, String)> {
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .ok_or_else(|| {
            AppError::BadRequest("Authentication header is required!".to_string())
        })?;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| {
            AppError::BadRequest("Authentication header is required!".to_string())
        })?;

    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        AppError::BadRequest("Username and password are required!".to_string())
    })?;
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required!".to_string(),
        ));
    }

    Ok((username.to_string(), password.to_string()))
}

pub async fn logout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    if !session::revoke_session(&conn, &id)? {
        return Err(AppError::NotFound(format!("User not found with uuid={id}")));
    }
    Ok(Json(json!({ "message": "User logged out successfully" })))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}

/// Session check is deliberately soft: it never errors, it reports validity.
pub async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "message": "No authentication token provided" })),
        )
            .into_response());
    };

    let conn = state.db.get()?;
    match session::resolve_token(&conn, token)? {
        Some(user) if user.is_logged_in => Ok(Json(json!({
            "valid": true,
            "userId": user.uuid,
            "message": "Session is valid",
        }))
        .into_response()),
        _ => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "message": "Invalid or expired session" })),
        )
            .into_response()),
    }
}
