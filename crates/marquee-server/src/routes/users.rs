use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::AppState;

pub async fn list(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY userid",
        User::COLUMNS
    ))?;
    let rows = stmt.query_map([], User::from_row)?;
    let users: Result<Vec<_>, _> = rows.collect();
    let users = users?;

    Ok(Json(json!({
        "users": users,
        "page": 1,
        "limit": users.len(),
        "total": users.len(),
    })))
}

/// The path identifier is forgiving: storage id, numeric user id, username
/// and session uuid are all accepted.
pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let numeric_id = id.parse::<i64>().unwrap_or(-1);

    let conn = state.db.get()?;
    let user = conn
        .query_row(
            &format!(
                "SELECT {} FROM users WHERE id = ?1 OR username = ?1 OR (uuid = ?1 AND uuid != '') OR userid = ?2",
                User::COLUMNS
            ),
            rusqlite::params![id, numeric_id],
            User::from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound(format!("User not found with id {id}"))
            }
            e => AppError::Database(e),
        })?;

    Ok(Json(json!({
        "user": user,
        "coupens": user.coupons,
        "bookingRequests": user.booking_requests,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub contact: Option<String>,
    pub role: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    if body.as_object().map_or(true, |m| m.is_empty()) {
        return Err(AppError::BadRequest(
            "Data to update can not be empty!".to_string(),
        ));
    }
    let body: UpdateUserRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid update payload: {e}")))?;

    let conn = state.db.get()?;
    let existing = find_by_storage_id(&conn, &id)?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Cannot update User with id={id}. Maybe User was not found!"
        ))
    })?;

    let email = body.email.unwrap_or(existing.email);
    let first_name = body.first_name.unwrap_or(existing.first_name);
    let last_name = body.last_name.unwrap_or(existing.last_name);
    let username = body.username.unwrap_or(existing.username);
    let contact = body.contact.or(existing.contact);
    let role = body.role.unwrap_or(existing.role);

    conn.execute(
        "UPDATE users SET email = ?1, first_name = ?2, last_name = ?3, username = ?4, contact = ?5, role = ?6 WHERE id = ?7",
        rusqlite::params![email, first_name, last_name, username, contact, role, id],
    )?;

    let user = find_by_storage_id(&conn, &id)?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Cannot update User with id={id}. Maybe User was not found!"
        ))
    })?;

    Ok(Json(json!({
        "message": "User was updated successfully.",
        "user": user,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let user = find_by_storage_id(&conn, &id)?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Cannot delete User with id={id}. Maybe User was not found!"
        ))
    })?;

    conn.execute("DELETE FROM users WHERE id = ?1", rusqlite::params![id])?;

    Ok(Json(json!({
        "message": "User was deleted successfully!",
        "user": user,
    })))
}

pub async fn coupons(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let user = find_by_storage_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound(format!("User not found with id {id}")))?;

    if !user.is_logged_in {
        return Err(AppError::Unauthorized(
            "User must be logged in to get coupon".to_string(),
        ));
    }

    Ok(Json(json!({
        "coupens": user.coupons,
        "page": 1,
        "limit": user.coupons.len(),
        "total": user.coupons.len(),
    })))
}

fn find_by_storage_id(conn: &rusqlite::Connection, id: &str) -> AppResult<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        rusqlite::params![id],
        User::from_row,
    );
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
