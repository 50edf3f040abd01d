use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Genre;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListGenresQuery {
    pub search: Option<String>,
}

// Genre listing is not paginated; the collection is small by nature.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListGenresQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let genres: Result<Vec<_>, _> = match query.search {
        Some(ref search) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM genres WHERE genre LIKE '%' || ?1 || '%' ORDER BY genreid",
                Genre::COLUMNS
            ))?;
            let rows = stmt.query_map(rusqlite::params![search], Genre::from_row)?;
            rows.collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM genres ORDER BY genreid",
                Genre::COLUMNS
            ))?;
            let rows = stmt.query_map([], Genre::from_row)?;
            rows.collect()
        }
    };

    Ok(Json(json!({ "genres": genres? })))
}

#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub genreid: Option<i64>,
    pub genre: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateGenreRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let genre_name = body
        .genre
        .filter(|g| !g.is_empty())
        .ok_or_else(|| AppError::BadRequest("Genre name is required".to_string()))?;
    let genreid = body
        .genreid
        .ok_or_else(|| AppError::BadRequest("Genre ID is required".to_string()))?;

    let genre = Genre {
        id: Uuid::new_v4().to_string(),
        genreid,
        genre: genre_name,
    };

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO genres (id, genreid, genre) VALUES (?1, ?2, ?3)",
        rusqlite::params![genre.id, genre.genreid, genre.genre],
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Genre created successfully",
            "genre": genre,
        })),
    ))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let genreid = parse_genre_id(&id)?;

    let conn = state.db.get()?;
    let genre = find_by_genreid(&conn, genreid)?
        .ok_or_else(|| AppError::NotFound(format!("Genre not found with id {id}")))?;

    Ok(Json(json!({ "genre": genre })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGenreRequest {
    pub genre: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    let genreid = parse_genre_id(&id)?;
    if body.as_object().map_or(true, |m| m.is_empty()) {
        return Err(AppError::BadRequest(
            "Update data cannot be empty".to_string(),
        ));
    }
    let body: UpdateGenreRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid update payload: {e}")))?;

    let conn = state.db.get()?;
    let existing = find_by_genreid(&conn, genreid)?.ok_or_else(|| {
        AppError::NotFound(format!("Cannot update Genre with id={id}. Genre not found."))
    })?;

    let genre = Genre {
        id: existing.id,
        genreid: existing.genreid,
        genre: body.genre.unwrap_or(existing.genre),
    };

    conn.execute(
        "UPDATE genres SET genre = ?1 WHERE id = ?2",
        rusqlite::params![genre.genre, genre.id],
    )?;

    Ok(Json(json!({
        "message": "Genre updated successfully",
        "genre": genre,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let genreid = parse_genre_id(&id)?;

    let conn = state.db.get()?;
    let genre = find_by_genreid(&conn, genreid)?.ok_or_else(|| {
        AppError::NotFound(format!("Cannot delete Genre with id={id}. Genre not found."))
    })?;

    conn.execute(
        "DELETE FROM genres WHERE id = ?1",
        rusqlite::params![genre.id],
    )?;

    Ok(Json(json!({
        "message": "Genre deleted successfully",
        "genre": genre,
    })))
}

fn parse_genre_id(id: &str) -> AppResult<i64> {
    id.parse::<i64>()
        .map_err(|_| AppError::BadRequest("Invalid genre ID format".to_string()))
}

fn find_by_genreid(conn: &rusqlite::Connection, genreid: i64) -> AppResult<Option<Genre>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM genres WHERE genreid = ?1", Genre::COLUMNS),
        rusqlite::params![genreid],
        Genre::from_row,
    );
    match result {
        Ok(genre) => Ok(Some(genre)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
