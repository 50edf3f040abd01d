use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Artist;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListArtistsQuery {
    pub search: Option<String>,
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListArtistsQuery>,
) -> AppResult<Json<Vec<Artist>>> {
    let page = query.page.unwrap_or(1).max(1);
    // A missing or non-positive limit falls back to the default page size.
    let limit = query.limit.filter(|l| *l > 0).unwrap_or(5);
    let offset = (page - 1) * limit;

    let mut where_clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref search) = query.search {
        params.push(Box::new(search.clone()));
        where_clauses.push(format!(
            "(first_name LIKE '%' || ?{n} || '%' OR last_name LIKE '%' || ?{n} || '%')",
            n = params.len()
        ));
    }
    if let Some(ref name) = query.name {
        let mut parts = name.splitn(2, ' ');
        if let Some(first) = parts.next().filter(|s| !s.is_empty()) {
            params.push(Box::new(first.to_string()));
            where_clauses.push(format!("first_name LIKE '%' || ?{} || '%'", params.len()));
        }
        if let Some(last) = parts.next().filter(|s| !s.is_empty()) {
            params.push(Box::new(last.to_string()));
            where_clauses.push(format!("last_name LIKE '%' || ?{} || '%'", params.len()));
        }
    }

    let where_clause = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };

    params.push(Box::new(limit));
    let limit_idx = params.len();
    params.push(Box::new(offset));
    let offset_idx = params.len();

    let conn = state.db.get()?;
    let sql = format!(
        "SELECT {} FROM artists {where_clause} ORDER BY artistid LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
        Artist::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
        Artist::from_row,
    )?;
    let artists: Result<Vec<_>, _> = rows.collect();

    Ok(Json(artists?))
}

#[derive(Debug, Deserialize)]
pub struct CreateArtistRequest {
    pub artistid: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub wiki_url: Option<String>,
    pub profile_url: Option<String>,
    pub movies: Option<Vec<serde_json::Value>>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateArtistRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let first_name = body
        .first_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("First name is required".to_string()))?;
    let last_name = body
        .last_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Last name is required".to_string()))?;
    let artistid = body
        .artistid
        .ok_or_else(|| AppError::BadRequest("Artist ID is required".to_string()))?;

    let artist = Artist {
        id: Uuid::new_v4().to_string(),
        artistid,
        first_name,
        last_name,
        wiki_url: body.wiki_url.unwrap_or_default(),
        profile_url: body.profile_url.unwrap_or_default(),
        movies: body.movies.unwrap_or_default(),
    };

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO artists (id, artistid, first_name, last_name, wiki_url, profile_url, movies)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            artist.id,
            artist.artistid,
            artist.first_name,
            artist.last_name,
            artist.wiki_url,
            artist.profile_url,
            serde_json::to_string(&artist.movies)
                .map_err(|e| AppError::Internal(e.to_string()))?,
        ],
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Artist created successfully",
            "artist": artist,
        })),
    ))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let artistid = parse_artist_id(&id)?;

    let conn = state.db.get()?;
    let artist = find_by_artistid(&conn, artistid)?
        .ok_or_else(|| AppError::NotFound(format!("Artist not found with id {id}")))?;

    Ok(Json(json!({ "artist": artist })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtistRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub wiki_url: Option<String>,
    pub profile_url: Option<String>,
    pub movies: Option<Vec<serde_json::Value>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    let artistid = parse_artist_id(&id)?;
    if body.as_object().map_or(true, |m| m.is_empty()) {
        return Err(AppError::BadRequest(
            "Update data cannot be empty".to_string(),
        ));
    }
    let body: UpdateArtistRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid update payload: {e}")))?;

    let conn = state.db.get()?;
    let existing = find_by_artistid(&conn, artistid)?.ok_or_else(|| {
        AppError::NotFound(format!("Cannot update Artist with id={id}. Artist not found."))
    })?;

    let artist = Artist {
        id: existing.id,
        artistid: existing.artistid,
        first_name: body.first_name.unwrap_or(existing.first_name),
        last_name: body.last_name.unwrap_or(existing.last_name),
        wiki_url: body.wiki_url.unwrap_or(existing.wiki_url),
        profile_url: body.profile_url.unwrap_or(existing.profile_url),
        movies: body.movies.unwrap_or(existing.movies),
    };

    conn.execute(
        "UPDATE artists SET first_name = ?1, last_name = ?2, wiki_url = ?3, profile_url = ?4, movies = ?5 WHERE id = ?6",
        rusqlite::params![
            artist.first_name,
            artist.last_name,
            artist.wiki_url,
            artist.profile_url,
            serde_json::to_string(&artist.movies)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            artist.id,
        ],
    )?;

    Ok(Json(json!({
        "message": "Artist updated successfully",
        "artist": artist,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let artistid = parse_artist_id(&id)?;

    let conn = state.db.get()?;
    let artist = find_by_artistid(&conn, artistid)?.ok_or_else(|| {
        AppError::NotFound(format!("Cannot delete Artist with id={id}. Artist not found."))
    })?;

    conn.execute(
        "DELETE FROM artists WHERE id = ?1",
        rusqlite::params![artist.id],
    )?;

    Ok(Json(json!({
        "message": "Artist deleted successfully",
        "artist": artist,
    })))
}

fn parse_artist_id(id: &str) -> AppResult<i64> {
    id.parse::<i64>()
        .map_err(|_| AppError::BadRequest("Invalid artist ID format".to_string()))
}

fn find_by_artistid(conn: &rusqlite::Connection, artistid: i64) -> AppResult<Option<Artist>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM artists WHERE artistid = ?1", Artist::COLUMNS),
        rusqlite::params![artistid],
        Artist::from_row,
    );
    match result {
        Ok(artist) => Ok(Some(artist)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
