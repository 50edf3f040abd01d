use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Movie;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ListMoviesQuery {
    pub search: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub genres: Option<String>,
    pub artists: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let page = query.page.unwrap_or(1).max(1);
    // A missing or non-positive limit falls back to the default page size.
    let limit = query.limit.filter(|l| *l > 0).unwrap_or(5);
    let offset = (page - 1) * limit;

    let mut where_clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    for term in [&query.search, &query.title].into_iter().flatten() {
        params.push(Box::new(term.clone()));
        where_clauses.push(format!("title LIKE '%' || ?{} || '%'", params.len()));
    }
    if let Some(ref status) = query.status {
        if status.eq_ignore_ascii_case("PUBLISHED") {
            where_clauses.push("published = 1".to_string());
        } else if status.eq_ignore_ascii_case("RELEASED") {
            where_clauses.push("released = 1".to_string());
        }
    }
    // Genres and artists are JSON arrays; a substring match over the stored
    // text mirrors the original regex filter.
    if let Some(ref genres) = query.genres {
        params.push(Box::new(genres.clone()));
        where_clauses.push(format!("genres LIKE '%' || ?{} || '%'", params.len()));
    }
    if let Some(ref artists) = query.artists {
        params.push(Box::new(artists.clone()));
        where_clauses.push(format!("artists LIKE '%' || ?{} || '%'", params.len()));
    }
    if let Some(ref start_date) = query.start_date {
        params.push(Box::new(start_date.clone()));
        where_clauses.push(format!("release_date >= ?{}", params.len()));
    }
    if let Some(ref end_date) = query.end_date {
        params.push(Box::new(end_date.clone()));
        where_clauses.push(format!("release_date <= ?{}", params.len()));
    }

    let where_clause = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };

    let conn = state.db.get()?;
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM movies {where_clause}"),
        rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
        |row| row.get(0),
    )?;

    params.push(Box::new(limit));
    let limit_idx = params.len();
    params.push(Box::new(offset));
    let offset_idx = params.len();

    let sql = format!(
        "SELECT {} FROM movies {where_clause} ORDER BY movieid LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
        Movie::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
        Movie::from_row,
    )?;
    let movies: Result<Vec<_>, _> = rows.collect();

    Ok(Json(json!({
        "movies": movies?,
        "page": page,
        "limit": limit,
        "total": total,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub movieid: Option<i64>,
    pub title: Option<String>,
    pub published: Option<bool>,
    pub released: Option<bool>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub publish_date: Option<String>,
    pub artists: Option<Vec<serde_json::Value>>,
    pub genres: Option<Vec<String>>,
    pub duration: Option<i64>,
    pub critic_rating: Option<f64>,
    pub trailer_url: Option<String>,
    pub wiki_url: Option<String>,
    pub story_line: Option<String>,
    pub shows: Option<Vec<serde_json::Value>>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let title = body
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Title is required".to_string()))?;
    let movieid = body
        .movieid
        .ok_or_else(|| AppError::BadRequest("Movie ID is required".to_string()))?;

    let movie = Movie {
        id: Uuid::new_v4().to_string(),
        movieid,
        title,
        published: body.published.unwrap_or(false),
        released: body.released.unwrap_or(false),
        poster_url: body.poster_url.unwrap_or_default(),
        release_date: body.release_date.unwrap_or_default(),
        publish_date: body.publish_date.unwrap_or_default(),
        artists: body.artists.unwrap_or_default(),
        genres: body.genres.unwrap_or_default(),
        duration: body.duration.unwrap_or(0),
        critic_rating: body.critic_rating.unwrap_or(0.0),
        trailer_url: body.trailer_url.unwrap_or_default(),
        wiki_url: body.wiki_url.unwrap_or_default(),
        story_line: body.story_line.unwrap_or_default(),
        shows: body.shows.unwrap_or_default(),
    };

    let conn = state.db.get()?;
    insert_movie(&conn, &movie)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Movie created successfully",
            "movie": movie,
        })),
    ))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let movieid = id
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest("Invalid movie ID format".to_string()))?;

    let conn = state.db.get()?;
    let movie = find_by_movieid(&conn, movieid)?
        .ok_or_else(|| AppError::NotFound(format!("Movie not found with id {id}")))?;

    Ok(Json(json!({ "movie": movie })))
}

pub async fn find_shows(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    // This route has no bad-request case; an unparseable id is just unknown.
    let movie = id
        .parse::<i64>()
        .ok()
        .map(|movieid| {
            let conn = state.db.get()?;
            find_by_movieid(&conn, movieid)
        })
        .transpose()?
        .flatten()
        .ok_or_else(|| AppError::NotFound(format!("Movie not found with id {id}")))?;

    Ok(Json(json!({ "shows": movie.shows })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub published: Option<bool>,
    pub released: Option<bool>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub publish_date: Option<String>,
    pub artists: Option<Vec<serde_json::Value>>,
    pub genres: Option<Vec<String>>,
    pub duration: Option<i64>,
    pub critic_rating: Option<f64>,
    pub trailer_url: Option<String>,
    pub wiki_url: Option<String>,
    pub story_line: Option<String>,
    pub shows: Option<Vec<serde_json::Value>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    if body.as_object().map_or(true, |m| m.is_empty()) {
        return Err(AppError::BadRequest(
            "Update data cannot be empty".to_string(),
        ));
    }
    let body: UpdateMovieRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid update payload: {e}")))?;

    let conn = state.db.get()?;
    let existing = id
        .parse::<i64>()
        .ok()
        .map(|movieid| find_by_movieid(&conn, movieid))
        .transpose()?
        .flatten()
        .ok_or_else(|| {
            AppError::NotFound(format!("Cannot update Movie with id={id}. Movie not found."))
        })?;

    let movie = Movie {
        id: existing.id,
        movieid: existing.movieid,
        title: body.title.unwrap_or(existing.title),
        published: body.published.unwrap_or(existing.published),
        released: body.released.unwrap_or(existing.released),
        poster_url: body.poster_url.unwrap_or(existing.poster_url),
        release_date: body.release_date.unwrap_or(existing.release_date),
        publish_date: body.publish_date.unwrap_or(existing.publish_date),
        artists: body.artists.unwrap_or(existing.artists),
        genres: body.genres.unwrap_or(existing.genres),
        duration: body.duration.unwrap_or(existing.duration),
        critic_rating: body.critic_rating.unwrap_or(existing.critic_rating),
        trailer_url: body.trailer_url.unwrap_or(existing.trailer_url),
        wiki_url: body.wiki_url.unwrap_or(existing.wiki_url),
        story_line: body.story_line.unwrap_or(existing.story_line),
        shows: body.shows.unwrap_or(existing.shows),
    };

    conn.execute(
        "UPDATE movies SET title = ?1, published = ?2, released = ?3, poster_url = ?4, release_date = ?5, publish_date = ?6, artists = ?7, genres = ?8, duration = ?9, critic_rating = ?10, trailer_url = ?11, wiki_url = ?12, story_line = ?13, shows = ?14 WHERE id = ?15",
        rusqlite::params![
            movie.title,
            movie.published,
            movie.released,
            movie.poster_url,
            movie.release_date,
            movie.publish_date,
            json_text(&movie.artists)?,
            json_text(&movie.genres)?,
            movie.duration,
            movie.critic_rating,
            movie.trailer_url,
            movie.wiki_url,
            movie.story_line,
            json_text(&movie.shows)?,
            movie.id,
        ],
    )?;

    Ok(Json(json!({
        "message": "Movie updated successfully",
        "movie": movie,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let movie = id
        .parse::<i64>()
        .ok()
        .map(|movieid| find_by_movieid(&conn, movieid))
        .transpose()?
        .flatten()
        .ok_or_else(|| {
            AppError::NotFound(format!("Cannot delete Movie with id={id}. Movie not found."))
        })?;

    conn.execute("DELETE FROM movies WHERE id = ?1", rusqlite::params![movie.id])?;

    Ok(Json(json!({
        "message": "Movie deleted successfully",
        "movie": movie,
    })))
}

fn find_by_movieid(conn: &rusqlite::Connection, movieid: i64) -> AppResult<Option<Movie>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM movies WHERE movieid = ?1", Movie::COLUMNS),
        rusqlite::params![movieid],
        Movie::from_row,
    );
    match result {
        Ok(movie) => Ok(Some(movie)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn insert_movie(conn: &rusqlite::Connection, movie: &Movie) -> AppResult<()> {
    conn.execute(
        "INSERT INTO movies (id, movieid, title, published, released, poster_url, release_date, publish_date, artists, genres, duration, critic_rating, trailer_url, wiki_url, story_line, shows)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        rusqlite::params![
            movie.id,
            movie.movieid,
            movie.title,
            movie.published,
            movie.released,
            movie.poster_url,
            movie.release_date,
            movie.publish_date,
            json_text(&movie.artists)?,
            json_text(&movie.genres)?,
            movie.duration,
            movie.critic_rating,
            movie.trailer_url,
            movie.wiki_url,
            movie.story_line,
            json_text(&movie.shows)?,
        ],
    )?;
    Ok(())
}

fn json_text<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}
