mod artists;
mod auth;
mod bookings;
mod genres;
mod movies;
mod users;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::auth::middleware::require_auth;
use crate::config::Config;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

async fn health() -> &'static str {
    "ok"
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the Marquee movie booking API." }))
}

pub fn create_router(state: AppState) -> Router {
    // Catalog and account-admin routes match the public API surface; the
    // booking workflow and profile lookup sit behind the bearer-token gate.
    let public = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/api/movies", get(movies::list).post(movies::create))
        .route(
            "/api/movies/{id}",
            get(movies::find_one)
                .put(movies::update)
                .delete(movies::delete),
        )
        .route("/api/movies/{id}/shows", get(movies::find_shows))
        .route("/api/artists", get(artists::list).post(artists::create))
        .route(
            "/api/artists/{id}",
            get(artists::find_one)
                .put(artists::update)
                .delete(artists::delete),
        )
        .route("/api/genres", get(genres::list).post(genres::create))
        .route(
            "/api/genres/{id}",
            get(genres::find_one)
                .put(genres::update)
                .delete(genres::delete),
        )
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout/{id}", post(auth::logout))
        .route("/api/auth/session", get(auth::check_session))
        .route("/api/users", get(users::list))
        .route(
            "/api/users/{id}",
            get(users::find_one)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/api/users/{id}/coupons", get(users::coupons));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/coupons", get(bookings::apply_coupon))
        .route("/api/auth/bookings", post(bookings::book_show))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new().merge(public).merge(protected).with_state(state)
}
