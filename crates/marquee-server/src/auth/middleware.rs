use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::session;
use crate::error::AppError;
use crate::routes::AppState;

/// Resolve the bearer token against the user store and attach the matching
/// user to the request. Tokens carry no expiry; logout is the only thing
/// that invalidates them.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Authentication token is required!".to_string()))?
        .to_string();

    let conn = state.db.get()?;
    let user = session::resolve_token(&conn, &token)?
        .filter(|u| u.is_logged_in)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
