use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::AppState;
use crate::services::booking::{self, CouponError};

#[derive(Debug, Deserialize)]
pub struct BookShowRequest {
    #[serde(rename = "customerUuid")]
    pub customer_uuid: Option<String>,
    #[serde(rename = "bookingRequest")]
    pub booking_request: Option<BookingPayload>,
}

#[derive(Debug, Deserialize)]
pub struct BookingPayload {
    pub coupon_code: Option<i64>,
    pub ticket_price: Option<i64>,
    #[serde(default)]
    pub tickets: Vec<serde_json::Value>,
}

pub async fn book_show(
    State(state): State<AppState>,
    Json(body): Json<BookShowRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let customer_uuid = body.customer_uuid.filter(|u| !u.is_empty());
    let payload = body.booking_request;
    let (Some(customer_uuid), Some(payload)) = (customer_uuid, payload) else {
        return Err(AppError::BadRequest(
            "Invalid request. 'customerUuid' and 'tickets' are required.".to_string(),
        ));
    };
    if payload.tickets.is_empty() {
        return Err(AppError::BadRequest(
            "Invalid request. 'customerUuid' and 'tickets' are required.".to_string(),
        ));
    }

    let conn = state.db.get()?;
    let mut user = find_by_session_uuid(&conn, &customer_uuid)?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    let booking = booking::new_booking(
        &mut rand::thread_rng(),
        payload.coupon_code,
        payload.ticket_price,
        payload.tickets,
    );
    user.booking_requests.push(booking.clone());

    // The whole list is rewritten, document style, in one statement.
    conn.execute(
        "UPDATE users SET booking_requests = ?1 WHERE id = ?2",
        rusqlite::params![
            serde_json::to_string(&user.booking_requests)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            user.id
        ],
    )?;

    tracing::info!(
        reference_number = booking.reference_number,
        show_id = booking.show_id,
        "booking confirmed"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "reference_number": booking.reference_number,
            "message": "Booking confirmed successfully.",
            "booking": booking,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponQuery {
    pub code: Option<String>,
    #[serde(rename = "totalPrice")]
    pub total_price: Option<String>,
}

pub async fn apply_coupon(
    State(state): State<AppState>,
    Extension(identity): Extension<User>,
    Query(query): Query<ApplyCouponQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let code = query
        .code
        .as_deref()
        .and_then(|c| c.parse::<i64>().ok())
        .unwrap_or(0);
    if code == 0 {
        return Err(AppError::BadRequest("Coupon code is required".to_string()));
    }
    let total_override = query.total_price.as_deref().and_then(|t| t.parse().ok());

    // Re-read the record; the extension snapshot may be stale by now.
    let conn = state.db.get()?;
    let mut user = find_by_session_uuid(&conn, &identity.uuid)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let latest = user.booking_requests.last().ok_or_else(|| {
        AppError::NotFound("No active booking found to apply coupon".to_string())
    })?;
    let total = booking::booking_total(latest, total_override);

    let outcome = booking::apply_coupon(&mut rand::thread_rng(), &mut user, code, total)
        .map_err(|e| match e {
            CouponError::NoBookings => AppError::NotFound(e.to_string()),
            CouponError::AlreadyApplied(_) | CouponError::UsedForShow => {
                AppError::BadRequest(e.to_string())
            }
        })?;

    conn.execute(
        "UPDATE users SET booking_requests = ?1, coupons = ?2 WHERE id = ?3",
        rusqlite::params![
            serde_json::to_string(&user.booking_requests)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            serde_json::to_string(&user.coupons)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            user.id
        ],
    )?;

    let message = if outcome.coupon_added {
        "Coupon applied successfully"
    } else {
        "Existing coupon applied successfully"
    };

    Ok(Json(json!({
        "valid": true,
        "discountValue": outcome.discount_value,
        "message": message,
    })))
}

fn find_by_session_uuid(
    conn: &rusqlite::Connection,
    session_uuid: &str,
) -> AppResult<Option<User>> {
    if session_uuid.is_empty() {
        return Ok(None);
    }
    let result = conn.query_row(
        &format!("SELECT {} FROM users WHERE uuid = ?1", User::COLUMNS),
        rusqlite::params![session_uuid],
        User::from_row,
    );
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
