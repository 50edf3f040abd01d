//! Booking and coupon workflow.
//!
//! The multi-step logic lives here as plain functions over the in-memory
//! user record; the HTTP layer loads the record, runs these, and writes the
//! whole lists back. Randomness comes through the caller's Rng so the
//! invariants are testable.

use rand::Rng;

use crate::models::{BookingRequest, Coupon, User};

pub const REFERENCE_MIN: i64 = 10_000;
pub const REFERENCE_MAX: i64 = 99_999;
pub const SHOW_ID_MIN: i64 = 1_000;
pub const SHOW_ID_MAX: i64 = 1_009;
pub const DEFAULT_TOTAL_PRICE: i64 = 1_000;

/// Build a booking record for the supplied tickets. Reference numbers are
/// drawn without a uniqueness check; collisions are accepted.
pub fn new_booking(
    rng: &mut impl Rng,
    coupon_code: Option<i64>,
    ticket_price: Option<i64>,
    tickets: Vec<serde_json::Value>,
) -> BookingRequest {
    BookingRequest {
        reference_number: rng.gen_range(REFERENCE_MIN..=REFERENCE_MAX),
        show_id: rng.gen_range(SHOW_ID_MIN..=SHOW_ID_MAX),
        coupon_code,
        ticket_price,
        tickets,
    }
}

/// Total price for a booking: explicit override, else ticket price times
/// ticket count, else the default. Non-positive values fall through.
pub fn booking_total(booking: &BookingRequest, override_total: Option<i64>) -> i64 {
    override_total
        .filter(|t| *t > 0)
        .or_else(|| {
            booking
                .ticket_price
                .map(|p| p * booking.tickets.len() as i64)
                .filter(|t| *t > 0)
        })
        .unwrap_or(DEFAULT_TOTAL_PRICE)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    #[error("No active booking found to apply coupon")]
    NoBookings,
    #[error("A coupon has already been applied to this booking")]
    AlreadyApplied(i64),
    #[error("This coupon has already been used for this show")]
    UsedForShow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponOutcome {
    pub discount_value: i64,
    /// True when the coupon id was new to the user and appended to the list.
    pub coupon_added: bool,
}

/// Apply a coupon code to the user's latest booking.
///
/// A booking's coupon field only ever moves unset -> set, and a coupon id
/// used for a show can never be reapplied to that show for this user. A new
/// coupon id draws a discount uniformly from 10%..=50% of the total (integer
/// floor); a known id reuses the discount stored on the user's coupon list.
pub fn apply_coupon(
    rng: &mut impl Rng,
    user: &mut User,
    code: i64,
    total: i64,
) -> Result<CouponOutcome, CouponError> {
    let latest = user
        .booking_requests
        .len()
        .checked_sub(1)
        .ok_or(CouponError::NoBookings)?;
    let show_id = user.booking_requests[latest].show_id;

    if let Some(existing) = user.booking_requests[latest].coupon_code {
        return Err(CouponError::AlreadyApplied(existing));
    }
    if user
        .booking_requests
        .iter()
        .any(|b| b.show_id == show_id && b.coupon_code == Some(code))
    {
        return Err(CouponError::UsedForShow);
    }

    let (discount_value, coupon_added) = match user.coupons.iter().find(|c| c.id == code) {
        Some(existing) => (existing.discount_value, false),
        None => {
            let drawn = rng.gen_range(total / 10..=total / 2);
            user.coupons.push(Coupon {
                id: code,
                discount_value: drawn,
            });
            (drawn, true)
        }
    };

    user.booking_requests[latest].coupon_code = Some(code);

    Ok(CouponOutcome {
        discount_value,
        coupon_added,
    })
}
