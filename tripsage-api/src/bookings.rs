use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use tripsage_core::booking::{Booking, BookingDetails, BookingStatus, CreateBookingRequest};
use tripsage_core::token::SessionIdentity;

use crate::error::{AppError, BodyJson};
use crate::middleware::require_session;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/bookings/create", post(create_booking))
        .route("/bookings/cancel/{id}", put(cancel_booking))
        .route("/bookings/user-bookings", get(list_user_bookings))
        .layer(axum::middleware::from_fn_with_state(state, require_session))
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    booking: Booking,
}

#[derive(Debug, Serialize)]
struct BookingListResponse {
    bookings: Vec<Booking>,
    page: i64,
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    page: Option<i64>,
    limit: Option<i64>,
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    BodyJson(req): BodyJson<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let (booking_type, total_price, details) = req
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    // Owner comes from the verified session, never from the body.
    let booking = Booking::new(identity.user_id, booking_type, total_price, details);
    state.bookings.insert(&booking).await?;

    info!(booking_id = %booking.id, booking_type = booking_type.as_str(), "booking created");

    // Confirmation mail is best-effort; delivery failure never fails the booking.
    let body = confirmation_body(&booking);
    if let Err(e) = state
        .mailer
        .send(&identity.email, "Your TripSage booking is confirmed", &body)
        .await
    {
        warn!(booking_id = %booking.id, error = %e, "failed to send booking confirmation email");
    }

    Ok(Json(BookingResponse { booking }))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("booking not found".to_string()))?;

    if booking.user_id != identity.user_id {
        return Err(AppError::AuthorizationError(
            "booking does not belong to you".to_string(),
        ));
    }

    // The transition itself is a conditional update; if it matched no
    // row the booking reached a terminal state first (possibly racing
    // another cancel), so re-read for a precise conflict message.
    match state.bookings.cancel(id).await? {
        Some(updated) => {
            info!(booking_id = %id, "booking cancelled");
            Ok(Json(BookingResponse { booking: updated }))
        }
        None => {
            let current = state
                .bookings
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFoundError("booking not found".to_string()))?;
            let msg = match current.status {
                BookingStatus::Completed => "booking already completed",
                _ => "booking already cancelled",
            };
            Err(AppError::ConflictError(msg.to_string()))
        }
    }
}

async fn list_user_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<BookingListResponse>, AppError> {
    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    // Saturate so an absurd page number degrades to an empty page
    // instead of overflowing.
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let bookings = state
        .bookings
        .list_for_user(identity.user_id, offset, limit)
        .await?;

    Ok(Json(BookingListResponse {
        bookings,
        page,
        limit,
    }))
}

fn confirmation_body(booking: &Booking) -> String {
    let detail_line = match &booking.details {
        BookingDetails::Hotel(h) => format!(
            "{}: {} to {}, {} guest(s)",
            h.hotel_name, h.check_in_date, h.check_out_date, h.guests
        ),
        BookingDetails::Travel(t) => format!(
            "{}: departing {}, {} participant(s)",
            t.package_name,
            t.travel_date,
            t.participants.len()
        ),
    };
    format!(
        "Your booking is confirmed.\n\n{}\nTotal: {:.2}\nBooking reference: {}",
        detail_line, booking.total_price, booking.id
    )
}
