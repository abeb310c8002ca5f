use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::dtos::requests::CheckoutRequest;
use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::error::AppError;
use crate::state::AppState;

/// Converts a live seat hold into a pending booking and arms its expiry
/// timer. The seat-count decrement is conditional on the booking window
/// still being open and enough seats remaining.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(showtime_id): Path<String>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.seats.is_empty() {
        return Err(AppError::Validation("No seats requested".into()));
    }
    // A duplicated seat would count twice against available_seats and
    // double-charge the booking.
    let distinct: HashSet<_> = payload.seats.iter().collect();
    if distinct.len() != payload.seats.len() {
        return Err(AppError::Validation("Duplicate seats in request".into()));
    }

    let showtime = state
        .showtime_repo
        .find_by_id(&showtime_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Showtime {} not found", showtime_id)))?;

    if showtime.status != "BOOKING_OPEN" {
        return Err(AppError::Conflict(
            "Booking window is not open for this showtime".into(),
        ));
    }

    let held: Vec<_> = state
        .seat_locks
        .live_hold(&showtime_id, &payload.user_id)
        .await?
        .iter()
        .map(|row| row.seat())
        .collect();

    let unheld: Vec<String> = payload
        .seats
        .iter()
        .filter(|seat| !held.contains(seat))
        .map(|seat| seat.to_string())
        .collect();
    if !unheld.is_empty() {
        warn!(showtime_id, user_id = %payload.user_id, ?unheld, "Checkout without live hold");
        return Err(AppError::Conflict(format!(
            "Seats not held by this user: {}",
            unheld.join(", ")
        )));
    }

    // The booking clock starts now; re-align the hold with it so a hold
    // acquired early cannot lapse under a pending booking.
    state
        .seat_locks
        .extend(&showtime_id, &payload.user_id, state.config.booking_deadline)
        .await?;

    let seat_count = payload.seats.len() as i64;
    if !state
        .showtime_repo
        .reserve_seats(&showtime_id, seat_count)
        .await?
    {
        return Err(AppError::Conflict("Not enough seats available".into()));
    }

    let booking = Booking::new(NewBookingParams {
        user_id: payload.user_id,
        showtime_id: showtime_id.clone(),
        movie_id: showtime.movie_id.clone(),
        theater_id: showtime.theater_id.clone(),
        seats: payload.seats,
        price_per_seat: showtime.price,
    });

    let created = match state.booking_repo.create(&booking).await {
        Ok(created) => created,
        Err(e) => {
            // Seats were decremented but no booking exists; hand them back.
            if let Err(restore_err) = state
                .showtime_repo
                .restore_seats(&showtime_id, seat_count)
                .await
            {
                error!(
                    showtime_id,
                    seats = seat_count,
                    "Seat restore after failed booking insert failed: {:?}",
                    restore_err
                );
            }
            return Err(e);
        }
    };

    state.booking_expiry.schedule(&created.id).await;

    info!(
        booking_id = %created.id,
        showtime_id,
        seats = created.seat_count(),
        "Booking created, expiry timer armed"
    );
    Ok(Json(created))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;
    Ok(Json(booking))
}

/// Explicit user cancellation. Same guarded transition as a timer fire, so
/// cancelling a booking whose timer already fired is a clean conflict, not
/// a double seat restore.
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.booking_expiry.cancel(&booking_id).await;

    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

    if !state.booking_repo.cancel_pending(&booking_id).await? {
        return Err(AppError::Conflict(
            "Booking is not in a pending state".into(),
        ));
    }

    state
        .showtime_repo
        .restore_seats(&booking.showtime_id, booking.seat_count())
        .await?;
    state
        .seat_locks
        .release(&booking.showtime_id, &booking.user_id)
        .await?;
    state
        .payment_repo
        .fail_pending_for_booking(&booking_id)
        .await?;

    info!(booking_id, "Booking cancelled by user");
    Ok(Json(json!({ "status": "cancelled" })))
}
