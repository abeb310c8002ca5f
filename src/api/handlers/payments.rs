use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::dtos::requests::CreatePaymentRequest;
use crate::domain::models::payment::Payment;
use crate::error::{is_unique_violation, AppError};
use crate::state::AppState;

/// Starts a payment attempt for a pending booking: creates the PENDING
/// payment, extends the seat hold and booking deadline so the hold cannot
/// lapse mid-payment, and arms the payment expiry timer.
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

    if booking.status != "PENDING" {
        return Err(AppError::Conflict(
            "Booking is not awaiting payment".into(),
        ));
    }

    let payment = Payment::new(
        booking_id.clone(),
        booking.user_id.clone(),
        booking.total_amount,
        payload.method,
    );
    let created = state.payment_repo.create(&payment).await?;

    let grace = state.config.payment_deadline;
    state
        .seat_locks
        .extend(&booking.showtime_id, &booking.user_id, grace)
        .await?;
    state.booking_expiry.extend(&booking_id, grace).await;
    state.payment_expiry.schedule(&created.id).await;

    info!(
        payment_id = %created.id,
        booking_id,
        amount = created.amount,
        "Payment attempt started"
    );
    Ok(Json(created))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state
        .payment_repo
        .find_by_id(&payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;
    Ok(Json(payment))
}

/// Success path, also reachable from gateway webhooks. Timers are cancelled
/// before any mutation; if a timer fires in the gap anyway, its own
/// precondition check turns the fire into a no-op.
pub async fn complete_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state
        .payment_repo
        .find_by_id(&payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;

    state.payment_expiry.cancel(&payment_id).await;
    state.booking_expiry.cancel(&payment.booking_id).await;

    let settled = match state
        .payment_repo
        .transition(&payment_id, "PENDING", "COMPLETED")
        .await
    {
        Ok(settled) => settled,
        Err(AppError::Database(e)) if is_unique_violation(&e) => {
            return Err(AppError::Conflict(
                "Booking already has a completed payment".into(),
            ));
        }
        Err(e) => return Err(e),
    };
    if !settled {
        return Err(AppError::Conflict("Payment is not pending".into()));
    }

    let booking = state
        .booking_repo
        .find_by_id(&payment.booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", payment.booking_id)))?;

    if !state.booking_repo.confirm_paid(&payment.booking_id).await? {
        // The booking expired or was cancelled before the money landed.
        // Flag the payment for refund instead of resurrecting the booking.
        warn!(
            payment_id,
            booking_id = %payment.booking_id,
            "Payment completed for a non-pending booking; marking refunded"
        );
        state
            .payment_repo
            .transition(&payment_id, "COMPLETED", "REFUNDED")
            .await?;
        return Err(AppError::Conflict(
            "Booking is no longer pending; payment marked for refund".into(),
        ));
    }

    state
        .seat_locks
        .release(&booking.showtime_id, &booking.user_id)
        .await?;

    let notify_payload = json!({
        "booking_id": booking.id,
        "ticket_code": booking.ticket_code,
        "amount": payment.amount,
    });
    if let Err(e) = state
        .notifier
        .notify(&booking.user_id, "BOOKING_CONFIRMED", &notify_payload)
        .await
    {
        error!(booking_id = %booking.id, "Confirmation notification failed: {:?}", e);
    }

    info!(payment_id, booking_id = %booking.id, "Payment completed, booking confirmed");
    Ok(Json(json!({
        "status": "confirmed",
        "booking_id": booking.id,
        "ticket_code": booking.ticket_code,
    })))
}

/// Failure path for gateway webhooks. Only payment state moves here;
/// the reconciler drives the booking to cancelled and restores seats.
pub async fn fail_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state
        .payment_repo
        .find_by_id(&payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;

    state.payment_expiry.cancel(&payment_id).await;

    if !state
        .payment_repo
        .transition(&payment_id, "PENDING", "FAILED")
        .await?
    {
        return Err(AppError::Conflict("Payment is not pending".into()));
    }

    state
        .booking_repo
        .set_payment_status(&payment.booking_id, "FAILED")
        .await?;

    info!(payment_id, booking_id = %payment.booking_id, "Payment marked failed");
    Ok(Json(json!({ "status": "failed" })))
}
