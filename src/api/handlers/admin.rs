use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::{CleanupReport, StatusCounts};
use crate::error::AppError;
use crate::state::AppState;

/// Manual trigger for the showtime lifecycle sweep. Same code path as the
/// scheduled loop, so calling it redundantly is harmless.
pub async fn sweep_showtimes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.showtime_sweeper.run_once().await;
    Ok(Json(report))
}

/// Runs every sweep once: expired seat locks, showtime lifecycle, and
/// booking/payment reconciliation.
pub async fn sweep_all(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let expired_locks_removed = state.seat_locks.sweep_expired().await?;
    let showtimes = state.showtime_sweeper.run_once().await;
    let bookings_reconciled = state.reconciler.run_once().await;

    info!(
        expired_locks_removed,
        bookings_reconciled, "Manual full cleanup completed"
    );
    Ok(Json(CleanupReport {
        expired_locks_removed,
        showtimes,
        bookings_reconciled,
    }))
}

pub async fn sweep_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let counts = StatusCounts {
        showtimes: state.showtime_repo.count_by_status().await?,
        bookings: state.booking_repo.count_by_status().await?,
        payments: state.payment_repo.count_by_status().await?,
        live_seat_locks: state.seat_locks.live_count().await?,
        armed_booking_timers: state.booking_expiry.armed_count().await,
        armed_payment_timers: state.payment_expiry.armed_count().await,
    };
    Ok(Json(counts))
}

pub async fn repair_showtime(
    State(state): State<Arc<AppState>>,
    Path(showtime_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let showtime = state.showtime_sweeper.repair(&showtime_id).await?;
    Ok(Json(showtime))
}
