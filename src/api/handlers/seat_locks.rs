use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::dtos::requests::{AcquireLockRequest, ExtendLockRequest};
use crate::error::AppError;
use crate::state::AppState;

pub async fn acquire_lock(
    State(state): State<Arc<AppState>>,
    Path(showtime_id): Path<String>,
    Json(payload): Json<AcquireLockRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .showtime_repo
        .find_by_id(&showtime_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Showtime {} not found", showtime_id)))?;

    let hold = state
        .seat_locks
        .acquire(&showtime_id, &payload.user_id, payload.seats)
        .await?;

    Ok(Json(hold))
}

pub async fn release_lock(
    State(state): State<Arc<AppState>>,
    Path((showtime_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let released = state.seat_locks.release(&showtime_id, &user_id).await?;
    info!(showtime_id, user_id, released, "Seat hold released");
    Ok(Json(json!({ "released_seats": released })))
}

pub async fn extend_lock(
    State(state): State<Arc<AppState>>,
    Path((showtime_id, user_id)): Path<(String, String)>,
    Json(payload): Json<ExtendLockRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.minutes <= 0 {
        return Err(AppError::Validation("minutes must be positive".into()));
    }

    let extended = state
        .seat_locks
        .extend(
            &showtime_id,
            &user_id,
            Duration::from_secs(payload.minutes as u64 * 60),
        )
        .await?;

    if extended == 0 {
        return Err(AppError::NotFound(
            "No live seat hold to extend".to_string(),
        ));
    }
    Ok(Json(json!({ "extended_seats": extended })))
}
