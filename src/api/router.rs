use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{admin, bookings, health, payments, seat_locks};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Seat holds
        .route("/api/v1/showtimes/{showtime_id}/locks", post(seat_locks::acquire_lock))
        .route("/api/v1/showtimes/{showtime_id}/locks/{user_id}", delete(seat_locks::release_lock))
        .route("/api/v1/showtimes/{showtime_id}/locks/{user_id}/extend", post(seat_locks::extend_lock))

        // Checkout & bookings
        .route("/api/v1/showtimes/{showtime_id}/checkout", post(bookings::checkout))
        .route("/api/v1/bookings/{booking_id}", get(bookings::get_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(bookings::cancel_booking))

        // Payments
        .route("/api/v1/bookings/{booking_id}/payments", post(payments::create_payment))
        .route("/api/v1/payments/{payment_id}", get(payments::get_payment))
        .route("/api/v1/payments/{payment_id}/complete", post(payments::complete_payment))
        .route("/api/v1/payments/{payment_id}/fail", post(payments::fail_payment))

        // Administrative sweep surface
        .route("/api/v1/admin/sweep/showtimes", post(admin::sweep_showtimes))
        .route("/api/v1/admin/sweep/all", post(admin::sweep_all))
        .route("/api/v1/admin/sweep/stats", get(admin::sweep_stats))
        .route("/api/v1/admin/showtimes/{showtime_id}/repair", post(admin::repair_showtime))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
