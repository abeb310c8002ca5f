use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled screening. The engine owns only `status` and
/// `available_seats`; everything else belongs to the catalog.
///
/// Status moves monotonically through SCHEDULED, BOOKING_OPEN,
/// BOOKING_CLOSED, COMPLETED. CANCELLED is reachable from SCHEDULED only
/// while the showtime has no bookings.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Showtime {
    pub id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub price: f64,
    pub total_seats: i64,
    pub available_seats: i64,
    pub created_at: DateTime<Utc>,
}

pub struct NewShowtimeParams {
    pub movie_id: String,
    pub theater_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_min: i64,
    pub price: f64,
    pub total_seats: i64,
}

impl Showtime {
    pub fn new(params: NewShowtimeParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            movie_id: params.movie_id,
            theater_id: params.theater_id,
            start_time: params.start_time,
            end_time: params.start_time + Duration::minutes(params.duration_min),
            status: "SCHEDULED".to_string(),
            price: params.price,
            total_seats: params.total_seats,
            available_seats: params.total_seats,
            created_at: Utc::now(),
        }
    }
}
