use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::seat_lock::Seat;

/// A booked seat carries the price it was sold at, frozen at checkout time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookedSeat {
    pub row: String,
    pub number: i32,
    pub price: f64,
}

impl BookedSeat {
    pub fn seat(&self) -> Seat {
        Seat {
            row: self.row.clone(),
            number: self.number,
        }
    }
}

/// A reservation of seats, pending or settled.
///
/// `status` is one of PENDING, CONFIRMED, CANCELLED, COMPLETED;
/// `payment_status` is one of PENDING, COMPLETED, FAILED, REFUNDED,
/// CANCELLED. The two fields must stay jointly consistent; the reconciler
/// detects and heals divergence. Bookings are never hard-deleted.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub showtime_id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub seats: Json<Vec<BookedSeat>>,
    pub total_amount: f64,
    pub status: String,
    pub payment_status: String,
    pub booking_time: DateTime<Utc>,
    pub ticket_code: String,
}

pub struct NewBookingParams {
    pub user_id: String,
    pub showtime_id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub seats: Vec<Seat>,
    pub price_per_seat: f64,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let seats: Vec<BookedSeat> = params
            .seats
            .into_iter()
            .map(|s| BookedSeat {
                row: s.row,
                number: s.number,
                price: params.price_per_seat,
            })
            .collect();

        let total_amount = seats.iter().map(|s| s.price).sum();

        let ticket_code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            showtime_id: params.showtime_id,
            movie_id: params.movie_id,
            theater_id: params.theater_id,
            seats: Json(seats),
            total_amount,
            status: "PENDING".to_string(),
            payment_status: "PENDING".to_string(),
            booking_time: Utc::now(),
            ticket_code,
        }
    }

    pub fn seat_count(&self) -> i64 {
        self.seats.0.len() as i64
    }
}
