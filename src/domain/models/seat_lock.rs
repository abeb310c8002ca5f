use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// A single auditorium seat, addressed by row letter and seat number.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Seat {
    pub row: String,
    pub number: i32,
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

/// One held seat. A hold on several seats is a group of rows sharing a
/// `lock_id`; the group is created and released as a unit.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SeatLockRow {
    pub id: String,
    pub lock_id: String,
    pub showtime_id: String,
    pub user_id: String,
    pub seat_row: String,
    pub seat_number: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SeatLockRow {
    pub fn seat(&self) -> Seat {
        Seat {
            row: self.seat_row.clone(),
            number: self.seat_number,
        }
    }
}

/// Result of a successful acquire: the hold handle returned to the caller.
#[derive(Debug, Serialize, Clone)]
pub struct SeatHold {
    pub lock_id: String,
    pub showtime_id: String,
    pub user_id: String,
    pub seats: Vec<Seat>,
    pub expires_at: DateTime<Utc>,
}

impl SeatHold {
    pub fn new(
        showtime_id: String,
        user_id: String,
        seats: Vec<Seat>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lock_id: Uuid::new_v4().to_string(),
            showtime_id,
            user_id,
            seats,
            expires_at,
        }
    }

    pub fn rows(&self) -> Vec<SeatLockRow> {
        let created_at = Utc::now();
        self.seats
            .iter()
            .map(|seat| SeatLockRow {
                id: Uuid::new_v4().to_string(),
                lock_id: self.lock_id.clone(),
                showtime_id: self.showtime_id.clone(),
                user_id: self.user_id.clone(),
                seat_row: seat.row.clone(),
                seat_number: seat.number,
                expires_at: self.expires_at,
                created_at,
            })
            .collect()
    }
}
