use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One attempt to settle a booking. Status is one of PENDING, COMPLETED,
/// FAILED, CANCELLED, REFUNDED. A partial unique index guarantees at most
/// one COMPLETED payment per booking.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    pub amount: f64,
    pub method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(booking_id: String, user_id: String, amount: f64, method: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            user_id,
            amount,
            method,
            status: "PENDING".to_string(),
            created_at: Utc::now(),
        }
    }
}
