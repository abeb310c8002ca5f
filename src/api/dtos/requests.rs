use serde::Deserialize;

use crate::domain::models::seat_lock::Seat;

#[derive(Deserialize)]
pub struct AcquireLockRequest {
    pub user_id: String,
    pub seats: Vec<Seat>,
}

#[derive(Deserialize)]
pub struct ExtendLockRequest {
    pub minutes: i64,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub seats: Vec<Seat>,
}

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub method: String,
}
