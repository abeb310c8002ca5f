use crate::domain::models::{
    booking::Booking, payment::Payment, seat_lock::{Seat, SeatLockRow}, showtime::Showtime,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage for seat holds. All queries that feed conflict decisions filter
/// on `expires_at > now` so expired-but-unswept rows never block anyone.
#[async_trait]
pub trait SeatLockRepository: Send + Sync {
    /// Seats among `seats` already covered by a live lock on this showtime.
    async fn find_conflicts(
        &self,
        showtime_id: &str,
        seats: &[Seat],
        now: DateTime<Utc>,
    ) -> Result<Vec<Seat>, AppError>;
    /// Inserts all rows of one hold in a single transaction, clearing
    /// expired rows for the same seats first. A unique-index violation
    /// means a competing hold won the race.
    async fn insert_hold(&self, rows: &[SeatLockRow], now: DateTime<Utc>) -> Result<(), AppError>;
    async fn delete_by_owner(&self, showtime_id: &str, user_id: &str) -> Result<u64, AppError>;
    async fn extend_by_owner(
        &self,
        showtime_id: &str,
        user_id: &str,
        new_expiry: DateTime<Utc>,
    ) -> Result<u64, AppError>;
    async fn find_live_by_owner(
        &self,
        showtime_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatLockRow>, AppError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
    async fn count_live(&self, now: DateTime<Utc>) -> Result<i64, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    /// PENDING/PENDING -> CANCELLED/FAILED. Returns false if the booking
    /// was already settled (the timer lost the race).
    async fn mark_expired(&self, id: &str) -> Result<bool, AppError>;
    /// PENDING/PENDING -> CANCELLED/CANCELLED, the explicit user-cancel path.
    async fn cancel_pending(&self, id: &str) -> Result<bool, AppError>;
    /// PENDING -> CONFIRMED with payment_status COMPLETED.
    async fn confirm_paid(&self, id: &str) -> Result<bool, AppError>;
    /// Overwrites payment_status only while it is still PENDING.
    async fn set_payment_status(&self, id: &str, payment_status: &str) -> Result<bool, AppError>;
    /// status -> CANCELLED regardless of payment_status, unless already
    /// cancelled. Used by the reconciler.
    async fn force_cancel(&self, id: &str) -> Result<bool, AppError>;
    async fn find_pending_unpaid(&self) -> Result<Vec<Booking>, AppError>;
    /// Bookings whose payment outcome is terminal-negative but whose status
    /// has not caught up: payment_status in (CANCELLED, FAILED) and status
    /// != CANCELLED.
    async fn find_payment_diverged(&self) -> Result<Vec<Booking>, AppError>;
    async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError>;
    /// Conditional status transition; false means the precondition no
    /// longer held.
    async fn transition(&self, id: &str, from: &str, to: &str) -> Result<bool, AppError>;
    async fn fail_pending_for_booking(&self, booking_id: &str) -> Result<u64, AppError>;
    async fn find_pending(&self) -> Result<Vec<Payment>, AppError>;
    async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError>;
}

#[async_trait]
pub trait ShowtimeRepository: Send + Sync {
    async fn create(&self, showtime: &Showtime) -> Result<Showtime, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Showtime>, AppError>;
    /// Decrements available_seats only while booking is open and enough
    /// seats remain.
    async fn reserve_seats(&self, id: &str, count: i64) -> Result<bool, AppError>;
    async fn restore_seats(&self, id: &str, count: i64) -> Result<u64, AppError>;
    /// SCHEDULED -> BOOKING_OPEN for showtimes starting between now and
    /// `cutoff`.
    async fn open_due(&self, now: DateTime<Utc>, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
    /// BOOKING_OPEN -> BOOKING_CLOSED for showtimes starting before `cutoff`.
    async fn close_due(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
    /// BOOKING_CLOSED -> COMPLETED for showtimes already ended.
    async fn complete_due(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
    /// Deletes COMPLETED showtimes ended before `cutoff` with zero bookings.
    async fn delete_stale_completed(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
    /// Cancels SCHEDULED showtimes whose start passed before `cutoff` with
    /// zero bookings.
    async fn cancel_abandoned(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
    /// Rewrites a divergent status to `expected`, never touching CANCELLED
    /// showtimes. Returns false if the status already matched.
    async fn repair_status(&self, id: &str, expected: &str) -> Result<bool, AppError>;
    async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError>;
}

/// Fire-and-forget user notifications. Delivery failures are logged by
/// callers, never allowed to block a lifecycle transition.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify(
        &self,
        user_id: &str,
        kind: &str,
        payload: &serde_json::Value,
    ) -> Result<(), AppError>;
}
