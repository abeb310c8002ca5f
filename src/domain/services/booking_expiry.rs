use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use crate::domain::models::booking::Booking;
use crate::domain::ports::{BookingRepository, NotificationService, PaymentRepository, ShowtimeRepository};
use crate::domain::services::job_table::JobTable;
use crate::domain::services::seat_locks::SeatLockManager;
use crate::error::AppError;

/// Per-booking one-shot expiry timers.
///
/// A booking left PENDING/PENDING past its deadline is cancelled, its seats
/// returned to the showtime, its hold released, and any pending payment
/// rows failed. The transition is a conditional update, so a timer racing a
/// concurrent payment resolves to a no-op for whichever side loses.
pub struct BookingExpiryScheduler {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    showtimes: Arc<dyn ShowtimeRepository>,
    seat_locks: Arc<SeatLockManager>,
    notifier: Arc<dyn NotificationService>,
    deadline: Duration,
    jobs: JobTable,
}

impl BookingExpiryScheduler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        showtimes: Arc<dyn ShowtimeRepository>,
        seat_locks: Arc<SeatLockManager>,
        notifier: Arc<dyn NotificationService>,
        deadline: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            bookings,
            payments,
            showtimes,
            seat_locks,
            notifier,
            deadline,
            jobs: JobTable::new(),
        })
    }

    /// Arms the expiry timer for a freshly created booking.
    pub async fn schedule(self: &Arc<Self>, booking_id: &str) {
        self.arm(booking_id, self.deadline).await;
    }

    /// Disarms the timer. Must be the first action on the payment success
    /// path; if the timer fires anyway, its precondition check makes the
    /// fire a no-op.
    pub async fn cancel(&self, booking_id: &str) {
        self.jobs.remove(booking_id).await;
    }

    /// Disarm and re-arm with a fresh delay, e.g. while a payment retry is
    /// in flight.
    pub async fn extend(self: &Arc<Self>, booking_id: &str, delay: Duration) {
        self.jobs.remove(booking_id).await;
        self.arm(booking_id, delay).await;
    }

    /// Rebuilds timers after a process restart. Bookings already past their
    /// deadline expire immediately; the rest keep their original deadline.
    pub async fn recover_on_startup(self: &Arc<Self>) -> Result<usize, AppError> {
        let pending = self.bookings.find_pending_unpaid().await?;
        let total = pending.len();
        for booking in pending {
            let deadline = booking.booking_time
                + chrono::Duration::from_std(self.deadline).unwrap_or_default();
            let now = Utc::now();
            if deadline <= now {
                if let Err(e) = self.expire(&booking.id).await {
                    error!(booking_id = %booking.id, "Recovery expiry failed: {:?}", e);
                }
            } else {
                let remaining = (deadline - now).to_std().unwrap_or_default();
                self.arm(&booking.id, remaining).await;
            }
        }
        if total > 0 {
            info!("Recovered {} pending booking timers", total);
        }
        Ok(total)
    }

    /// Disarms every timer without running its effects.
    pub async fn shutdown(&self) {
        self.jobs.shutdown().await;
    }

    pub async fn armed_count(&self) -> usize {
        self.jobs.len().await
    }

    async fn arm(self: &Arc<Self>, booking_id: &str, delay: Duration) {
        let scheduler = self.clone();
        let id = booking_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = scheduler.expire(&id).await {
                error!(booking_id = %id, "Booking expiry failed: {:?}", e);
            }
            scheduler.jobs.forget(&id).await;
        });
        self.jobs.insert(booking_id, handle).await;
    }

    /// The expiry transition. Safe to run redundantly: the conditional
    /// update fires at most once per booking.
    pub async fn expire(&self, booking_id: &str) -> Result<bool, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        if !self.bookings.mark_expired(booking_id).await? {
            // Already paid or cancelled; the timer lost the race.
            return Ok(false);
        }

        self.showtimes
            .restore_seats(&booking.showtime_id, booking.seat_count())
            .await?;
        self.seat_locks
            .release(&booking.showtime_id, &booking.user_id)
            .await?;
        self.payments.fail_pending_for_booking(booking_id).await?;

        self.notify_expired(&booking).await;

        info!(
            booking_id,
            showtime_id = %booking.showtime_id,
            seats = booking.seat_count(),
            "Booking expired and seats released"
        );
        Ok(true)
    }

    async fn notify_expired(&self, booking: &Booking) {
        let payload = json!({
            "booking_id": booking.id,
            "showtime_id": booking.showtime_id,
            "ticket_code": booking.ticket_code,
        });
        if let Err(e) = self
            .notifier
            .notify(&booking.user_id, "BOOKING_EXPIRED", &payload)
            .await
        {
            error!(booking_id = %booking.id, "Expiry notification failed: {:?}", e);
        }
    }
}
