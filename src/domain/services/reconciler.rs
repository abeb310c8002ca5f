use std::sync::Arc;

use tracing::{error, info};

use crate::domain::models::booking::Booking;
use crate::domain::ports::{BookingRepository, ShowtimeRepository};
use crate::domain::services::seat_locks::SeatLockManager;
use crate::error::AppError;

/// Backstop for the booking/payment joint-consistency invariant.
///
/// A payment can reach a terminal-negative state without the booking
/// following — a crash between the two writes, or a gateway webhook writing
/// payment_status directly. This sweep forces such bookings to CANCELLED,
/// returns their seats, and releases any leftover hold.
pub struct Reconciler {
    bookings: Arc<dyn BookingRepository>,
    showtimes: Arc<dyn ShowtimeRepository>,
    seat_locks: Arc<SeatLockManager>,
}

impl Reconciler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        showtimes: Arc<dyn ShowtimeRepository>,
        seat_locks: Arc<SeatLockManager>,
    ) -> Self {
        Self {
            bookings,
            showtimes,
            seat_locks,
        }
    }

    /// Returns how many bookings were healed this pass.
    pub async fn run_once(&self) -> u64 {
        let diverged = match self.bookings.find_payment_diverged().await {
            Ok(list) => list,
            Err(e) => {
                error!("Reconciler query failed: {:?}", e);
                return 0;
            }
        };

        let mut healed = 0;
        for booking in diverged {
            match self.reconcile(&booking).await {
                Ok(true) => healed += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(booking_id = %booking.id, "Reconcile failed: {:?}", e);
                }
            }
        }
        if healed > 0 {
            info!(healed, "Reconciler forced diverged bookings to cancelled");
        }
        healed
    }

    async fn reconcile(&self, booking: &Booking) -> Result<bool, AppError> {
        // The conditional cancel is the idempotency guard: only the pass
        // that flips the status restores seats.
        if !self.bookings.force_cancel(&booking.id).await? {
            return Ok(false);
        }

        self.showtimes
            .restore_seats(&booking.showtime_id, booking.seat_count())
            .await?;
        self.seat_locks
            .release(&booking.showtime_id, &booking.user_id)
            .await?;

        info!(
            booking_id = %booking.id,
            payment_status = %booking.payment_status,
            "Reconciled booking status with terminal payment state"
        );
        Ok(true)
    }
}
