use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::domain::models::seat_lock::{Seat, SeatHold, SeatLockRow};
use crate::domain::ports::SeatLockRepository;
use crate::error::{is_unique_violation, AppError};

/// Grants and revokes short-lived exclusive holds on (showtime, seat) pairs.
///
/// Holds are advisory-exclusive: disjointness of live holds is checked at
/// acquire time against the current non-expired set, and the unique index on
/// (showtime, row, number) closes the window between two concurrent
/// acquires.
pub struct SeatLockManager {
    locks: Arc<dyn SeatLockRepository>,
    hold_duration: Duration,
}

impl SeatLockManager {
    pub fn new(locks: Arc<dyn SeatLockRepository>, hold_duration: Duration) -> Self {
        Self {
            locks,
            hold_duration,
        }
    }

    pub async fn acquire(
        &self,
        showtime_id: &str,
        user_id: &str,
        seats: Vec<Seat>,
    ) -> Result<SeatHold, AppError> {
        if seats.is_empty() {
            return Err(AppError::Validation("No seats requested".into()));
        }
        // A repeated seat would collide with itself on the unique index and
        // masquerade as a conflict with another hold.
        let distinct: HashSet<_> = seats.iter().collect();
        if distinct.len() != seats.len() {
            return Err(AppError::Validation("Duplicate seats in request".into()));
        }

        let now = Utc::now();
        let conflicts = self.locks.find_conflicts(showtime_id, &seats, now).await?;
        if !conflicts.is_empty() {
            return Err(AppError::SeatsUnavailable(
                conflicts.iter().map(|s| s.to_string()).collect(),
            ));
        }

        let expires_at = now + chrono::Duration::from_std(self.hold_duration).unwrap_or_default();
        let hold = SeatHold::new(
            showtime_id.to_string(),
            user_id.to_string(),
            seats,
            expires_at,
        );

        match self.locks.insert_hold(&hold.rows(), now).await {
            Ok(()) => {
                info!(
                    lock_id = %hold.lock_id,
                    showtime_id,
                    user_id,
                    seats = hold.seats.len(),
                    "Seat hold acquired"
                );
                Ok(hold)
            }
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                // A competing acquire won the race between our conflict
                // check and the insert. Name whichever seats are held now.
                let contested = self
                    .locks
                    .find_conflicts(showtime_id, &hold.seats, Utc::now())
                    .await?;
                let named = if contested.is_empty() {
                    hold.seats.iter().map(|s| s.to_string()).collect()
                } else {
                    contested.iter().map(|s| s.to_string()).collect()
                };
                Err(AppError::SeatsUnavailable(named))
            }
            Err(e) => Err(e),
        }
    }

    /// Removes every hold this user has on the showtime. Idempotent; used on
    /// cancellation, on expiry, and after confirmation.
    pub async fn release(&self, showtime_id: &str, user_id: &str) -> Result<u64, AppError> {
        self.locks.delete_by_owner(showtime_id, user_id).await
    }

    /// Pushes the hold's expiry `extra` past now, so a user entering the
    /// payment step does not lose their seats mid-payment.
    pub async fn extend(
        &self,
        showtime_id: &str,
        user_id: &str,
        extra: Duration,
    ) -> Result<u64, AppError> {
        let new_expiry = Utc::now() + chrono::Duration::from_std(extra).unwrap_or_default();
        self.locks
            .extend_by_owner(showtime_id, user_id, new_expiry)
            .await
    }

    /// The live seats a user currently holds on a showtime.
    pub async fn live_hold(
        &self,
        showtime_id: &str,
        user_id: &str,
    ) -> Result<Vec<SeatLockRow>, AppError> {
        self.locks
            .find_live_by_owner(showtime_id, user_id, Utc::now())
            .await
    }

    /// Deletes all expired lock rows so freed seats become bookable and
    /// storage does not accumulate dead holds. Runs on a short interval.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        self.locks.delete_expired(Utc::now()).await
    }

    pub async fn live_count(&self) -> Result<i64, AppError> {
        self.locks.count_live(Utc::now()).await
    }
}
