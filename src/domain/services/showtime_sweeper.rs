use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::domain::models::showtime::Showtime;
use crate::domain::ports::ShowtimeRepository;
use crate::error::AppError;

/// Booking opens this far before the showtime starts.
const OPEN_WINDOW_HOURS: i64 = 24;
/// Booking closes this close to the start.
const CLOSE_WINDOW_MINUTES: i64 = 30;
/// Completed showtimes with no bookings are deleted after this long.
const RETENTION_DAYS: i64 = 30;
/// A SCHEDULED showtime this far past its start with no bookings is
/// considered abandoned.
const ABANDON_HOURS: i64 = 24;

#[derive(Debug, Default, Serialize, Clone, Copy)]
pub struct SweepReport {
    pub opened: u64,
    pub closed: u64,
    pub completed: u64,
    pub deleted: u64,
    pub cancelled: u64,
}

/// Drives showtimes through the booking-window state machine and cleans up
/// stale records. Each step is an independent bulk conditional update; a
/// failing step is logged and the remaining steps still run, since every
/// precondition is re-evaluated on the next pass.
pub struct ShowtimeSweeper {
    showtimes: Arc<dyn ShowtimeRepository>,
}

impl ShowtimeSweeper {
    pub fn new(showtimes: Arc<dyn ShowtimeRepository>) -> Self {
        Self { showtimes }
    }

    pub async fn run_once(&self) -> SweepReport {
        let now = Utc::now();
        let mut report = SweepReport::default();

        match self
            .showtimes
            .open_due(now, now + Duration::hours(OPEN_WINDOW_HOURS))
            .await
        {
            Ok(n) => report.opened = n,
            Err(e) => error!("Showtime sweep: open step failed: {:?}", e),
        }

        match self
            .showtimes
            .close_due(now + Duration::minutes(CLOSE_WINDOW_MINUTES))
            .await
        {
            Ok(n) => report.closed = n,
            Err(e) => error!("Showtime sweep: close step failed: {:?}", e),
        }

        match self.showtimes.complete_due(now).await {
            Ok(n) => report.completed = n,
            Err(e) => error!("Showtime sweep: complete step failed: {:?}", e),
        }

        match self
            .showtimes
            .delete_stale_completed(now - Duration::days(RETENTION_DAYS))
            .await
        {
            Ok(n) => report.deleted = n,
            Err(e) => error!("Showtime sweep: delete step failed: {:?}", e),
        }

        match self
            .showtimes
            .cancel_abandoned(now - Duration::hours(ABANDON_HOURS))
            .await
        {
            Ok(n) => report.cancelled = n,
            Err(e) => error!("Showtime sweep: abandon step failed: {:?}", e),
        }

        if report.opened + report.closed + report.completed + report.deleted + report.cancelled > 0
        {
            info!(
                opened = report.opened,
                closed = report.closed,
                completed = report.completed,
                deleted = report.deleted,
                cancelled = report.cancelled,
                "Showtime sweep applied transitions"
            );
        }
        report
    }

    /// Corrects a showtime whose status does not match what the sweep would
    /// compute from its timestamps, e.g. after a direct administrative
    /// write. Uses the same thresholds as the sweep so the two cannot
    /// oscillate. CANCELLED showtimes are left alone.
    pub async fn repair(&self, showtime_id: &str) -> Result<Showtime, AppError> {
        let showtime = self
            .showtimes
            .find_by_id(showtime_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Showtime {} not found", showtime_id)))?;

        let expected = expected_status(showtime.start_time, showtime.end_time, Utc::now());
        if showtime.status != "CANCELLED" && showtime.status != expected {
            let changed = self.showtimes.repair_status(showtime_id, expected).await?;
            if changed {
                info!(
                    showtime_id,
                    from = %showtime.status,
                    to = expected,
                    "Repaired divergent showtime status"
                );
            }
        }

        self.showtimes
            .find_by_id(showtime_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Showtime {} not found", showtime_id)))
    }
}

/// The booking-window phase a showtime should be in, given its timestamps.
/// Shared threshold definitions between the sweep steps and `repair`.
pub fn expected_status(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> &'static str {
    if end_time <= now {
        "COMPLETED"
    } else if start_time <= now + Duration::minutes(CLOSE_WINDOW_MINUTES) {
        "BOOKING_CLOSED"
    } else if start_time <= now + Duration::hours(OPEN_WINDOW_HOURS) {
        "BOOKING_OPEN"
    } else {
        "SCHEDULED"
    }
}
