use serde::Serialize;

use crate::domain::services::showtime_sweeper::SweepReport;

#[derive(Serialize)]
pub struct CleanupReport {
    pub expired_locks_removed: u64,
    pub showtimes: SweepReport,
    pub bookings_reconciled: u64,
}

#[derive(Serialize)]
pub struct StatusCounts {
    pub showtimes: Vec<(String, i64)>,
    pub bookings: Vec<(String, i64)>,
    pub payments: Vec<(String, i64)>,
    pub live_seat_locks: i64,
    pub armed_booking_timers: usize,
    pub armed_payment_timers: usize,
}
