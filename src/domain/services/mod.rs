pub mod booking_expiry;
pub mod job_table;
pub mod payment_expiry;
pub mod reconciler;
pub mod seat_locks;
pub mod showtime_sweeper;
