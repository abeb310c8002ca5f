pub mod sqlite_booking_repo;
pub mod sqlite_payment_repo;
pub mod sqlite_seat_lock_repo;
pub mod sqlite_showtime_repo;
