pub mod booking;
pub mod payment;
pub mod seat_lock;
pub mod showtime;
