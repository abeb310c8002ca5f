use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, NotificationService, PaymentRepository, SeatLockRepository,
    ShowtimeRepository,
};
use crate::domain::services::booking_expiry::BookingExpiryScheduler;
use crate::domain::services::payment_expiry::PaymentExpiryScheduler;
use crate::domain::services::reconciler::Reconciler;
use crate::domain::services::seat_locks::SeatLockManager;
use crate::domain::services::showtime_sweeper::ShowtimeSweeper;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub seat_lock_repo: Arc<dyn SeatLockRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub showtime_repo: Arc<dyn ShowtimeRepository>,
    pub notifier: Arc<dyn NotificationService>,
    pub seat_locks: Arc<SeatLockManager>,
    pub booking_expiry: Arc<BookingExpiryScheduler>,
    pub payment_expiry: Arc<PaymentExpiryScheduler>,
    pub showtime_sweeper: Arc<ShowtimeSweeper>,
    pub reconciler: Arc<Reconciler>,
}
