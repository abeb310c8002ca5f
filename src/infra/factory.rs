use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::booking_expiry::BookingExpiryScheduler;
use crate::domain::services::payment_expiry::PaymentExpiryScheduler;
use crate::domain::services::reconciler::Reconciler;
use crate::domain::services::seat_locks::SeatLockManager;
use crate::domain::services::showtime_sweeper::ShowtimeSweeper;
use crate::infra::notify::http_notification_service::HttpNotificationService;
use crate::infra::repositories::{
    sqlite_booking_repo::SqliteBookingRepo, sqlite_payment_repo::SqlitePaymentRepo,
    sqlite_seat_lock_repo::SqliteSeatLockRepo, sqlite_showtime_repo::SqliteShowtimeRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_sqlite_migrations(&pool).await;

    let notifier = Arc::new(HttpNotificationService::new(
        config.notify_service_url.clone(),
        config.notify_service_token.clone(),
    ));

    build_state(config.clone(), pool, notifier)
}

/// Wires repositories and engine components once at startup; everything
/// downstream receives handles from the returned state.
pub fn build_state(
    config: Config,
    pool: SqlitePool,
    notifier: Arc<dyn crate::domain::ports::NotificationService>,
) -> AppState {
    let seat_lock_repo = Arc::new(SqliteSeatLockRepo::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
    let payment_repo = Arc::new(SqlitePaymentRepo::new(pool.clone()));
    let showtime_repo = Arc::new(SqliteShowtimeRepo::new(pool.clone()));

    let seat_locks = Arc::new(SeatLockManager::new(
        seat_lock_repo.clone(),
        config.seat_hold,
    ));

    let booking_expiry = BookingExpiryScheduler::new(
        booking_repo.clone(),
        payment_repo.clone(),
        showtime_repo.clone(),
        seat_locks.clone(),
        notifier.clone(),
        config.booking_deadline,
    );

    let payment_expiry = PaymentExpiryScheduler::new(
        payment_repo.clone(),
        booking_repo.clone(),
        config.payment_deadline,
    );

    let showtime_sweeper = Arc::new(ShowtimeSweeper::new(showtime_repo.clone()));

    let reconciler = Arc::new(Reconciler::new(
        booking_repo.clone(),
        showtime_repo.clone(),
        seat_locks.clone(),
    ));

    AppState {
        config,
        seat_lock_repo,
        booking_repo,
        payment_repo,
        showtime_repo,
        notifier,
        seat_locks,
        booking_expiry,
        payment_expiry,
        showtime_sweeper,
        reconciler,
    }
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
