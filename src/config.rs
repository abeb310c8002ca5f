use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_service_url: String,
    pub notify_service_token: String,
    /// How long an acquired seat hold lives before it expires.
    pub seat_hold: Duration,
    /// Deadline for paying a pending booking before it is auto-cancelled.
    pub booking_deadline: Duration,
    /// Deadline for a pending payment attempt before it is cancelled.
    pub payment_deadline: Duration,
    pub lock_sweep_interval: Duration,
    pub showtime_sweep_interval: Duration,
    pub reconcile_interval: Duration,
}

fn duration_from_env(key: &str, default_secs: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8100/api/v1/notify".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN")
                .unwrap_or_else(|_| "test-token-1".to_string()),
            seat_hold: duration_from_env("SEAT_HOLD_SECS", 5 * 60),
            booking_deadline: duration_from_env("BOOKING_DEADLINE_SECS", 5 * 60),
            payment_deadline: duration_from_env("PAYMENT_DEADLINE_SECS", 15 * 60),
            lock_sweep_interval: duration_from_env("LOCK_SWEEP_INTERVAL_SECS", 60),
            showtime_sweep_interval: duration_from_env("SHOWTIME_SWEEP_INTERVAL_SECS", 10 * 60),
            reconcile_interval: duration_from_env("RECONCILE_INTERVAL_SECS", 2 * 60),
        }
    }
}
