use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use cinema_backend::{
    background::start_background_worker,
    config::Config,
    domain::models::seat_lock::Seat,
    domain::models::showtime::{NewShowtimeParams, Showtime},
    domain::ports::NotificationService,
    error::AppError,
    infra::factory::build_state,
    state::AppState,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

/// Records every notification instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, Value)>>,
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn notify(&self, user_id: &str, kind: &str, payload: &Value) -> Result<(), AppError> {
        self.sent
            .lock()
            .await
            .push((user_id.to_string(), kind.to_string(), payload.clone()));
        Ok(())
    }
}

pub fn test_config(db_url: &str) -> Config {
    Config {
        database_url: db_url.to_string(),
        port: 0,
        notify_service_url: "http://localhost".to_string(),
        notify_service_token: "token".to_string(),
        seat_hold: Duration::from_secs(60),
        booking_deadline: Duration::from_secs(60),
        payment_deadline: Duration::from_secs(60),
        // Long enough that loops never tick mid-test; tests drive the
        // sweeps directly unless they opt into short intervals.
        lock_sweep_interval: Duration::from_secs(3600),
        showtime_sweep_interval: Duration::from_secs(3600),
        reconcile_interval: Duration::from_secs(3600),
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub notifier: Arc<RecordingNotifier>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);
        let config = test_config(&db_url);
        Self::with_config(config, db_filename).await
    }

    pub async fn with_deadlines(booking: Duration, payment: Duration, hold: Duration) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);
        let mut config = test_config(&db_url);
        config.booking_deadline = booking;
        config.payment_deadline = payment;
        config.seat_hold = hold;
        Self::with_config(config, db_filename).await
    }

    pub async fn with_config(config: Config, db_filename: String) -> Self {
        let connection_options = SqliteConnectOptions::from_str(&config.database_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let notifier = Arc::new(RecordingNotifier::default());
        let state = Arc::new(build_state(config, pool.clone(), notifier.clone()));

        let worker_state = state.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });

        let router = cinema_backend::api::router::create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            notifier,
        }
    }

    /// Inserts a showtime directly through the repository; catalog
    /// management is outside the engine's API surface.
    pub async fn seed_showtime(
        &self,
        status: &str,
        start_in_minutes: i64,
        total_seats: i64,
    ) -> Showtime {
        let mut showtime = Showtime::new(NewShowtimeParams {
            movie_id: "movie-1".to_string(),
            theater_id: "theater-1".to_string(),
            start_time: Utc::now() + ChronoDuration::minutes(start_in_minutes),
            duration_min: 120,
            price: 12.5,
            total_seats,
        });
        showtime.status = status.to_string();
        self.state
            .showtime_repo
            .create(&showtime)
            .await
            .expect("Failed to seed showtime")
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn post_empty(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn delete(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn seat(row: &str, number: i32) -> Seat {
    Seat {
        row: row.to_string(),
        number,
    }
}
