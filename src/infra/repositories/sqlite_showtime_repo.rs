use crate::domain::models::showtime::Showtime;
use crate::domain::ports::ShowtimeRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

pub struct SqliteShowtimeRepo {
    pool: SqlitePool,
}

impl SqliteShowtimeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShowtimeRepository for SqliteShowtimeRepo {
    async fn create(&self, showtime: &Showtime) -> Result<Showtime, AppError> {
        sqlx::query_as::<_, Showtime>(
            "INSERT INTO showtimes (id, movie_id, theater_id, start_time, end_time, status, price, total_seats, available_seats, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&showtime.id)
        .bind(&showtime.movie_id)
        .bind(&showtime.theater_id)
        .bind(showtime.start_time)
        .bind(showtime.end_time)
        .bind(&showtime.status)
        .bind(showtime.price)
        .bind(showtime.total_seats)
        .bind(showtime.available_seats)
        .bind(showtime.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Showtime>, AppError> {
        sqlx::query_as::<_, Showtime>("SELECT * FROM showtimes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn reserve_seats(&self, id: &str, count: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET available_seats = available_seats - ?
             WHERE id = ? AND status = 'BOOKING_OPEN' AND available_seats >= ?",
        )
        .bind(count)
        .bind(id)
        .bind(count)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn restore_seats(&self, id: &str, count: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET available_seats = MIN(total_seats, available_seats + ?) WHERE id = ?",
        )
        .bind(count)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn open_due(&self, now: DateTime<Utc>, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET status = 'BOOKING_OPEN'
             WHERE status = 'SCHEDULED' AND start_time > ? AND start_time <= ?",
        )
        .bind(now)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn close_due(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET status = 'BOOKING_CLOSED'
             WHERE status = 'BOOKING_OPEN' AND start_time <= ?",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn complete_due(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET status = 'COMPLETED'
             WHERE status = 'BOOKING_CLOSED' AND end_time <= ?",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn delete_stale_completed(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM showtimes
             WHERE status = 'COMPLETED' AND end_time <= ?
               AND NOT EXISTS (SELECT 1 FROM bookings WHERE bookings.showtime_id = showtimes.id)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn cancel_abandoned(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET status = 'CANCELLED'
             WHERE status = 'SCHEDULED' AND start_time <= ?
               AND NOT EXISTS (SELECT 1 FROM bookings WHERE bookings.showtime_id = showtimes.id)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn repair_status(&self, id: &str, expected: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE showtimes SET status = ?
             WHERE id = ? AND status != ? AND status != 'CANCELLED'",
        )
        .bind(expected)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query("SELECT status, COUNT(*) as count FROM showtimes GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("status"), row.get::<i64, _>("count")))
            .collect())
    }
}
