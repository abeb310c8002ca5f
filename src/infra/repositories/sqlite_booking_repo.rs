use crate::domain::models::booking::Booking;
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, showtime_id, movie_id, theater_id, seats, total_amount, status, payment_status, booking_time, ticket_code)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&booking.id)
        .bind(&booking.user_id)
        .bind(&booking.showtime_id)
        .bind(&booking.movie_id)
        .bind(&booking.theater_id)
        .bind(&booking.seats)
        .bind(booking.total_amount)
        .bind(&booking.status)
        .bind(&booking.payment_status)
        .bind(booking.booking_time)
        .bind(&booking.ticket_code)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_expired(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CANCELLED', payment_status = 'FAILED'
             WHERE id = ? AND status = 'PENDING' AND payment_status = 'PENDING'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn cancel_pending(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CANCELLED', payment_status = 'CANCELLED'
             WHERE id = ? AND status = 'PENDING' AND payment_status = 'PENDING'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn confirm_paid(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CONFIRMED', payment_status = 'COMPLETED'
             WHERE id = ? AND status = 'PENDING'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_payment_status(&self, id: &str, payment_status: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_status = ? WHERE id = ? AND payment_status = 'PENDING'",
        )
        .bind(payment_status)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn force_cancel(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CANCELLED' WHERE id = ? AND status != 'CANCELLED'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_pending_unpaid(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = 'PENDING' AND payment_status = 'PENDING'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_payment_diverged(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE payment_status IN ('CANCELLED', 'FAILED') AND status != 'CANCELLED'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query("SELECT status, COUNT(*) as count FROM bookings GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("status"), row.get::<i64, _>("count")))
            .collect())
    }
}
