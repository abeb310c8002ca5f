use crate::domain::models::payment::Payment;
use crate::domain::ports::PaymentRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqlitePaymentRepo {
    pool: SqlitePool,
}

impl SqlitePaymentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepo {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, booking_id, user_id, amount, method, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&payment.id)
        .bind(&payment.booking_id)
        .bind(&payment.user_id)
        .bind(payment.amount)
        .bind(&payment.method)
        .bind(&payment.status)
        .bind(payment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn transition(&self, id: &str, from: &str, to: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE payments SET status = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(id)
            .bind(from)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn fail_pending_for_booking(&self, booking_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'FAILED' WHERE booking_id = ? AND status = 'PENDING'",
        )
        .bind(booking_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn find_pending(&self) -> Result<Vec<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE status = 'PENDING'")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query("SELECT status, COUNT(*) as count FROM payments GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("status"), row.get::<i64, _>("count")))
            .collect())
    }
}
