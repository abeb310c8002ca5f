use crate::domain::models::seat_lock::{Seat, SeatLockRow};
use crate::domain::ports::SeatLockRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteSeatLockRepo {
    pool: SqlitePool,
}

impl SqliteSeatLockRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatLockRepository for SqliteSeatLockRepo {
    async fn find_conflicts(
        &self,
        showtime_id: &str,
        seats: &[Seat],
        now: DateTime<Utc>,
    ) -> Result<Vec<Seat>, AppError> {
        let live = sqlx::query_as::<_, SeatLockRow>(
            "SELECT * FROM seat_locks WHERE showtime_id = ? AND expires_at > ?",
        )
        .bind(showtime_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let conflicts = live
            .iter()
            .map(|row| row.seat())
            .filter(|held| seats.contains(held))
            .collect();
        Ok(conflicts)
    }

    async fn insert_hold(&self, rows: &[SeatLockRow], now: DateTime<Utc>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for row in rows {
            // Expired leftovers on the wanted seat would trip the unique
            // index; clear them inside the same transaction.
            sqlx::query(
                "DELETE FROM seat_locks WHERE showtime_id = ? AND seat_row = ? AND seat_number = ? AND expires_at <= ?",
            )
            .bind(&row.showtime_id)
            .bind(&row.seat_row)
            .bind(row.seat_number)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            sqlx::query(
                "INSERT INTO seat_locks (id, lock_id, showtime_id, user_id, seat_row, seat_number, expires_at, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&row.id)
            .bind(&row.lock_id)
            .bind(&row.showtime_id)
            .bind(&row.user_id)
            .bind(&row.seat_row)
            .bind(row.seat_number)
            .bind(row.expires_at)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn delete_by_owner(&self, showtime_id: &str, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM seat_locks WHERE showtime_id = ? AND user_id = ?")
            .bind(showtime_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn extend_by_owner(
        &self,
        showtime_id: &str,
        user_id: &str,
        new_expiry: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE seat_locks SET expires_at = ? WHERE showtime_id = ? AND user_id = ? AND expires_at > ?",
        )
        .bind(new_expiry)
        .bind(showtime_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn find_live_by_owner(
        &self,
        showtime_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatLockRow>, AppError> {
        sqlx::query_as::<_, SeatLockRow>(
            "SELECT * FROM seat_locks WHERE showtime_id = ? AND user_id = ? AND expires_at > ?",
        )
        .bind(showtime_id)
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM seat_locks WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn count_live(&self, now: DateTime<Utc>) -> Result<i64, AppError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM seat_locks WHERE expires_at > ?")
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;
        Ok(count.0)
    }
}
