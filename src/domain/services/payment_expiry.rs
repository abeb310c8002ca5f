use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::domain::ports::{BookingRepository, PaymentRepository};
use crate::domain::services::job_table::JobTable;
use crate::error::AppError;

/// Per-payment one-shot expiry timers, independent of the booking clock so
/// a user can retry payment without re-booking.
///
/// A fire cancels the payment and marks the owning booking's payment_status
/// CANCELLED. Booking.status is deliberately left alone; the reconciler
/// brings it into agreement.
pub struct PaymentExpiryScheduler {
    payments: Arc<dyn PaymentRepository>,
    bookings: Arc<dyn BookingRepository>,
    deadline: Duration,
    jobs: JobTable,
}

impl PaymentExpiryScheduler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        bookings: Arc<dyn BookingRepository>,
        deadline: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            payments,
            bookings,
            deadline,
            jobs: JobTable::new(),
        })
    }

    pub async fn schedule(self: &Arc<Self>, payment_id: &str) {
        self.arm(payment_id, self.deadline).await;
    }

    pub async fn cancel(&self, payment_id: &str) {
        self.jobs.remove(payment_id).await;
    }

    /// Re-arms timers for payments still pending after a restart, keyed off
    /// `created_at` plus the deadline.
    pub async fn recover_on_startup(self: &Arc<Self>) -> Result<usize, AppError> {
        let pending = self.payments.find_pending().await?;
        let total = pending.len();
        for payment in pending {
            let deadline =
                payment.created_at + chrono::Duration::from_std(self.deadline).unwrap_or_default();
            let now = Utc::now();
            if deadline <= now {
                if let Err(e) = self.expire(&payment.id).await {
                    error!(payment_id = %payment.id, "Recovery expiry failed: {:?}", e);
                }
            } else {
                let remaining = (deadline - now).to_std().unwrap_or_default();
                self.arm(&payment.id, remaining).await;
            }
        }
        if total > 0 {
            info!("Recovered {} pending payment timers", total);
        }
        Ok(total)
    }

    pub async fn shutdown(&self) {
        self.jobs.shutdown().await;
    }

    pub async fn armed_count(&self) -> usize {
        self.jobs.len().await
    }

    async fn arm(self: &Arc<Self>, payment_id: &str, delay: Duration) {
        let scheduler = self.clone();
        let id = payment_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = scheduler.expire(&id).await {
                error!(payment_id = %id, "Payment expiry failed: {:?}", e);
            }
            scheduler.jobs.forget(&id).await;
        });
        self.jobs.insert(payment_id, handle).await;
    }

    pub async fn expire(&self, payment_id: &str) -> Result<bool, AppError> {
        let payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;

        if !self
            .payments
            .transition(payment_id, "PENDING", "CANCELLED")
            .await?
        {
            return Ok(false);
        }

        self.bookings
            .set_payment_status(&payment.booking_id, "CANCELLED")
            .await?;

        info!(
            payment_id,
            booking_id = %payment.booking_id,
            "Payment timed out and was cancelled"
        );
        Ok(true)
    }
}
