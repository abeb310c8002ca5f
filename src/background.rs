use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info};

use crate::state::AppState;

/// Recovers in-memory timers from the store, then runs the three sweep
/// loops for the life of the process. Every loop swallows store errors and
/// tries again on the next tick; a crashed loop would silently stop the
/// engine converging.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting lifecycle background worker...");

    if let Err(e) = state.booking_expiry.recover_on_startup().await {
        error!("Booking timer recovery failed: {:?}", e);
    }
    if let Err(e) = state.payment_expiry.recover_on_startup().await {
        error!("Payment timer recovery failed: {:?}", e);
    }

    // Each loop waits out one interval before its first pass; startup
    // recovery above already handled anything overdue.
    let lock_state = state.clone();
    tokio::spawn(async move {
        loop {
            sleep(lock_state.config.lock_sweep_interval).await;
            match lock_state.seat_locks.sweep_expired().await {
                Ok(n) if n > 0 => info!("Seat lock sweep removed {} expired rows", n),
                Ok(_) => {}
                Err(e) => error!("Seat lock sweep failed: {:?}", e),
            }
        }
    });

    let sweep_state = state.clone();
    tokio::spawn(async move {
        loop {
            sleep(sweep_state.config.showtime_sweep_interval).await;
            sweep_state.showtime_sweeper.run_once().await;
        }
    });

    let reconcile_state = state.clone();
    tokio::spawn(async move {
        loop {
            sleep(reconcile_state.config.reconcile_interval).await;
            reconcile_state.reconciler.run_once().await;
        }
    });
}
