//! src/services/scheduler.rs
//!
//! Fixed-interval drive loop: one cycle immediately at startup, then one per
//! interval, never overlapping, until the shutdown token fires.

use crate::services::sync_service::SyncService;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run sync cycles forever, spacing them `every` apart.
///
/// The first tick fires immediately. A cycle that overruns the interval
/// delays the next tick instead of stacking a second cycle behind it, and
/// missed ticks are not replayed. Cancelling `shutdown` exits the loop
/// cleanly and releases the timer; an in-flight cycle is not interrupted.
pub async fn run(service: SyncService, every: Duration, shutdown: CancellationToken) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("starting sync cycle");
                match service.run_cycle().await {
                    Ok(_) => info!("cycle finished; waiting for next tick"),
                    Err(err) => {
                        warn!(error = %err, "sync cycle aborted; will retry on next tick");
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!("shutdown requested; stopping scheduler");
                break;
            }
        }
    }
}
