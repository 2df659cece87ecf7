use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::breach_detector::BreachDetector;

/// Runs one detection cycle per `every`. A cycle is awaited before the next
/// tick is taken, and ticks missed while it runs are dropped.
pub fn spawn_price_alert_monitor(detector: Arc<BreachDetector>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            if let Err(e) = detector.run_cycle().await {
                tracing::error!(error = %e, "[alert-monitor] tick error");
            }
        }
    })
}
