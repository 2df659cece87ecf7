use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::AlertError;
use crate::models::{PriceBreachNotification, PriceSnapshotEntry};

use super::{notifier::Notifier, quote_bridge::QuoteBridge, store::SubscriptionStore};

/// What one detection cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub symbols_requested: usize,
    pub prices_received: usize,
    pub evaluated: usize,
    pub breaches: usize,
    pub delivered: usize,
    pub failed: usize,
    /// The fetch timed out or no usable prices came back; nothing was written.
    pub aborted: bool,
    /// Another cycle was still running.
    pub skipped: bool,
}

impl CycleReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Compares live prices with pending alerts and fires each alert at most once.
pub struct BreachDetector {
    store: Arc<dyn SubscriptionStore>,
    quotes: QuoteBridge,
    notifier: Arc<dyn Notifier>,
    fetch_deadline: Duration,
    in_flight: Mutex<()>,
}

impl BreachDetector {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        quotes: QuoteBridge,
        notifier: Arc<dyn Notifier>,
        fetch_deadline: Duration,
    ) -> Self {
        Self {
            store,
            quotes,
            notifier,
            fetch_deadline,
            in_flight: Mutex::new(()),
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport, AlertError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("previous detection cycle still running, skipping");
            return Ok(CycleReport::skipped());
        };

        let mut report = CycleReport::default();

        // 1) Everything anyone is watching
        let symbols = self.store.distinct_symbols().await?;
        report.symbols_requested = symbols.len();
        if symbols.is_empty() {
            return Ok(report);
        }

        // 2) Live prices, bounded by the deadline
        let batch = self.quotes.fetch(&symbols, self.fetch_deadline).await;
        let sampled_at = Utc::now().timestamp();
        let entries: Vec<PriceSnapshotEntry> = batch
            .resolved()
            .map(|p| PriceSnapshotEntry {
                symbol: p.symbol.clone(),
                price: p.price,
                sampled_at,
            })
            .collect();

        report.prices_received = entries.len();

        // A timed-out batch counts as no data.
        if batch.timed_out() || entries.is_empty() {
            tracing::warn!(
                outcome = ?batch.outcome(),
                received = report.prices_received,
                "no complete price batch this cycle, leaving snapshot untouched"
            );
            report.aborted = true;
            return Ok(report);
        }

        let unresolved = batch.unresolved();
        if !unresolved.is_empty() {
            tracing::info!(outcome = ?batch.outcome(), ?unresolved, "some symbols have no price this cycle");
        }

        // 3) Swap in the new snapshot
        self.store.replace_snapshot(entries).await?;

        // 4) Pending alerts that have a price
        let candidates = self.store.active_with_prices().await?;
        report.evaluated = candidates.len();

        // 5) + 6) + 7) Compare, claim, deliver
        for (sub, current_price) in candidates {
            if !sub.direction.is_breached(sub.target_price, current_price) {
                continue;
            }

            let claimed = match self.store.mark_notified(sub.id, Utc::now().timestamp()).await {
                Ok(claimed) => claimed,
                Err(e) => {
                    tracing::error!(id = %sub.id, error = %e, "could not mark alert notified");
                    report.failed += 1;
                    continue;
                }
            };
            if !claimed {
                continue;
            }

            report.breaches += 1;
            let notification = PriceBreachNotification::for_subscription(&sub, current_price);

            match self.notifier.notify(&notification).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        id = %sub.id,
                        owner = %sub.owner,
                        symbol = %sub.symbol,
                        error = %e,
                        "breach notification not delivered"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            symbols = report.symbols_requested,
            prices = report.prices_received,
            evaluated = report.evaluated,
            breaches = report.breaches,
            delivered = report.delivered,
            failed = report.failed,
            "detection cycle finished"
        );

        Ok(report)
    }
}
