//! Deadline-bounded batch quote lookups.
//!
//! Every call spawns its own task and its own channel. When the deadline
//! passes first the caller walks away with whatever arrived; the task keeps
//! running but its sends fail once the receiver is gone, so nothing it
//! produces can reach a later call.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;

use crate::models::{is_valid_price, normalize_symbol, PriceInfo};

use super::quote_source::QuoteSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Every requested symbol came back with a usable price.
    Complete,
    /// The batch finished but some symbols had no usable price.
    Partial,
    /// The deadline elapsed before the batch finished.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBatch {
    requested: Vec<String>,
    prices: Vec<PriceInfo>,
    timed_out: bool,
}

impl QuoteBatch {
    fn empty() -> Self {
        Self {
            requested: Vec::new(),
            prices: Vec::new(),
            timed_out: false,
        }
    }

    /// Everything that arrived before the deadline, including zero prices.
    pub fn prices(&self) -> &[PriceInfo] {
        &self.prices
    }

    /// Only the entries with a positive price.
    pub fn resolved(&self) -> impl Iterator<Item = &PriceInfo> {
        self.prices.iter().filter(|p| p.is_valid())
    }

    /// Requested symbols with no usable price, sorted.
    pub fn unresolved(&self) -> Vec<String> {
        self.requested
            .iter()
            .filter(|sym| !self.resolved().any(|p| &p.symbol == *sym))
            .cloned()
            .collect()
    }

    pub fn price_of(&self, symbol: &str) -> Option<f64> {
        self.resolved().find(|p| p.symbol == symbol).map(|p| p.price)
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn has_prices(&self) -> bool {
        self.resolved().next().is_some()
    }

    pub fn outcome(&self) -> FetchOutcome {
        if self.timed_out {
            FetchOutcome::TimedOut
        } else if self.unresolved().is_empty() {
            FetchOutcome::Complete
        } else {
            FetchOutcome::Partial
        }
    }
}

#[derive(Clone)]
pub struct QuoteBridge {
    source: Arc<dyn QuoteSource>,
}

impl QuoteBridge {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }

    /// Prices `symbols` concurrently and returns no later than `deadline`.
    pub async fn fetch<I, S>(&self, symbols: I, deadline: Duration) -> QuoteBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: Vec<String> = symbols
            .into_iter()
            .filter_map(|s| normalize_symbol(s.as_ref()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if requested.is_empty() {
            return QuoteBatch::empty();
        }

        // Scoped to this call only.
        let (tx, mut rx) = mpsc::channel::<PriceInfo>(requested.len());

        let source = self.source.clone();
        let batch = requested.clone();
        let worker = tokio::spawn(async move {
            let mut pending: FuturesUnordered<_> = batch
                .into_iter()
                .map(|symbol| {
                    let source = source.clone();
                    async move { price_one(source.as_ref(), symbol).await }
                })
                .collect();

            while let Some(info) = pending.next().await {
                if tx.send(info).await.is_err() {
                    tracing::debug!("quote batch abandoned by caller, dropping late results");
                    return;
                }
            }
        });

        let mut prices = Vec::with_capacity(requested.len());
        let mut timed_out = false;

        let sleep = tokio::time::sleep(deadline);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(info) => prices.push(info),
                    // sender dropped: batch done (or the task died)
                    None => break,
                },
                _ = &mut sleep => {
                    timed_out = true;
                    break;
                }
            }
        }
        drop(rx);
        // Lookups still in flight past the deadline are cancelled, not left running.
        worker.abort();

        if timed_out {
            tracing::warn!(
                provider = self.source.name(),
                requested = requested.len(),
                received = prices.len(),
                deadline_ms = deadline.as_millis() as u64,
                "quote fetch deadline exceeded"
            );
        }

        prices.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        QuoteBatch {
            requested,
            prices,
            timed_out,
        }
    }

    /// Single-symbol lookup. `None` when the symbol has no usable price in time.
    pub async fn fetch_one(&self, symbol: &str, deadline: Duration) -> Option<f64> {
        let sym = normalize_symbol(symbol)?;
        self.fetch([sym.as_str()], deadline).await.price_of(&sym)
    }
}

async fn price_one(source: &dyn QuoteSource, symbol: String) -> PriceInfo {
    match source.fetch_price(&symbol).await {
        Ok(price) if is_valid_price(price) => PriceInfo::new(symbol, price),
        Ok(price) => {
            tracing::debug!(provider = source.name(), symbol = %symbol, price, "no usable price");
            PriceInfo::unresolved(symbol)
        }
        Err(e) => {
            tracing::warn!(provider = source.name(), symbol = %symbol, error = %e, "quote lookup failed");
            PriceInfo::unresolved(symbol)
        }
    }
}
