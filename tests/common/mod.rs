#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stockalerts::{
    config::{Settings, StoreBackend},
    error::StoreError,
    models::{AlertSubscription, Direction, NewSubscription, PriceBreachNotification, PriceSnapshotEntry, SubscriptionId},
    services::{
        notifier::{NotifyError, Notifier},
        quote_source::{QuoteError, QuoteSource},
        store::SubscriptionStore,
    },
};

/// Quote source with a price table the test can change between calls.
/// Symbols listed in `hang` never answer; symbols in `slow` answer after a delay.
#[derive(Default)]
pub struct ScriptedQuotes {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<BTreeSet<String>>,
    hang: Mutex<BTreeSet<String>>,
    slow: Mutex<HashMap<String, Duration>>,
    pub calls: AtomicUsize,
}

impl ScriptedQuotes {
    pub fn new(prices: &[(&str, f64)]) -> Arc<Self> {
        let source = Self::default();
        for (sym, price) in prices {
            source.set(sym, *price);
        }
        Arc::new(source)
    }

    pub fn set(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(symbol.to_string());
    }

    pub fn hang(&self, symbol: &str) {
        self.hang.lock().unwrap().insert(symbol.to_string());
    }

    pub fn slow(&self, symbol: &str, delay: Duration) {
        self.slow.lock().unwrap().insert(symbol.to_string(), delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for ScriptedQuotes {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let hangs = self.hang.lock().unwrap().contains(symbol);
        if hangs {
            std::future::pending::<()>().await;
        }

        let delay = self.slow.lock().unwrap().get(symbol).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let fails = self.failing.lock().unwrap().contains(symbol);
        if fails {
            return Err(QuoteError::MissingApiKey { provider: "scripted" });
        }

        Ok(self.prices.lock().unwrap().get(symbol).copied().unwrap_or(0.0))
    }
}

/// Records every notification; symbols in `reject` fail delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<PriceBreachNotification>>,
    reject: Mutex<BTreeSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject(&self, symbol: &str) {
        self.reject.lock().unwrap().insert(symbol.to_string());
    }

    pub fn sent(&self) -> Vec<PriceBreachNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &PriceBreachNotification) -> Result<(), NotifyError> {
        if self.reject.lock().unwrap().contains(&notification.symbol) {
            return Err(NotifyError::NoWebhook("tests"));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// A store whose every call fails, as if the database were down.
pub struct DownStore;

fn down() -> StoreError {
    StoreError::Backend("connection refused".to_string())
}

#[async_trait]
impl SubscriptionStore for DownStore {
    async fn update_target(&self, _: &str, _: &str, _: Direction, _: f64, _: bool) -> Result<Option<SubscriptionId>, StoreError> {
        Err(down())
    }

    async fn insert_subscription(&self, _: NewSubscription) -> Result<SubscriptionId, StoreError> {
        Err(down())
    }

    async fn delete_symbol(&self, _: &str, _: &str) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn delete_all(&self, _: &str) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn list_for_owner(&self, _: &str) -> Result<Vec<AlertSubscription>, StoreError> {
        Err(down())
    }

    async fn distinct_symbols(&self) -> Result<BTreeSet<String>, StoreError> {
        Err(down())
    }

    async fn replace_snapshot(&self, _: Vec<PriceSnapshotEntry>) -> Result<(), StoreError> {
        Err(down())
    }

    async fn snapshot(&self) -> Result<Vec<PriceSnapshotEntry>, StoreError> {
        Err(down())
    }

    async fn active_with_prices(&self) -> Result<Vec<(AlertSubscription, f64)>, StoreError> {
        Err(down())
    }

    async fn mark_notified(&self, _: SubscriptionId, _: i64) -> Result<bool, StoreError> {
        Err(down())
    }
}

pub fn test_settings() -> Settings {
    Settings {
        store_backend: StoreBackend::Memory,
        quote_provider: "scripted".to_string(),
        fetch_deadline: Duration::from_secs(2),
        lookup_deadline: Duration::from_secs(1),
        ..Settings::default()
    }
}
