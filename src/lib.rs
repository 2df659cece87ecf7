//! Library entrypoint for the stock alert service.
//!
//! Everything the binary wires together is reachable from here so the
//! integration tests under `tests/` can build the same pieces in isolation.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod middleware;
pub mod routes;

use services::{
    alerts_service::SubscriptionManager, quote_bridge::QuoteBridge, quote_source::QuoteSource,
    store::SubscriptionStore,
};

/// Built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub quotes: QuoteBridge,
    pub subscriptions: SubscriptionManager,
}

impl AppState {
    pub fn new(
        settings: config::Settings,
        store: Arc<dyn SubscriptionStore>,
        source: Arc<dyn QuoteSource>,
    ) -> Self {
        let quotes = QuoteBridge::new(source);
        let subscriptions = SubscriptionManager::new(store, quotes.clone(), settings.lookup_deadline)
            .with_rearm_on_update(settings.rearm_on_update);

        Self {
            settings,
            quotes,
            subscriptions,
        }
    }
}
