use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{
    is_valid_price, AlertSubscription, Direction, NewSubscription, PriceSnapshotEntry, SubscriptionId,
};

use super::store::SubscriptionStore;

#[derive(Default)]
struct Tables {
    subscriptions: Vec<AlertSubscription>,
    snapshot: Vec<PriceSnapshotEntry>,
}

/// Process-local store. Both tables sit behind one lock, so every call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_triple(sub: &AlertSubscription, owner: &str, symbol: &str, direction: Direction) -> bool {
    sub.owner == owner && sub.symbol == symbol && sub.direction == direction
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn update_target(
        &self,
        owner: &str,
        symbol: &str,
        direction: Direction,
        target_price: f64,
        rearm: bool,
    ) -> Result<Option<SubscriptionId>, StoreError> {
        let mut tables = self.tables.lock().await;

        let Some(sub) = tables
            .subscriptions
            .iter_mut()
            .find(|s| same_triple(s, owner, symbol, direction))
        else {
            return Ok(None);
        };

        sub.target_price = target_price;
        if rearm {
            sub.was_notified = false;
            sub.notified_at = None;
        }

        Ok(Some(sub.id))
    }

    async fn insert_subscription(&self, new: NewSubscription) -> Result<SubscriptionId, StoreError> {
        let mut tables = self.tables.lock().await;

        if let Some(existing) = tables
            .subscriptions
            .iter_mut()
            .find(|s| same_triple(s, &new.owner, &new.symbol, new.direction))
        {
            existing.target_price = new.target_price;
            return Ok(existing.id);
        }

        let sub = AlertSubscription {
            id: ObjectId::new(),
            owner: new.owner,
            notify_target: new.notify_target,
            symbol: new.symbol,
            target_price: new.target_price,
            direction: new.direction,
            was_notified: false,
            created_at: Utc::now().timestamp(),
            notified_at: None,
        };
        let id = sub.id;
        tables.subscriptions.push(sub);

        Ok(id)
    }

    async fn delete_symbol(&self, owner: &str, symbol: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.subscriptions.len();
        tables
            .subscriptions
            .retain(|s| !(s.owner == owner && s.symbol == symbol));
        Ok((before - tables.subscriptions.len()) as u64)
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.subscriptions.len();
        tables.subscriptions.retain(|s| s.owner != owner);
        Ok((before - tables.subscriptions.len()) as u64)
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<AlertSubscription>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect())
    }

    async fn distinct_symbols(&self) -> Result<BTreeSet<String>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.subscriptions.iter().map(|s| s.symbol.clone()).collect())
    }

    async fn replace_snapshot(&self, entries: Vec<PriceSnapshotEntry>) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.snapshot = entries
            .into_iter()
            .filter(|e| is_valid_price(e.price))
            .collect();
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<PriceSnapshotEntry>, StoreError> {
        Ok(self.tables.lock().await.snapshot.clone())
    }

    async fn active_with_prices(&self) -> Result<Vec<(AlertSubscription, f64)>, StoreError> {
        let tables = self.tables.lock().await;

        let prices: HashMap<&str, f64> = tables
            .snapshot
            .iter()
            .filter(|e| is_valid_price(e.price))
            .map(|e| (e.symbol.as_str(), e.price))
            .collect();

        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| !s.was_notified)
            .filter_map(|s| prices.get(s.symbol.as_str()).map(|p| (s.clone(), *p)))
            .collect())
    }

    async fn mark_notified(&self, id: SubscriptionId, at: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;

        match tables
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id && !s.was_notified)
        {
            Some(sub) => {
                sub.was_notified = true;
                sub.notified_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
