use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{AlertSubscription, Direction, NewSubscription, PriceSnapshotEntry, SubscriptionId};

/// Durable home of subscriptions and the latest price snapshot.
///
/// Each method is one atomic unit from the caller's point of view, so a
/// read-then-write sequence never needs to span two calls.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Sets a new target on the (owner, symbol, direction) row if it exists.
    /// With `rearm` the row is also put back to not-notified.
    async fn update_target(
        &self,
        owner: &str,
        symbol: &str,
        direction: Direction,
        target_price: f64,
        rearm: bool,
    ) -> Result<Option<SubscriptionId>, StoreError>;

    /// Inserts keyed on (owner, symbol, direction). If a concurrent request
    /// created the row first, its target is overwritten and its id returned.
    async fn insert_subscription(&self, new: NewSubscription) -> Result<SubscriptionId, StoreError>;

    /// Removes every direction for owner + symbol.
    async fn delete_symbol(&self, owner: &str, symbol: &str) -> Result<u64, StoreError>;

    async fn delete_all(&self, owner: &str) -> Result<u64, StoreError>;

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<AlertSubscription>, StoreError>;

    async fn distinct_symbols(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Swaps the whole snapshot for `entries` in one step.
    async fn replace_snapshot(&self, entries: Vec<PriceSnapshotEntry>) -> Result<(), StoreError>;

    async fn snapshot(&self) -> Result<Vec<PriceSnapshotEntry>, StoreError>;

    /// Not-yet-notified subscriptions paired with their symbol's positive snapshot price.
    async fn active_with_prices(&self) -> Result<Vec<(AlertSubscription, f64)>, StoreError>;

    /// Flips `was_notified` false -> true. Returns `false` if it was already set
    /// (or the row is gone), so only one caller ever wins the transition.
    async fn mark_notified(&self, id: SubscriptionId, at: i64) -> Result<bool, StoreError>;
}
