use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AlertError;
use crate::models::{is_valid_price, normalize_symbol, AlertSubscription, Direction, NewSubscription, SubscriptionId};

use super::{quote_bridge::QuoteBridge, store::SubscriptionStore};

/// Whether `create_or_update` wrote a new alert or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created(SubscriptionId),
    Updated(SubscriptionId),
}

impl Upserted {
    pub fn id(self) -> SubscriptionId {
        match self {
            Upserted::Created(id) | Upserted::Updated(id) => id,
        }
    }

    pub fn was_created(self) -> bool {
        matches!(self, Upserted::Created(_))
    }
}

/// Create, edit, delete and list price alerts on behalf of users.
#[derive(Clone)]
pub struct SubscriptionManager {
    store: Arc<dyn SubscriptionStore>,
    quotes: QuoteBridge,
    lookup_deadline: Duration,
    rearm_on_update: bool,
}

impl SubscriptionManager {
    pub fn new(store: Arc<dyn SubscriptionStore>, quotes: QuoteBridge, lookup_deadline: Duration) -> Self {
        Self {
            store,
            quotes,
            lookup_deadline,
            rearm_on_update: false,
        }
    }

    /// When set, giving an existing alert a new target makes it fire again.
    pub fn with_rearm_on_update(mut self, rearm: bool) -> Self {
        self.rearm_on_update = rearm;
        self
    }

    /// Upserts the alert for (owner, symbol, direction).
    ///
    /// An existing alert only has its target replaced; a new one is created
    /// after the symbol is confirmed to have a live price.
    pub async fn create_or_update(
        &self,
        owner: &str,
        notify_target: &str,
        symbol: &str,
        target_price: f64,
        direction: Option<Direction>,
    ) -> Result<Upserted, AlertError> {
        let sym = normalize_symbol(symbol).ok_or_else(|| AlertError::InvalidSymbol(symbol.to_string()))?;
        let direction = direction.unwrap_or_default();

        if !is_valid_price(target_price) {
            return Err(AlertError::InvalidPrice);
        }

        if let Some(id) = self
            .store
            .update_target(owner, &sym, direction, target_price, self.rearm_on_update)
            .await?
        {
            tracing::info!(%owner, symbol = %sym, %direction, target_price, id = %id, "alert updated");
            return Ok(Upserted::Updated(id));
        }

        if self.quotes.fetch_one(&sym, self.lookup_deadline).await.is_none() {
            tracing::info!(%owner, symbol = %sym, "rejecting alert, no live price");
            return Err(AlertError::InvalidSymbol(sym));
        }

        let id = self
            .store
            .insert_subscription(NewSubscription {
                owner: owner.to_string(),
                notify_target: notify_target.trim().to_string(),
                symbol: sym.clone(),
                target_price,
                direction,
            })
            .await?;

        tracing::info!(%owner, symbol = %sym, %direction, target_price, id = %id, "alert created");
        Ok(Upserted::Created(id))
    }

    /// Deletes every alert the owner has on `symbol`, whatever the direction.
    pub async fn delete(&self, owner: &str, symbol: &str) -> Result<u64, AlertError> {
        let Some(sym) = normalize_symbol(symbol) else {
            return Ok(0);
        };

        let removed = self.store.delete_symbol(owner, &sym).await?;
        tracing::info!(%owner, symbol = %sym, removed, "alerts deleted");
        Ok(removed)
    }

    pub async fn delete_all(&self, owner: &str) -> Result<u64, AlertError> {
        let removed = self.store.delete_all(owner).await?;
        tracing::info!(%owner, removed, "all alerts deleted");
        Ok(removed)
    }

    /// The owner's alerts, ordered by symbol then direction.
    pub async fn list(&self, owner: &str) -> Result<Vec<AlertSubscription>, AlertError> {
        let mut items = self.store.list_for_owner(owner).await?;
        items.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.direction.cmp(&b.direction)));
        Ok(items)
    }

    pub async fn distinct_watched_symbols(&self) -> Result<BTreeSet<String>, AlertError> {
        Ok(self.store.distinct_symbols().await?)
    }
}
