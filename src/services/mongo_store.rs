use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, Bson};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReplaceOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{
    is_valid_price, AlertSubscription, Direction, NewSubscription, PriceSnapshotEntry, SubscriptionId,
};

use super::store::SubscriptionStore;

pub const SUBSCRIPTIONS: &str = "alert_subscriptions";
pub const SNAPSHOT: &str = "price_snapshot";

const SNAPSHOT_ID: &str = "latest";

/// The whole snapshot lives in one document so replacing it is a single atomic write.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotDoc {
    #[serde(rename = "_id")]
    id: String,
    entries: Vec<PriceSnapshotEntry>,
    updated_at: i64,
}

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn subscriptions(&self) -> Collection<AlertSubscription> {
        self.db.collection::<AlertSubscription>(SUBSCRIPTIONS)
    }

    fn snapshots(&self) -> Collection<SnapshotDoc> {
        self.db.collection::<SnapshotDoc>(SNAPSHOT)
    }
}

#[async_trait]
impl SubscriptionStore for MongoStore {
    async fn update_target(
        &self,
        owner: &str,
        symbol: &str,
        direction: Direction,
        target_price: f64,
        rearm: bool,
    ) -> Result<Option<SubscriptionId>, StoreError> {
        let set = if rearm {
            doc! { "target_price": target_price, "was_notified": false, "notified_at": Bson::Null }
        } else {
            doc! { "target_price": target_price }
        };

        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .subscriptions()
            .find_one_and_update(
                doc! { "owner": owner, "symbol": symbol, "direction": direction.as_str() },
                doc! { "$set": set },
                opts,
            )
            .await?;

        Ok(updated.map(|s| s.id))
    }

    async fn insert_subscription(&self, new: NewSubscription) -> Result<SubscriptionId, StoreError> {
        let now = Utc::now().timestamp();

        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let stored = self
            .subscriptions()
            .find_one_and_update(
                doc! { "owner": new.owner.as_str(), "symbol": new.symbol.as_str(), "direction": new.direction.as_str() },
                doc! {
                    "$set": { "target_price": new.target_price },
                    "$setOnInsert": {
                        "notify_target": new.notify_target.as_str(),
                        "was_notified": false,
                        "created_at": now,
                        "notified_at": Bson::Null,
                    },
                },
                opts,
            )
            .await?;

        stored
            .map(|s| s.id)
            .ok_or_else(|| StoreError::Backend("upsert returned no document".to_string()))
    }

    async fn delete_symbol(&self, owner: &str, symbol: &str) -> Result<u64, StoreError> {
        let res = self
            .subscriptions()
            .delete_many(doc! { "owner": owner, "symbol": symbol }, None)
            .await?;
        Ok(res.deleted_count)
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, StoreError> {
        let res = self
            .subscriptions()
            .delete_many(doc! { "owner": owner }, None)
            .await?;
        Ok(res.deleted_count)
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<AlertSubscription>, StoreError> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "symbol": 1, "direction": 1 })
            .build();

        let mut cursor = self
            .subscriptions()
            .find(doc! { "owner": owner }, find_opts)
            .await?;

        let mut items: Vec<AlertSubscription> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn distinct_symbols(&self) -> Result<BTreeSet<String>, StoreError> {
        let values = self
            .subscriptions()
            .distinct("symbol", doc! {}, None)
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    async fn replace_snapshot(&self, entries: Vec<PriceSnapshotEntry>) -> Result<(), StoreError> {
        let snapshot = SnapshotDoc {
            id: SNAPSHOT_ID.to_string(),
            entries: entries.into_iter().filter(|e| is_valid_price(e.price)).collect(),
            updated_at: Utc::now().timestamp(),
        };

        let opts = ReplaceOptions::builder().upsert(true).build();
        self.snapshots()
            .replace_one(doc! { "_id": SNAPSHOT_ID }, &snapshot, opts)
            .await?;

        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<PriceSnapshotEntry>, StoreError> {
        let latest = self
            .snapshots()
            .find_one(doc! { "_id": SNAPSHOT_ID }, None)
            .await?;

        Ok(latest.map(|s| s.entries).unwrap_or_default())
    }

    async fn active_with_prices(&self) -> Result<Vec<(AlertSubscription, f64)>, StoreError> {
        let prices: HashMap<String, f64> = self
            .snapshot()
            .await?
            .into_iter()
            .filter(|e| is_valid_price(e.price))
            .map(|e| (e.symbol, e.price))
            .collect();

        if prices.is_empty() {
            return Ok(Vec::new());
        }

        let symbols: Vec<&str> = prices.keys().map(String::as_str).collect();
        let mut cursor = self
            .subscriptions()
            .find(doc! { "was_notified": false, "symbol": { "$in": symbols } }, None)
            .await?;

        let mut out = Vec::new();
        while let Some(res) = cursor.next().await {
            let sub = res?;
            if let Some(price) = prices.get(&sub.symbol) {
                out.push((sub, *price));
            }
        }

        Ok(out)
    }

    async fn mark_notified(&self, id: SubscriptionId, at: i64) -> Result<bool, StoreError> {
        let res = self
            .subscriptions()
            .update_one(
                doc! { "_id": id, "was_notified": false },
                doc! { "$set": { "was_notified": true, "notified_at": at } },
                None,
            )
            .await?;

        Ok(res.modified_count > 0)
    }
}
