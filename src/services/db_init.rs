use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use crate::error::StoreError;

use super::mongo_store::SUBSCRIPTIONS;

pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    // alert_subscriptions: one row per (owner, symbol, direction)
    {
        let col = db.collection::<mongodb::bson::Document>(SUBSCRIPTIONS);
        let model = IndexModel::builder()
            .keys(doc! { "owner": 1, "symbol": 1, "direction": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // alert_subscriptions: helpful for monitor scan (was_notified + symbol)
    {
        let col = db.collection::<mongodb::bson::Document>(SUBSCRIPTIONS);
        let model = IndexModel::builder()
            .keys(doc! { "was_notified": 1, "symbol": 1 })
            .build();

        if let Err(e) = col.create_index(model, None).await {
            tracing::warn!(error = %e, "could not create was_notified index");
        }
    }

    Ok(())
}
