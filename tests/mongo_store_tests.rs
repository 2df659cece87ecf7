use mongodb::bson::{self, oid::ObjectId, Bson};
use mongodb::Client;
use stockalerts::{
    models::{AlertSubscription, Direction, NewSubscription, PriceSnapshotEntry},
    services::{db_init, mongo_store::MongoStore, store::SubscriptionStore},
};

fn new_sub(owner: &str, symbol: &str, price: f64, direction: Direction) -> NewSubscription {
    NewSubscription {
        owner: owner.to_string(),
        notify_target: String::new(),
        symbol: symbol.to_string(),
        target_price: price,
        direction,
    }
}

#[test]
fn subscription_document_shape() {
    let sub = AlertSubscription {
        id: ObjectId::new(),
        owner: "U1".to_string(),
        notify_target: "trading".to_string(),
        symbol: "AAPL".to_string(),
        target_price: 150.0,
        direction: Direction::Below,
        was_notified: false,
        created_at: 1_700_000_000,
        notified_at: None,
    };

    let doc = bson::to_document(&sub).unwrap();

    assert!(matches!(doc.get("_id"), Some(Bson::ObjectId(id)) if *id == sub.id));
    assert_eq!(doc.get_str("direction").unwrap(), "BELOW");
    assert_eq!(doc.get_str("symbol").unwrap(), "AAPL");
    assert!(!doc.get_bool("was_notified").unwrap());
    assert_eq!(doc.get("notified_at"), Some(&Bson::Null));
}

#[test]
fn documents_written_before_notify_target_still_load() {
    let doc = bson::doc! {
        "_id": ObjectId::new(),
        "owner": "U1",
        "symbol": "MSFT",
        "target_price": 400.0,
        "direction": "ABOVE",
        "was_notified": true,
        "created_at": 1_700_000_000_i64,
    };

    let sub: AlertSubscription = bson::from_document(doc).unwrap();

    assert_eq!(sub.notify_target, "");
    assert_eq!(sub.direction, Direction::Above);
    assert_eq!(sub.notified_at, None);
}

// Needs a reachable server: MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored
#[tokio::test]
#[ignore]
async fn mongo_store_round_trip() {
    let Ok(uri) = std::env::var("MONGODB_URI") else {
        eprintln!("MONGODB_URI not set, skipping");
        return;
    };

    let client = Client::with_uri_str(&uri).await.unwrap();
    let db = client.database(&format!("stockalerts_test_{}", ObjectId::new().to_hex()));
    db_init::ensure_indexes(&db).await.unwrap();
    let store = MongoStore::new(db.clone());

    // upsert on the triple
    let first = store.insert_subscription(new_sub("U1", "AAPL", 150.0, Direction::Above)).await.unwrap();
    let again = store.insert_subscription(new_sub("U1", "AAPL", 155.0, Direction::Above)).await.unwrap();
    let below = store.insert_subscription(new_sub("U1", "AAPL", 140.0, Direction::Below)).await.unwrap();
    assert_eq!(first, again);
    assert_ne!(first, below);

    let listed = store.list_for_owner("U1").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].direction, Direction::Above);
    assert_eq!(listed[0].target_price, 155.0);

    assert_eq!(
        store.update_target("U1", "AAPL", Direction::Above, 160.0, false).await.unwrap(),
        Some(first)
    );
    assert_eq!(store.update_target("U1", "TSLA", Direction::Above, 1.0, false).await.unwrap(), None);

    // whole-snapshot swap
    store
        .replace_snapshot(vec![
            PriceSnapshotEntry { symbol: "AAPL".to_string(), price: 161.0, sampled_at: 1 },
            PriceSnapshotEntry { symbol: "MSFT".to_string(), price: 0.0, sampled_at: 1 },
        ])
        .await
        .unwrap();
    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].symbol, "AAPL");

    assert_eq!(store.active_with_prices().await.unwrap().len(), 2);

    // conditional claim
    assert!(store.mark_notified(first, 10).await.unwrap());
    assert!(!store.mark_notified(first, 11).await.unwrap());
    assert_eq!(store.active_with_prices().await.unwrap().len(), 1);

    assert_eq!(store.delete_symbol("U1", "AAPL").await.unwrap(), 2);
    assert!(store.distinct_symbols().await.unwrap().is_empty());

    db.drop(None).await.unwrap();
}
