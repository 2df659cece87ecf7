use mongodb::bson::oid::ObjectId;
use stockalerts::{
    config::{parse_store_backend, StoreBackend},
    middleware::slack_signature::{self, SignatureError},
    error::ConfigError,
    models::{Direction, PriceBreachNotification},
    services::{
        finnhub::FinnhubClient,
        quandl::{QuandlClient, QuandlResponse},
        notifier::{webhook_payload, LogNotifier, Notifier, NotifyError, SlackWebhookNotifier},
        quote_source::{create_quote_source, QuoteError, QuoteSource},
    },
};

fn breach(notify_target: &str) -> PriceBreachNotification {
    PriceBreachNotification {
        subscription_id: ObjectId::new(),
        owner: "U1".to_string(),
        notify_target: notify_target.to_string(),
        symbol: "AAPL".to_string(),
        target_price: 150.0,
        current_price: 151.2,
        direction: Direction::Above,
    }
}

#[test]
fn providers_are_picked_by_name() {
    let finnhub = create_quote_source("finnhub", "k".to_string()).ok().map(|s| s.name());
    assert_eq!(finnhub, Some("finnhub"));

    let alpha = create_quote_source(" AlphaVantage ", "k".to_string()).ok().map(|s| s.name());
    assert_eq!(alpha, Some("alphavantage"));

    let quandl = create_quote_source("Quandl", "k".to_string()).ok().map(|s| s.name());
    assert_eq!(quandl, Some("quandl"));

    match create_quote_source("yahoo", "k".to_string()) {
        Err(ConfigError::UnknownProvider(name)) => assert_eq!(name, "yahoo"),
        _ => panic!("yahoo should be rejected"),
    }
}

#[tokio::test]
async fn missing_api_key_fails_without_a_request() {
    let client = FinnhubClient::new(String::new());

    let err = client.fetch_price("AAPL").await.unwrap_err();

    assert!(matches!(err, QuoteError::MissingApiKey { provider: "finnhub" }));
}

#[test]
fn store_backend_names() {
    assert_eq!(parse_store_backend("MongoDB").unwrap(), StoreBackend::Mongo);
    assert_eq!(parse_store_backend("memory").unwrap(), StoreBackend::Memory);
    assert!(matches!(parse_store_backend("redis"), Err(ConfigError::UnknownStore(_))));
}

#[test]
fn breach_is_inclusive_at_the_target() {
    assert!(Direction::Above.is_breached(150.0, 150.0));
    assert!(!Direction::Above.is_breached(150.0, 149.99));
    assert!(Direction::Below.is_breached(150.0, 150.0));
    assert!(!Direction::Below.is_breached(150.0, 150.01));
    assert_eq!("below".parse::<Direction>(), Ok(Direction::Below));
}

#[test]
fn message_names_symbol_direction_and_prices() {
    assert_eq!(
        breach("").message(),
        "AAPL has gone ABOVE the target price of 150.00. The current price is 151.20."
    );
}

#[test]
fn payload_goes_to_the_owner_without_a_channel() {
    let payload = webhook_payload(&breach(""));

    assert_eq!(payload["channel"], "@U1");
    assert_eq!(payload["attachments"][0]["color"], "good");
    assert!(payload["text"].as_str().unwrap().starts_with("AAPL has gone ABOVE"));
}

#[test]
fn payload_goes_to_the_named_channel() {
    assert_eq!(webhook_payload(&breach("trading"))["channel"], "#trading");
    assert_eq!(webhook_payload(&breach("#trading"))["channel"], "#trading");
}

#[tokio::test]
async fn webhook_notifier_needs_the_matching_hook() {
    let channel_only = SlackWebhookNotifier::new(Some("http://127.0.0.1:9/hook".to_string()), None);

    let err = channel_only.notify(&breach("")).await.unwrap_err();

    assert!(matches!(err, NotifyError::NoWebhook("direct messages")));
}

#[tokio::test]
async fn log_notifier_always_succeeds() {
    assert!(LogNotifier.notify(&breach("trading")).await.is_ok());
}

#[test]
fn quandl_close_is_the_fifth_column() {
    let body = r#"{
        "dataset": {
            "dataset_code": "MSFT",
            "database_code": "WIKI",
            "column_names": ["Date", "Open", "High", "Low", "Close", "Volume"],
            "start_date": "2017-06-20",
            "end_date": "2017-06-20",
            "data": [["2017-06-20", 70.82, 70.87, 69.87, 69.91, 20775590.0]]
        }
    }"#;

    let parsed: QuandlResponse = serde_json::from_str(body).unwrap();

    assert_eq!(parsed.dataset.dataset_code, "MSFT");
    assert_eq!(parsed.dataset.close_price(), Some(69.91));
}

#[test]
fn quandl_without_rows_has_no_price() {
    let parsed: QuandlResponse = serde_json::from_str(r#"{"dataset": {"data": []}}"#).unwrap();

    assert_eq!(parsed.dataset.close_price(), None);
}

#[tokio::test]
async fn quandl_needs_an_api_key() {
    let err = QuandlClient::new(" ".to_string()).fetch_price("MSFT").await.unwrap_err();

    assert!(matches!(err, QuoteError::MissingApiKey { provider: "quandl" }));
}

#[test]
fn signature_checks() {
    let secret = "shh";
    let body = b"user_id=U1&text=AAPL+150";
    let now = 1_700_000_000;
    let ts = now.to_string();
    let sig = slack_signature::sign(secret, &ts, body);

    assert!(sig.starts_with("v0="));
    assert_eq!(slack_signature::verify(secret, &ts, &sig, body, now), Ok(()));
    assert_eq!(slack_signature::verify(secret, &ts, &sig, body, now + 30), Ok(()));
    assert_eq!(
        slack_signature::verify(secret, &ts, &sig, body, now + slack_signature::MAX_AGE_SECS + 1),
        Err(SignatureError::Stale)
    );
    assert_eq!(
        slack_signature::verify(secret, &ts, &sig, b"user_id=U1&text=AAPL+1", now),
        Err(SignatureError::Mismatch)
    );
    assert_eq!(
        slack_signature::verify(secret, &ts, "v0=zz", body, now),
        Err(SignatureError::Mismatch)
    );
    assert_eq!(
        slack_signature::verify(secret, "yesterday", &sig, body, now),
        Err(SignatureError::BadTimestamp)
    );
}
