use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use mongodb::Client;

use stockalerts::{
    config::{self, StoreBackend},
    routes,
    services::{
        alert_monitor, breach_detector::BreachDetector, db_init, memory_store::MemoryStore,
        mongo_store::MongoStore, notifier, quote_source, store::SubscriptionStore,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = config::load().context("invalid configuration")?;

    let store: Arc<dyn SubscriptionStore> = match settings.store_backend {
        StoreBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri)
                .await
                .context("failed to connect to MongoDB")?;
            let db = client.database(&settings.mongodb_db);

            // The service still starts without indexes; the store reports errors per call.
            if let Err(e) = db_init::ensure_indexes(&db).await {
                tracing::warn!(error = %e, "could not ensure indexes");
            }

            Arc::new(MongoStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store, alerts are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let source = quote_source::create_quote_source(&settings.quote_provider, settings.quote_api_key.clone())
        .context("cannot create quote provider")?;
    if settings.quote_api_key.trim().is_empty() {
        tracing::warn!(provider = source.name(), "quote api key is empty, every lookup will fail");
    }

    if settings.slack_signing_secret.is_none() {
        tracing::warn!("SLACK_SIGNING_SECRET is not set, slash commands are not verified");
    }

    let state = AppState::new(settings.clone(), store.clone(), source);

    let detector = Arc::new(BreachDetector::new(
        store,
        state.quotes.clone(),
        notifier::from_settings(&settings),
        settings.fetch_deadline,
    ));
    alert_monitor::spawn_price_alert_monitor(detector, settings.quote_check_interval);

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("HOST '{}' is not an ip address", settings.host))?;
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!(
        provider = %settings.quote_provider,
        interval_secs = settings.quote_check_interval.as_secs(),
        "listening on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
