use std::env;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub quote_provider: String,
    pub quote_api_key: String,
    pub quote_check_interval: Duration,
    pub fetch_deadline: Duration,
    pub lookup_deadline: Duration,

    // reset was_notified when an existing alert gets a new target
    pub rearm_on_update: bool,

    // HMAC key for X-Slack-Signature; unset disables the check
    pub slack_signing_secret: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub slack_dm_webhook_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store_backend: StoreBackend::Mongo,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "stockalerts".to_string(),
            quote_provider: "finnhub".to_string(),
            quote_api_key: String::new(),
            quote_check_interval: Duration::from_secs(300),
            fetch_deadline: Duration::from_secs(10),
            lookup_deadline: Duration::from_secs(3),
            rearm_on_update: false,
            slack_signing_secret: None,
            slack_webhook_url: None,
            slack_dm_webhook_url: None,
        }
    }
}

pub fn load() -> Result<Settings, ConfigError> {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let host = env::var("HOST").unwrap_or(defaults.host);

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let store_backend = match env::var("STORE_BACKEND") {
        Ok(v) => parse_store_backend(&v)?,
        Err(_) => defaults.store_backend,
    };

    let mongodb_uri = env::var("MONGODB_URI").unwrap_or(defaults.mongodb_uri);
    let mongodb_db = env::var("MONGODB_DB").unwrap_or(defaults.mongodb_db);

    let quote_provider = env::var("QUOTE_PROVIDER")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or(defaults.quote_provider);

    // QUOTE_API_KEY wins, otherwise FINNHUB_API_KEY / ALPHAVANTAGE_API_KEY etc.
    let quote_api_key = env::var("QUOTE_API_KEY")
        .or_else(|_| env::var(format!("{}_API_KEY", quote_provider.to_uppercase())))
        .unwrap_or_default();

    let quote_check_interval = secs_var("QUOTE_CHECK_INTERVAL_SECS", defaults.quote_check_interval)?;
    let fetch_deadline = secs_var("QUOTE_FETCH_DEADLINE_SECS", defaults.fetch_deadline)?;
    let lookup_deadline = secs_var("QUOTE_LOOKUP_DEADLINE_SECS", defaults.lookup_deadline)?;

    let rearm_on_update = env::var("REARM_ON_UPDATE")
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(defaults.rearm_on_update);

    Ok(Settings {
        host,
        port,
        store_backend,
        mongodb_uri,
        mongodb_db,
        quote_provider,
        quote_api_key,
        quote_check_interval,
        fetch_deadline,
        lookup_deadline,
        rearm_on_update,
        slack_signing_secret: non_empty_var("SLACK_SIGNING_SECRET"),
        slack_webhook_url: non_empty_var("SLACK_WEBHOOK_URL"),
        slack_dm_webhook_url: non_empty_var("SLACK_DM_WEBHOOK_URL"),
    })
}

pub fn parse_store_backend(value: &str) -> Result<StoreBackend, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "mongodb" | "mongo" => Ok(StoreBackend::Mongo),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(ConfigError::UnknownStore(other.to_string())),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Unparseable values fall back to the default; an explicit zero is a mistake.
fn secs_var(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let Some(secs) = env::var(name).ok().and_then(|s| s.trim().parse::<u64>().ok()) else {
        return Ok(default);
    };

    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "must be at least 1 second".to_string(),
        });
    }

    Ok(Duration::from_secs(secs))
}
