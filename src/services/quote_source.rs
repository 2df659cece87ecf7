use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::error::ConfigError;

use super::{alphavantage::AlphaVantageClient, finnhub::FinnhubClient, quandl::QuandlClient};

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("{provider} api key is missing")]
    MissingApiKey { provider: &'static str },

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} quote failed: {status} {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode quote for {symbol}: {reason}")]
    Decode { symbol: String, reason: String },
}

/// A vendor that can price a single ticker.
///
/// Implementations return whatever the vendor reports; callers treat a
/// non-positive price as "no quote".
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError>;
}

/// Builds the provider named in configuration.
pub fn create_quote_source(provider: &str, api_key: String) -> Result<Arc<dyn QuoteSource>, ConfigError> {
    match provider.trim().to_lowercase().as_str() {
        "finnhub" => Ok(Arc::new(FinnhubClient::new(api_key))),
        "alphavantage" => Ok(Arc::new(AlphaVantageClient::new(api_key))),
        "quandl" => Ok(Arc::new(QuandlClient::new(api_key))),
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

// Upper bound for one vendor request, independent of the batch deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not build http client with timeout, using defaults");
            Client::new()
        })
}
