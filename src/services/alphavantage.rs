use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::quote_source::{http_client, QuoteError, QuoteSource};

const PROVIDER: &str = "alphavantage";

#[derive(Clone)]
pub struct AlphaVantageClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://www.alphavantage.co")
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            api_key,
            base_url: base_url.into(),
        }
    }

    pub async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote, QuoteError> {
        if self.api_key.trim().is_empty() {
            return Err(QuoteError::MissingApiKey { provider: PROVIDER });
        }

        let url = format!("{}/query", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status { provider: PROVIDER, status, body });
        }

        let payload = res.json::<GlobalQuoteResponse>().await.map_err(|e| QuoteError::Decode {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        Ok(payload.global_quote)
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let quote = self.global_quote(symbol).await?;

        // Unknown symbols come back as an empty "Global Quote" object.
        let Some(price) = quote.price else {
            return Ok(0.0);
        };

        price.trim().parse::<f64>().map_err(|e| QuoteError::Decode {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    global_quote: GlobalQuote,
}

// Alpha Vantage sends every field as a string.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,

    #[serde(rename = "05. price")]
    pub price: Option<String>,

    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,

    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
}
