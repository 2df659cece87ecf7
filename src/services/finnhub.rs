use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::quote_source::{http_client, QuoteError, QuoteSource};

const PROVIDER: &str = "finnhub";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://finnhub.io/api/v1")
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            api_key,
            base_url: base_url.into(),
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteResponse, QuoteError> {
        if !self.has_key() {
            return Err(QuoteError::MissingApiKey { provider: PROVIDER });
        }

        let url = format!("{}/quote", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status { provider: PROVIDER, status, body });
        }

        res.json::<QuoteResponse>().await.map_err(|e| QuoteError::Decode {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    // Finnhub answers unknown tickers with an all-zero quote rather than an error.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        Ok(self.quote(symbol).await?.c)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteResponse {
    // current
    pub c: f64,
    // change
    #[serde(default)]
    pub d: Option<f64>,
    // percent change
    #[serde(default)]
    pub dp: Option<f64>,
    // high
    #[serde(default)]
    pub h: f64,
    // low
    #[serde(default)]
    pub l: f64,
    // open
    #[serde(default)]
    pub o: f64,
    // previous close
    #[serde(default)]
    pub pc: f64,
    // timestamp
    #[serde(default)]
    pub t: i64,
}
