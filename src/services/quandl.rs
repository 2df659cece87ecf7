use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::quote_source::{http_client, QuoteError, QuoteSource};

const PROVIDER: &str = "quandl";

// Position of "Close" in the WIKI dataset rows.
const CLOSE_COLUMN: usize = 4;

/// End-of-day prices from the Quandl WIKI dataset.
#[derive(Clone)]
pub struct QuandlClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl QuandlClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://www.quandl.com/api/v3")
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            api_key,
            base_url: base_url.into(),
        }
    }

    pub async fn dataset(&self, symbol: &str, day: NaiveDate) -> Result<QuandlDataset, QuoteError> {
        if self.api_key.trim().is_empty() {
            return Err(QuoteError::MissingApiKey { provider: PROVIDER });
        }

        let start = day.to_string();
        let end = day.succ_opt().unwrap_or(day).to_string();

        let url = format!("{}/datasets/WIKI/{}.json", self.base_url, symbol);
        let res = self
            .http
            .get(url)
            .query(&[
                ("start_date", start.as_str()),
                ("end_date", end.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status { provider: PROVIDER, status, body });
        }

        let payload = res.json::<QuandlResponse>().await.map_err(|e| QuoteError::Decode {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        Ok(payload.dataset)
    }
}

#[async_trait]
impl QuoteSource for QuandlClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let dataset = self.dataset(symbol, Utc::now().date_naive()).await?;
        Ok(dataset.close_price().unwrap_or(0.0))
    }
}

#[derive(Debug, Deserialize)]
pub struct QuandlResponse {
    pub dataset: QuandlDataset,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuandlDataset {
    #[serde(default)]
    pub dataset_code: String,

    #[serde(default)]
    pub column_names: Vec<String>,

    // Rows are mixed: a date string followed by numbers.
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl QuandlDataset {
    /// Close of the first row. `None` when the range had no trading day.
    pub fn close_price(&self) -> Option<f64> {
        self.data.first()?.get(CLOSE_COLUMN)?.as_f64()
    }
}
