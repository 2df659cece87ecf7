use serde::{Deserialize, Serialize};

/// One symbol's price as returned by the quote bridge. `0.0` means unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub symbol: String,
    pub price: f64,
}

impl PriceInfo {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
        }
    }

    pub fn unresolved(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0.0)
    }

    pub fn is_valid(&self) -> bool {
        is_valid_price(self.price)
    }
}

/// A row of the full-replace price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshotEntry {
    pub symbol: String,
    pub price: f64,
    pub sampled_at: i64,
}

pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
