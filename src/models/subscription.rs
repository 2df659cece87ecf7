use std::fmt;
use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub type SubscriptionId = ObjectId;

/// Which side of the target price fires the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Above,
    Below,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Above => "ABOVE",
            Direction::Below => "BELOW",
        }
    }

    /// ABOVE fires at or over the target, BELOW at or under it.
    pub fn is_breached(self, target_price: f64, current_price: f64) -> bool {
        match self {
            Direction::Above => current_price >= target_price,
            Direction::Below => current_price <= target_price,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("above") {
            Ok(Direction::Above)
        } else if s.eq_ignore_ascii_case("below") {
            Ok(Direction::Below)
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSubscription {
    #[serde(rename = "_id")]
    pub id: SubscriptionId,

    pub owner: String,

    // empty => deliver straight to the owner
    #[serde(default)]
    pub notify_target: String,

    pub symbol: String,
    pub target_price: f64,
    pub direction: Direction,

    pub was_notified: bool,

    pub created_at: i64,
    #[serde(default)]
    pub notified_at: Option<i64>,
}

/// Everything the store needs to insert a subscription; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub owner: String,
    pub notify_target: String,
    pub symbol: String,
    pub target_price: f64,
    pub direction: Direction,
}

/// Uppercases and trims a ticker. Returns `None` for blank input.
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let sym = symbol.trim().to_uppercase();
    if sym.is_empty() { None } else { Some(sym) }
}
