use serde::Serialize;

use super::{AlertSubscription, Direction, SubscriptionId};

/// Emitted once when a subscription's threshold is crossed. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreachNotification {
    pub subscription_id: SubscriptionId,
    pub owner: String,
    pub notify_target: String,
    pub symbol: String,
    pub target_price: f64,
    pub current_price: f64,
    pub direction: Direction,
}

impl PriceBreachNotification {
    pub fn for_subscription(sub: &AlertSubscription, current_price: f64) -> Self {
        Self {
            subscription_id: sub.id,
            owner: sub.owner.clone(),
            notify_target: sub.notify_target.clone(),
            symbol: sub.symbol.clone(),
            target_price: sub.target_price,
            current_price,
            direction: sub.direction,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "{} has gone {} the target price of {:.2}. The current price is {:.2}.",
            self.symbol, self.direction, self.target_price, self.current_price
        )
    }
}
