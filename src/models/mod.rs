pub mod subscription;
pub mod price;
pub mod notification;

pub use subscription::{normalize_symbol, AlertSubscription, Direction, NewSubscription, SubscriptionId};
pub use price::{is_valid_price, PriceInfo, PriceSnapshotEntry};
pub use notification::PriceBreachNotification;
