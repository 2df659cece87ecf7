pub mod quote_source;
pub mod finnhub;
pub mod alphavantage;
pub mod quandl;
pub mod quote_bridge;

pub mod store;
pub mod memory_store;
pub mod mongo_store;
pub mod db_init;

pub mod alerts_service;
pub mod breach_detector;
pub mod alert_monitor;
pub mod notifier;
pub mod command;
