use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::{config::Settings, models::PriceBreachNotification};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no webhook configured for {0}")]
    NoWebhook(&'static str),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected message: {status} {body}")]
    Status { status: reqwest::StatusCode, body: String },
}

/// Where breach notifications go. One call per breach; failures are not retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &PriceBreachNotification) -> Result<(), NotifyError>;
}

/// Posts to Slack incoming webhooks: the channel hook when the alert names a
/// channel, the direct-message hook otherwise.
#[derive(Clone)]
pub struct SlackWebhookNotifier {
    http: Client,
    channel_webhook: Option<String>,
    dm_webhook: Option<String>,
}

impl SlackWebhookNotifier {
    pub fn new(channel_webhook: Option<String>, dm_webhook: Option<String>) -> Self {
        Self {
            http: Client::new(),
            channel_webhook,
            dm_webhook,
        }
    }

    fn webhook_for(&self, notification: &PriceBreachNotification) -> Result<&str, NotifyError> {
        if notification.notify_target.trim().is_empty() {
            self.dm_webhook.as_deref().ok_or(NotifyError::NoWebhook("direct messages"))
        } else {
            self.channel_webhook.as_deref().ok_or(NotifyError::NoWebhook("channels"))
        }
    }
}

pub fn webhook_payload(notification: &PriceBreachNotification) -> serde_json::Value {
    let text = notification.message();
    let channel = if notification.notify_target.trim().is_empty() {
        format!("@{}", notification.owner)
    } else {
        format!("#{}", notification.notify_target.trim_start_matches('#'))
    };

    json!({
        "channel": channel,
        "username": notification.owner,
        "text": text,
        "attachments": [{
            "color": "good",
            "fallback": text,
            "text": text,
            "ts": Utc::now().timestamp(),
        }],
    })
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    async fn notify(&self, notification: &PriceBreachNotification) -> Result<(), NotifyError> {
        let url = self.webhook_for(notification)?;

        let res = self
            .http
            .post(url)
            .json(&webhook_payload(notification))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        Ok(())
    }
}

/// Writes notifications to the log. Used when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &PriceBreachNotification) -> Result<(), NotifyError> {
        tracing::info!(
            owner = %notification.owner,
            target = %notification.notify_target,
            "{}",
            notification.message()
        );
        Ok(())
    }
}

pub fn from_settings(settings: &Settings) -> Arc<dyn Notifier> {
    if settings.slack_webhook_url.is_none() && settings.slack_dm_webhook_url.is_none() {
        tracing::warn!("no slack webhooks configured, breach notifications go to the log");
        return Arc::new(LogNotifier);
    }

    Arc::new(SlackWebhookNotifier::new(
        settings.slack_webhook_url.clone(),
        settings.slack_dm_webhook_url.clone(),
    ))
}
