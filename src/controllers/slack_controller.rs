use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AlertError,
    models::AlertSubscription,
    services::command::{self, AlertCommand},
    AppState,
};

/// The fields Slack posts for a slash command that we care about.
#[derive(Debug, Default, Deserialize)]
pub struct SlashCommandForm {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: String,
}

fn ephemeral(status: StatusCode, text: impl Into<String>) -> Response {
    let body = json!({ "response_type": "ephemeral", "text": text.into() });
    (status, Json(body)).into_response()
}

fn alert_error_response(err: AlertError) -> Response {
    match err {
        AlertError::StoreUnavailable(e) => {
            tracing::error!(error = %e, "alert store failure");
            ephemeral(StatusCode::SERVICE_UNAVAILABLE, "Alerts are unavailable right now.")
        }
        other => ephemeral(StatusCode::OK, other.to_string()),
    }
}

pub fn render_alert_list(alerts: &[AlertSubscription]) -> String {
    if alerts.is_empty() {
        return "You have no alerts.".to_string();
    }

    alerts
        .iter()
        .map(|a| format!("{}\t{:.2} ({})", a.symbol, a.target_price, a.direction))
        .collect::<Vec<_>>()
        .join("\n")
}

// POST /quote-alert
pub async fn post_quote_alert(
    State(state): State<AppState>,
    Form(form): Form<SlashCommandForm>,
) -> Response {
    tracing::info!(user = %form.user_id, command = %form.command, text = %form.text, "quote-alert command");

    let cmd = match command::parse(&form.text) {
        Ok(c) => c,
        Err(e) => return ephemeral(StatusCode::OK, e.to_string()),
    };

    let owner = form.user_id.as_str();
    let subs = &state.subscriptions;

    let result = match cmd {
        AlertCommand::List => subs.list(owner).await.map(|items| render_alert_list(&items)),
        AlertCommand::Upsert {
            symbol,
            price,
            direction,
            notify_target,
        } => subs
            .create_or_update(owner, &notify_target, &symbol, price, direction)
            .await
            .map(|res| {
                let verb = if res.was_created() { "created" } else { "updated" };
                format!("Alert {} {verb} for user {}", res.id().to_hex(), form.user_name)
            }),
        AlertCommand::Delete { symbol } => subs.delete(owner, &symbol).await.map(|n| {
            format!("{n} alert(s) for {} deleted for user {}", symbol.to_uppercase(), form.user_name)
        }),
        AlertCommand::DeleteAll => subs
            .delete_all(owner)
            .await
            .map(|_| format!("All alerts deleted for user {}", form.user_name)),
    };

    match result {
        Ok(text) => ephemeral(StatusCode::OK, text),
        Err(e) => alert_error_response(e),
    }
}

// POST /quote
pub async fn post_quote(
    State(state): State<AppState>,
    Form(form): Form<SlashCommandForm>,
) -> Response {
    let symbols: Vec<&str> = form
        .text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return ephemeral(StatusCode::OK, "Usage: /quote AAPL,MSFT");
    }

    let batch = state.quotes.fetch(&symbols, state.settings.lookup_deadline).await;
    if !batch.has_prices() {
        return ephemeral(StatusCode::OK, "Quotes are unavailable right now.");
    }

    let mut lines: Vec<String> = batch
        .resolved()
        .map(|p| format!("{}: {:.2}", p.symbol, p.price))
        .collect();
    lines.extend(batch.unresolved().into_iter().map(|s| format!("{s}: unavailable")));

    ephemeral(StatusCode::OK, lines.join("\n"))
}
