//! Slack request signing.
//!
//! Slack signs every slash-command post with HMAC-SHA256 over
//! `v0:{X-Slack-Request-Timestamp}:{raw body}` using the app's signing secret
//! and sends the result as `X-Slack-Signature: v0=<hex>`.

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use thiserror::Error;

use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or further in the future) than this are replays.
pub const MAX_AGE_SECS: i64 = 60 * 5;

// Slash-command bodies are small; anything bigger is not from Slack.
const MAX_BODY_BYTES: usize = 64 * 1024;

const VERSION: &str = "v0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing signature headers")]
    Missing,

    #[error("malformed request timestamp")]
    BadTimestamp,

    #[error("request timestamp outside the allowed window")]
    Stale,

    #[error("signature mismatch")]
    Mismatch,
}

fn mac_for(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// The `X-Slack-Signature` value Slack would send for this body.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    match mac_for(secret, timestamp, body) {
        Ok(mac) => format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes())),
        Err(_) => String::new(),
    }
}

pub fn verify(
    secret: &str,
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let sent_at: i64 = timestamp.trim().parse().map_err(|_| SignatureError::BadTimestamp)?;
    if (now - sent_at).abs() > MAX_AGE_SECS {
        return Err(SignatureError::Stale);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|h| hex::decode(h).ok())
        .ok_or(SignatureError::Mismatch)?;

    mac_for(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

fn unauthorized() -> Response {
    let body = json!({ "response_type": "ephemeral", "text": "Unauthorized" });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Rejects slash-command posts whose signature does not check out.
/// Without a configured secret every request passes.
pub async fn require_slack_signature(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(secret) = state.settings.slack_signing_secret.as_deref() else {
        return next.run(req).await;
    };

    let (parts, body) = req.into_parts();

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "could not read slash command body");
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };

    let checked = match (header(&parts.headers, TIMESTAMP_HEADER), header(&parts.headers, SIGNATURE_HEADER)) {
        (Some(ts), Some(sig)) => verify(secret, ts, sig, &bytes, Utc::now().timestamp()),
        _ => Err(SignatureError::Missing),
    };

    if let Err(e) = checked {
        tracing::warn!(uri = %parts.uri, error = %e, "rejecting unsigned slash command");
        return unauthorized();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
