//! Telegram webhook handler
//!
//! This is the single place that talks HTTP back to Telegram. Whatever
//! happens while processing an update, Telegram gets `200 {"ok": true}` so it
//! never redelivers; only a wrong secret token is refused.

pub mod process;
pub mod types;

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;

use self::process::Disposition;
use self::types::TelegramUpdate;
use crate::api::ApiState;

/// Header Telegram uses to echo the webhook secret
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook response
#[derive(Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

const fn acknowledge() -> (StatusCode, Json<WebhookResponse>) {
    (StatusCode::OK, Json(WebhookResponse { ok: true }))
}

/// Handle incoming Telegram update
///
/// Returns 200 immediately and processes the message in a background task.
/// Telegram requires fast webhook responses to avoid retries.
pub async fn handle_update(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            tracing::warn!("Telegram webhook secret mismatch");
            return (StatusCode::FORBIDDEN, Json(WebhookResponse { ok: false }));
        }
    }

    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable Telegram update, acknowledging");
            return acknowledge();
        }
    };

    let update_id = update.update_id;
    tracing::debug!(update_id, "received Telegram update");

    if state.is_duplicate_update(update_id) {
        tracing::debug!(update_id, "duplicate Telegram update, skipping");
        return acknowledge();
    }

    tokio::spawn(async move {
        match process::process_update(&state, update).await {
            Ok(Disposition::Ignored(reason)) => {
                tracing::debug!(update_id, ?reason, "Telegram update ignored");
            }
            Ok(disposition) => {
                tracing::debug!(update_id, ?disposition, "Telegram update handled");
            }
            Err(e) => {
                tracing::error!(update_id, error = %e, "Telegram message processing failed");
            }
        }
    });

    acknowledge()
}
