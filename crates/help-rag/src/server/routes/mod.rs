//! Gateway routes

pub mod add;
pub mod chat;
pub mod query;

use axum::{routing::post, Router};
use serde_json::Value;

use crate::server::state::AppState;

/// Build the gateway routes
pub fn gateway_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add::add_data))
        .route("/query", post(query::query_data))
        .route("/chat", post(chat::chat))
}

/// Parse a request body leniently: empty or malformed bodies become `None`
pub(crate) fn parse_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Ignoring unparsable request body: {}", e);
            None
        }
    }
}

/// Read a field as text.
///
/// Only an absent key yields `None`. Strings are returned unmodified and any
/// other JSON value, `null` included, is returned as its compact JSON text.
pub(crate) fn field_text(value: Option<&Value>, key: &str) -> Option<String> {
    match value?.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
