//! Multi-turn chat endpoint

use axum::{body::Bytes, extract::State, Json};
use std::time::Instant;

use crate::error::ApiError;
use crate::server::state::AppState;
use crate::types::AnswerResponse;

use super::{field_text, parse_body};

/// Session identifier every chat request is filed under
pub const CHAT_SESSION_ID: &str = "developer";

/// POST /chat - Continue the shared conversation
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnswerResponse>, ApiError> {
    let start = Instant::now();
    let body = parse_body(&body);
    let message = field_text(body.as_ref(), "chat").ok_or(ApiError::MissingField("chat"))?;

    tracing::info!("Chat ({}): \"{}\"", CHAT_SESSION_ID, message);

    let reply = state.session().chat(&message, CHAT_SESSION_ID).await?;

    tracing::info!("Chat completed in {}ms", start.elapsed().as_millis());

    Ok(Json(AnswerResponse::new(reply)))
}
