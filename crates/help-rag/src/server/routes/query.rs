//! One-shot query endpoint

use axum::{body::Bytes, extract::State, Json};
use std::time::Instant;

use crate::error::ApiError;
use crate::server::state::AppState;
use crate::types::AnswerResponse;

use super::{field_text, parse_body};

/// POST /query - Answer a question against the ingested documents
pub async fn query_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnswerResponse>, ApiError> {
    let start = Instant::now();
    let body = parse_body(&body);
    let query = field_text(body.as_ref(), "query").ok_or(ApiError::MissingField("query"))?;

    tracing::info!("Query: \"{}\"", query);

    let answer = state.session().query(&query).await?;

    tracing::info!("Query completed in {}ms", start.elapsed().as_millis());

    Ok(Json(AnswerResponse::new(answer)))
}
