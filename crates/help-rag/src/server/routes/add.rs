//! Document ingestion endpoint

use axum::{body::Bytes, extract::State, Json};

use crate::error::ApiError;
use crate::server::state::AppState;
use crate::types::{AddResponse, DataType};

use super::{field_text, parse_body};

/// POST /add - Ingest a PDF by filesystem path
///
/// Body: `{"data": {"file_path": "<path>"}}`. A missing `data` object or a
/// missing `file_path` inside it are both reported as missing data.
pub async fn add_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AddResponse>, ApiError> {
    let body = parse_body(&body);
    let data = body.as_ref().and_then(|b| b.get("data"));
    let file_path = field_text(data, "file_path").ok_or(ApiError::MissingField("data"))?;

    tracing::info!("Adding {} as {}", file_path, DataType::PdfFile);

    state.session().add(&file_path, DataType::PdfFile).await?;

    Ok(Json(AddResponse::added()))
}
