// ============================================================================
// GPD Ingestion Routes
// ============================================================================
//
// Endpoints:
// - POST /send/gpd/message?validate=bool - Publish one RTP message
// - POST /send/gpd/file?bulk=bool&rate=N - Publish an NDJSON upload
//
// ============================================================================

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::{MAX_RATE_LIMIT, MIN_RATE_LIMIT};
use crate::context::AppContext;
use crate::error::{AppError, AppResult, IngestError};
use crate::ingestion::{BulkResult, SendStatus};
use crate::utils::{ndjson_lines, strip_line_breaks};

/// Multipart field carrying the NDJSON document
const FILE_FIELD: &str = "file";

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SendMessageParams {
    #[serde(default = "default_true")]
    pub validate: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendFileParams {
    #[serde(default)]
    pub bulk: bool,
    pub rate: Option<u32>,
}

/// POST /send/gpd/message
pub async fn send_message(
    State(ctx): State<Arc<AppContext>>,
    params: Result<Query<SendMessageParams>, QueryRejection>,
    body: Bytes,
) -> AppResult<Json<SendStatus>> {
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;

    let payload: Value = serde_json::from_slice(&body).map_err(IngestError::from)?;
    if !payload.is_object() {
        return Err(IngestError::Parse("expected a JSON object".to_string()).into());
    }

    if !ctx.ingestion.is_ready().await {
        return Err(AppError::not_ready());
    }

    let status = ctx.ingestion.submit(&payload, params.validate).await?;
    Ok(Json(status))
}

/// POST /send/gpd/file
///
/// Every line is processed before the response is written, so large uploads
/// hold the connection for roughly `lines / rate` seconds.
pub async fn send_file(
    State(ctx): State<Arc<AppContext>>,
    params: Result<Query<SendFileParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<BulkResult>> {
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;

    let rate = params.rate.unwrap_or(ctx.config.default_rate_limit);
    if !(MIN_RATE_LIMIT..=MAX_RATE_LIMIT).contains(&rate) {
        return Err(AppError::validation(format!(
            "rate must be between {} and {}, got {}",
            MIN_RATE_LIMIT, MAX_RATE_LIMIT, rate
        )));
    }

    let mut multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let filename = field.file_name().map(strip_line_breaks);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            upload = Some((filename, data));
        }
    }
    let (filename, data) =
        upload.ok_or_else(|| AppError::validation("file: field required"))?;

    if !ctx.ingestion.is_ready().await {
        return Err(AppError::not_ready());
    }

    info!(
        filename = filename.as_deref().unwrap_or("-"),
        size_bytes = data.len(),
        rate = rate,
        bulk = params.bulk,
        "Received file upload"
    );

    let result = ctx
        .ingestion
        .submit_file(ndjson_lines(&data), rate, params.bulk)
        .await;
    Ok(Json(result))
}
