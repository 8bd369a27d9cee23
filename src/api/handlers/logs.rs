//! Application log exports.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::AppState;
use crate::error::Result;
use crate::models::{LogDateQuery, LogTaskCreated};
use crate::services::LogTask;

const OCTET_STREAM: &str = "application/octet-stream";

/// Download response that clients must not cache.
fn attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, OCTET_STREAM.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
            (
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate".to_string(),
            ),
            (header::PRAGMA, "no-cache".to_string()),
            (header::EXPIRES, "0".to_string()),
        ],
        bytes,
    )
        .into_response()
}

/// POST /api/logs?date=
pub async fn start_export(
    State(state): State<AppState>,
    Query(query): Query<LogDateQuery>,
) -> Result<(StatusCode, Json<LogTaskCreated>)> {
    let task_id = state.logs.start(&query.date)?;
    Ok((StatusCode::ACCEPTED, Json(LogTaskCreated { task_id })))
}

/// GET /api/logs/status/:task_id
pub async fn export_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<LogTask>> {
    state.logs.status(&task_id).map(Json)
}

/// GET /api/logs/file/:task_id
pub async fn download_export(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response> {
    let bytes = state.logs.take_file(&task_id).await?;
    Ok(attachment(&format!("log_{}.log", task_id), bytes))
}

/// GET /api/logs?date=
///
/// Waits for the export, then returns the lines as text, or as a file when
/// the client accepts `application/octet-stream`.
pub async fn view_logs(
    State(state): State<AppState>,
    Query(query): Query<LogDateQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let logs = state.logs.collect(&query.date).await?;

    let wants_file = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains(OCTET_STREAM));
    if wants_file {
        return Ok(attachment(&format!("{}.log", query.date), logs.into_bytes()));
    }

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        logs,
    )
        .into_response())
}
