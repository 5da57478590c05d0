//! Contact import handlers: CSV upload preview and batch import.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use sanctum_db::PgContactStore;
use sanctum_import::{
    from_csv, from_json, CsvOptions, FieldMapping, ImportCoordinator, ImportOptions,
    ImportSummary, NameSplitConfig, RawRow,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ErrorCode, ResponseMeta};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body the import wizard posts once columns have been mapped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ImportRequest {
    /// Parsed rows, one JSON object per CSV line, keyed by header name.
    pub csv_data: Vec<serde_json::Value>,
    pub field_mapping: FieldMapping,
    #[serde(default)]
    pub name_split_config: Option<NameSplitConfig>,
    pub source: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct PreviewRequest {
    pub csv_text: String,
    #[serde(default)]
    pub delimiter: Option<String>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(in crate::api) struct ImportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct PreviewResponse {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub total_rows: usize,
    pub skipped_rows: usize,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn reject_body(req_id: &str, rejection: &JsonRejection) -> ApiError {
    tracing::debug!(request_id = %req_id, error = %rejection, "rejected import request body");
    ApiError::new(
        req_id,
        ErrorCode::BadRequest,
        format!("invalid request body: {}", rejection.body_text()),
    )
}

fn check_row_limit(req_id: &str, rows: usize, max_rows: usize) -> Result<(), ApiError> {
    if rows > max_rows {
        return Err(ApiError::new(
            req_id,
            ErrorCode::ValidationError,
            format!("import is limited to {max_rows} rows, got {rows}"),
        ));
    }
    Ok(())
}

/// `None` or empty means comma; otherwise exactly one ASCII character.
fn parse_delimiter(req_id: &str, value: Option<&str>) -> Result<u8, ApiError> {
    match value.unwrap_or_default().as_bytes() {
        [] => Ok(b','),
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ApiError::new(
            req_id,
            ErrorCode::ValidationError,
            "delimiter must be a single ASCII character",
        )),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/contacts/import/preview: parse CSV text without importing.
pub(in crate::api) async fn preview_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PreviewResponse>>, ApiError> {
    let rid = req_id.0.as_str();
    let Json(body) = body.map_err(|e| reject_body(rid, &e))?;

    let delimiter = parse_delimiter(rid, body.delimiter.as_deref())?;
    let table = from_csv(&body.csv_text, CsvOptions { delimiter })
        .map_err(|e| ApiError::new(rid, ErrorCode::BadRequest, e.to_string()))?;
    check_row_limit(rid, table.rows.len(), state.import.max_rows)?;

    Ok(Json(ApiResponse {
        data: PreviewResponse {
            total_rows: table.rows.len(),
            skipped_rows: table.skipped,
            headers: table.headers,
            rows: table.rows,
        },
        meta: ResponseMeta::new(req_id.0.clone()),
    }))
}

/// POST /api/v1/contacts/import: import a batch of mapped rows.
///
/// Per-row failures are reported in the summary; the request itself only
/// fails when the body is unusable.
pub(in crate::api) async fn import_contacts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let rid = req_id.0.as_str();
    let Json(body) = body.map_err(|e| reject_body(rid, &e))?;
    check_row_limit(rid, body.csv_data.len(), state.import.max_rows)?;

    let source = if body.source.trim().is_empty() {
        state.import.default_source.clone()
    } else {
        body.source
    };
    let options = ImportOptions {
        field_mapping: body.field_mapping,
        name_split: body.name_split_config,
        source,
        notes: body.notes,
    };
    let rows = from_json(body.csv_data);
    tracing::info!(request_id = %rid, rows = rows.len(), "contact import requested");

    let coordinator = ImportCoordinator::new(PgContactStore::new(state.pool.clone()));
    let summary = coordinator.run(&rows, &options).await;

    Ok(Json(ImportResponse {
        success: true,
        summary,
    }))
}
