//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SheetIoError;
use crate::excel::{legacy_csv, Download, ExportOutcome, ExportTarget, SheetExporter, SheetImporter};
use crate::rules::HeaderRule;
use crate::types::{
    ExportFormat, ExportOptions, HeaderSpec, ImportOptions, ImportedRow, Row, UnmappedCode,
};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Map a library error onto an error envelope
fn error_response(e: SheetIoError) -> Response {
    let status = match &e {
        SheetIoError::Io(_) | SheetIoError::Export(_) | SheetIoError::Import(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    tracing::warn!(%status, error = %e, "request failed");
    (status, Json(ApiResponse::<()>::err(e.to_string()))).into_response()
}

/// Run encoding or workbook reading off the async workers
async fn blocking<T, F>(work: F) -> Result<T, SheetIoError>
where
    F: FnOnce() -> Result<T, SheetIoError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SheetIoError::Export(format!("Worker task failed: {}", e)))?
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Sheetio API Server".to_string(),
        version: state.version.clone(),
        description: "Spreadsheet export/import driven by header rules".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint(
                "POST",
                "/api/v1/export",
                "Export rows to xlsx/xls/csv/html (download, or saved when 'path' is set)",
            ),
            endpoint(
                "POST",
                "/api/v1/export/legacy-csv",
                "Export rows in the legacy tab-comma text layout",
            ),
            endpoint("POST", "/api/v1/import", "Import the first sheet of an xlsx/xls file"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub formats: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        formats: ExportFormat::ALL.iter().map(|f| f.to_string()).collect(),
    }))
}

/// Export request
#[derive(Deserialize)]
pub struct ExportRequest {
    /// `[label, field]` pairs
    pub headers: Vec<HeaderSpec>,
    #[serde(default)]
    pub rows: Vec<Row>,
    pub format: Option<ExportFormat>,
    pub filename: Option<String>,
    /// Save on the server instead of returning a download
    pub path: Option<String>,
    #[serde(default)]
    pub unmapped: UnmappedCode,
}

/// Export response (saved files only; downloads return the file itself)
#[derive(Serialize, Default)]
pub struct ExportResponse {
    pub path: String,
    pub format: String,
    pub rows: usize,
}

/// POST /api/v1/export - Export rows as a download or to a server path
pub async fn export(Json(req): Json<ExportRequest>) -> Response {
    let options = ExportOptions {
        unmapped: req.unmapped,
        ..ExportOptions::default()
    };
    let exporter = match SheetExporter::new(&req.headers) {
        Ok(exporter) => exporter.with_options(options),
        Err(e) => return error_response(e),
    };

    let path = req.path.map(PathBuf::from);
    let format = match (req.format, &path) {
        (Some(format), _) => format,
        (None, Some(path)) => match ExportFormat::from_path(path) {
            Ok(format) => format,
            Err(e) => return error_response(e),
        },
        (None, None) => ExportFormat::Xlsx,
    };
    let target = match path {
        Some(path) => ExportTarget::File(path),
        None => ExportTarget::Download {
            filename: req.filename,
        },
    };

    let rows = req.rows;
    let row_count = rows.len();
    match blocking(move || exporter.export(&rows, format, target)).await {
        Ok(ExportOutcome::Download(download)) => download.into_response(),
        Ok(ExportOutcome::Saved(path)) => Json(ApiResponse::ok(ExportResponse {
            path: path.display().to_string(),
            format: format.to_string(),
            rows: row_count,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Legacy export request
#[derive(Deserialize)]
pub struct LegacyExportRequest {
    pub headers: Vec<HeaderSpec>,
    #[serde(default)]
    pub rows: Vec<Row>,
    pub filename: Option<String>,
}

/// POST /api/v1/export/legacy-csv - Legacy tab-comma text download
pub async fn export_legacy_csv(Json(req): Json<LegacyExportRequest>) -> Response {
    let LegacyExportRequest {
        headers,
        rows,
        filename,
    } = req;
    let result = blocking(move || {
        SheetExporter::new(&headers).and_then(|exporter| legacy_csv::encode(&exporter, &rows))
    })
    .await;
    match result {
        Ok(bytes) => {
            Download::new(filename.as_deref(), ExportFormat::Csv, bytes).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Import request
#[derive(Deserialize)]
pub struct ImportRequest {
    pub file_path: String,
    pub start_row: Option<u32>,
    /// When given, rows after the header row are decoded into records
    pub headers: Option<Vec<HeaderSpec>>,
}

/// Import response
#[derive(Serialize, Default)]
pub struct ImportResponse {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<ImportedRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Row>>,
}

/// POST /api/v1/import - Import the first sheet of a workbook
pub async fn import(Json(req): Json<ImportRequest>) -> Response {
    let defaults = ImportOptions::default();
    let options = ImportOptions {
        start_row: req.start_row.unwrap_or(defaults.start_row),
        ..defaults
    };
    let importer = SheetImporter::new(&req.file_path).with_options(options);

    let file_path = req.file_path;
    let headers = req.headers;
    let result = blocking(move || match headers {
        Some(headers) => HeaderRule::parse_all(&headers)
            .and_then(|rules| importer.import_records(&rules))
            .map(|records| ImportResponse {
                file_path,
                rows: None,
                records: Some(records),
            }),
        None => importer.import().map(|rows| ImportResponse {
            file_path,
            rows: Some(rows),
            records: None,
        }),
    })
    .await;

    match result {
        Ok(response) => Json(ApiResponse::ok(response)).into_response(),
        Err(e) => error_response(e),
    }
}
