//! API integration tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use royalbit_sheetio::api::router;
use royalbit_sheetio::api::server::{ApiConfig, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(AppState {
        version: "1.0.0".to_string(),
    }))
}

async fn post_json(uri: &str, body: Value) -> Response {
    app()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(uri: &str) -> Response {
    app()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_value(response: &Response, name: &str) -> String {
    response.headers()[name].to_str().unwrap().to_string()
}

fn people() -> Value {
    json!({
        "headers": [
            ["Name", "name"],
            ["Status(select):1=Active,2=Inactive", "status"]
        ],
        "rows": [
            {"name": "Ann", "status": "1"},
            {"name": "Bob", "status": "1,2"}
        ]
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = ApiConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_root_lists_endpoints() {
    let response = get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["version"], "1.0.0");
    let paths: Vec<&str> = json["data"]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/api/v1/export"));
    assert!(paths.contains(&"/api/v1/import"));
}

#[tokio::test]
async fn test_health() {
    let json = body_json(get("/health").await).await;
    assert_eq!(json["data"]["status"], "healthy");
    assert_eq!(json["request_id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_version_lists_formats() {
    let json = body_json(get("/version").await).await;
    assert_eq!(json["data"]["formats"], json!(["xlsx", "xls", "csv", "html"]));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_export_csv_download() {
    let mut body = people();
    body["format"] = json!("csv");
    body["filename"] = json!("people");

    let response = post_json("/api/v1/export", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, "content-type"),
        "text/csv;charset=utf-8"
    );
    assert_eq!(
        header_value(&response, "content-disposition"),
        "attachment; filename=\"people.csv\""
    );
    assert_eq!(header_value(&response, "content-extension"), "csv");
    assert_eq!(header_value(&response, "content-filename"), "people");
    assert_eq!(header_value(&response, "cache-control"), "max-age=0");

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(text, "Name,Status\nAnn,Active\nBob,\"Active,Inactive\"\n");
}

#[tokio::test]
async fn test_export_defaults_to_xlsx_with_timestamp_name() {
    let response = post_json("/api/v1/export", people()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "content-extension"), "xlsx");

    let name = header_value(&response, "content-filename");
    assert!(!name.is_empty());
    assert!(name.chars().all(|c| c.is_ascii_digit()));

    // xlsx is a zip container
    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_export_to_server_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xls");
    let mut body = people();
    body["path"] = json!(path.to_str().unwrap());

    let response = post_json("/api/v1/export", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["format"], "xls");
    assert_eq!(json["data"]["rows"], 2);
    assert!(path.exists());
}

#[tokio::test]
async fn test_export_unmapped_code_is_bad_request() {
    let body = json!({
        "headers": [["Status(radio):1=On,0=Off", "status"]],
        "rows": [{"status": "7"}]
    });

    let response = post_json("/api/v1/export", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains('7'));
}

#[tokio::test]
async fn test_export_unknown_path_extension() {
    let mut body = people();
    body["path"] = json!("/tmp/people.pdf");

    let response = post_json("/api/v1/export", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_legacy_csv() {
    let mut body = people();
    body["filename"] = json!("legacy");

    let response = post_json("/api/v1/export/legacy-csv", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, "content-disposition"),
        "attachment; filename=\"legacy.csv\""
    );

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(
        text,
        "\u{FEFF}Name\t ,Status\t ,\nAnn\t ,Active\t ,\nBob\t ,Active,Inactive\t ,"
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_export_then_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    let mut body = people();
    body["path"] = json!(path.to_str().unwrap());
    assert_eq!(
        post_json("/api/v1/export", body).await.status(),
        StatusCode::OK
    );

    let response = post_json(
        "/api/v1/import",
        json!({"file_path": path.to_str().unwrap(), "start_row": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"]["rows"],
        json!([
            {"number": 2, "cells": ["Ann", "Active"]},
            {"number": 3, "cells": ["Bob", "Active,Inactive"]}
        ])
    );
}

#[tokio::test]
async fn test_import_records_with_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    let mut body = people();
    body["path"] = json!(path.to_str().unwrap());
    post_json("/api/v1/export", body).await;

    let json = body_json(
        post_json(
            "/api/v1/import",
            json!({"file_path": path.to_str().unwrap(), "headers": people()["headers"]}),
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["records"], people()["rows"]);
    assert!(json["data"].get("rows").is_none());
}

#[tokio::test]
async fn test_import_missing_file() {
    let response = post_json(
        "/api/v1/import",
        json!({"file_path": "/nonexistent/people.xlsx"}),
    )
    .await;

    assert!(!response.status().is_success());
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}
