//! File download responses
//!
//! An export without a destination path becomes a [`Download`]: the encoded
//! bytes plus the header contract browsers need to save them. The web layer
//! sends it as the final response for the request.

use crate::types::ExportFormat;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

const CONTENT_TYPE: &str = "content-type";
const CONTENT_DISPOSITION: &str = "content-disposition";
const CONTENT_EXTENSION: &str = "content-extension";
const CONTENT_FILENAME: &str = "content-filename";
const CACHE_CONTROL: &str = "cache-control";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Base name without extension
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Missing or blank names fall back to the current unix timestamp
    pub fn new(filename: Option<&str>, format: ExportFormat, bytes: Vec<u8>) -> Self {
        let filename = match filename.map(str::trim) {
            Some(name) if !name.is_empty() => sanitize_filename(name),
            _ => chrono::Utc::now().timestamp().to_string(),
        };
        Self {
            filename,
            format,
            bytes,
        }
    }

    /// `<name>.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.filename, self.format.extension())
    }

    /// Response headers, in the order they are sent
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (CONTENT_TYPE, self.format.content_type().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", self.file_name()),
            ),
            (CONTENT_EXTENSION, self.format.extension().to_string()),
            (CONTENT_FILENAME, self.filename.clone()),
            (CACHE_CONTROL, "max-age=0".to_string()),
        ]
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let headers = self.headers();
        let mut response = (StatusCode::OK, self.bytes).into_response();
        let map = response.headers_mut();
        for (name, value) in headers {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    map.insert(HeaderName::from_static(name), value);
                }
                Err(e) => tracing::warn!(header = name, error = %e, "skipping invalid header"),
            }
        }
        response
    }
}

/// Keep names usable inside a quoted Content-Disposition value
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' | '/' | ';' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
