//! Export job files
//!
//! A job is a YAML (or JSON) document with the header specs and the rows:
//!
//! ```yaml
//! headers:
//!   - ["Status(select):1=Active,2=Inactive", status]
//!   - { label: Age, field: meta.age }
//! rows:
//!   - { status: "1,2", meta: { age: 30 } }
//! ```

use crate::error::{SheetIoError, SheetIoResult};
use crate::types::{ExportJob, HeaderSpec, Row};
use serde_yaml::Value;
use std::path::Path;

/// Read and validate a job file
pub fn parse_job(path: &Path) -> SheetIoResult<ExportJob> {
    let content = std::fs::read_to_string(path)?;
    parse_job_str(&content)
}

/// Validate a job document
pub fn parse_job_str(content: &str) -> SheetIoResult<ExportJob> {
    let yaml: Value = serde_yaml::from_str(content)?;
    if !yaml.is_mapping() {
        return Err(invalid("job must be a mapping with 'headers' and 'rows'"));
    }

    let headers = match yaml.get("headers") {
        Some(Value::Sequence(seq)) => seq
            .iter()
            .enumerate()
            .map(|(i, item)| parse_header(i, item))
            .collect::<SheetIoResult<Vec<_>>>()?,
        Some(_) => return Err(invalid("'headers' must be a list of [label, field] pairs")),
        None => return Err(invalid("missing 'headers'")),
    };

    let rows = match yaml.get("rows") {
        Some(Value::Sequence(seq)) => seq
            .iter()
            .enumerate()
            .map(|(i, item)| parse_row(i, item))
            .collect::<SheetIoResult<Vec<_>>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(invalid("'rows' must be a list of records")),
    };

    Ok(ExportJob { headers, rows })
}

/// Read just the header specs from a job file (rows may be absent)
pub fn parse_headers(path: &Path) -> SheetIoResult<Vec<HeaderSpec>> {
    Ok(parse_job(path)?.headers)
}

fn parse_header(index: usize, item: &Value) -> SheetIoResult<HeaderSpec> {
    let pair = match item {
        Value::Sequence(seq) if seq.len() == 2 => (seq[0].as_str(), seq[1].as_str()),
        Value::Mapping(_) => (
            item.get("label").and_then(Value::as_str),
            item.get("field").and_then(Value::as_str),
        ),
        _ => (None, None),
    };
    match pair {
        (Some(label), Some(field)) => Ok((label.to_string(), field.to_string())),
        _ => Err(invalid(&format!(
            "header #{} must be [label, field] with string values",
            index + 1
        ))),
    }
}

fn parse_row(index: usize, item: &Value) -> SheetIoResult<Row> {
    if !item.is_mapping() {
        return Err(invalid(&format!("row #{} is not a record", index + 1)));
    }
    serde_yaml::from_value(item.clone())
        .map_err(|e| invalid(&format!("row #{}: {}", index + 1, e)))
}

fn invalid(message: &str) -> SheetIoError {
    SheetIoError::InvalidInput(message.to_string())
}
