//! Sheetio - spreadsheet export/import driven by header rules
//!
//! Column headers carry their own formatting rule. A header such as
//! `Status(select):1=Active,2=Inactive` labels the column `Status` and turns
//! stored codes `1,2` into `Active,Inactive` on export.
//!
//! # Features
//!
//! - Export rows to .xlsx, .xls, .csv or .html, to disk or as a download
//! - Dotted field paths (`meta.age`) with a `-` placeholder for missing data
//! - Import the first sheet of .xlsx / .xls files, stopping after long runs
//!   of blank rows
//! - Map imported rows back to records through the same header rules
//!
//! # Example
//!
//! ```no_run
//! use royalbit_sheetio::excel::{ExportTarget, SheetExporter};
//! use royalbit_sheetio::types::{ExportFormat, Row};
//! use std::path::PathBuf;
//!
//! let headers = vec![
//!     ("Name".to_string(), "name".to_string()),
//!     ("Status(select):1=Active,2=Inactive".to_string(), "status".to_string()),
//! ];
//! let rows: Vec<Row> = serde_json::from_str(r#"[{"name": "Ann", "status": "1"}]"#)?;
//!
//! let exporter = SheetExporter::new(&headers)?;
//! exporter.export(&rows, ExportFormat::Xlsx, ExportTarget::File(PathBuf::from("people.xlsx")))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod excel;
pub mod field;
pub mod parser;
pub mod rules;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{SheetIoError, SheetIoResult};
pub use field::{FieldPath, SENTINEL};
pub use rules::{ChoiceKind, ColumnFormat, HeaderRule};
pub use types::{ExportFormat, ExportOptions, ImportOptions, ImportedRow, Row, UnmappedCode};
