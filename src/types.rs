use crate::error::{SheetIoError, SheetIoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A caller-supplied record: field name to scalar or nested object
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Raw header spec as supplied by callers: `(label with rule, field path)`
pub type HeaderSpec = (String, String);

//==============================================================================
// Output formats
//==============================================================================

/// Spreadsheet formats the exporter can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Office Open XML workbook (.xlsx)
    Xlsx,
    /// Legacy BIFF8 workbook (.xls)
    Xls,
    /// Delimited text (.csv)
    Csv,
    /// Markup table (.html)
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Xlsx,
        ExportFormat::Xls,
        ExportFormat::Csv,
        ExportFormat::Html,
    ];

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Xls => "xls",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }

    /// MIME type sent with downloads
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;charset=utf-8"
            }
            ExportFormat::Xls => "application/vnd.ms-excel;charset=utf-8",
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Html => "text/html;charset=utf-8",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> SheetIoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                SheetIoError::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;
        ext.parse()
    }
}

impl FromStr for ExportFormat {
    type Err = SheetIoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "xls" => Ok(ExportFormat::Xls),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            _ => Err(SheetIoError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

//==============================================================================
// Options
//==============================================================================

/// What to do when a cell holds a code the column's table does not list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedCode {
    /// Abort the export with `SheetIoError::UnmappedCode`
    #[default]
    Fail,
    /// Emit an empty segment and log a warning
    Blank,
    /// Emit the raw code and log a warning
    Passthrough,
}

/// Rows processed per write batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Consecutive blank rows tolerated before an import scan stops
pub const DEFAULT_BLANK_ROW_LIMIT: usize = 50;

/// Export tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub batch_size: usize,
    /// Append a tab to numeric-looking values so viewers keep them as text
    pub numeric_guard: bool,
    pub unmapped: UnmappedCode,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            numeric_guard: true,
            unmapped: UnmappedCode::default(),
        }
    }
}

/// Import tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// First sheet row to read (1-based)
    pub start_row: u32,
    pub blank_row_limit: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            start_row: 1,
            blank_row_limit: DEFAULT_BLANK_ROW_LIMIT,
        }
    }
}

//==============================================================================
// Import results
//==============================================================================

/// One scanned sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedRow {
    /// 1-based sheet row number
    pub number: u32,
    pub cells: Vec<String>,
}

impl ImportedRow {
    /// True when every cell is empty (or the row has no cells)
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

//==============================================================================
// Export jobs
//==============================================================================

/// Headers plus rows, as read from a job file or an API body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    pub headers: Vec<HeaderSpec>,
    pub rows: Vec<Row>,
}
