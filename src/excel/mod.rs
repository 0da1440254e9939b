//! Spreadsheet export and import
//!
//! - Export: rows + header rules → .xlsx / .xls / .csv / .html, to a file or
//!   as a [`Download`]
//! - Import: .xlsx / .xls → rows of trimmed text from the first sheet, with a
//!   cap on trailing blank rows

mod download;
mod exporter;
mod importer;
pub mod legacy_csv;
pub mod scanner;

pub use download::Download;
pub use exporter::{guard_numeric, ExportOutcome, ExportTarget, SheetExporter, NUMERIC_GUARD};
pub use importer::SheetImporter;
pub use scanner::{BoundedScanner, ScanOutcome, ScanState, SheetSource};
