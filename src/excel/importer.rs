//! Spreadsheet importer: .xlsx / .xls → rows of trimmed cell text

use super::scanner::{drop_blank_rows, BoundedScanner};
use crate::error::{SheetIoError, SheetIoResult};
use crate::field::SENTINEL;
use crate::rules::HeaderRule;
use crate::types::{ImportOptions, ImportedRow, Row};
use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use serde_json::Value;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Importer for the first worksheet of a workbook
pub struct SheetImporter {
    path: PathBuf,
    options: ImportOptions,
}

impl SheetImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// First row to read (1-based)
    pub fn start_row(mut self, row: u32) -> Self {
        self.options.start_row = row;
        self
    }

    /// Scan the first sheet and return its rows
    pub fn import(&self) -> SheetIoResult<Vec<ImportedRow>> {
        let Some(sheet) = self.open_first_sheet()? else {
            return Ok(Vec::new());
        };

        let outcome = BoundedScanner::new(&self.options).scan(&sheet);
        tracing::info!(
            path = %self.path.display(),
            rows = outcome.rows.len(),
            last_row = outcome.state.current_row,
            stopped_early = outcome.stopped_early,
            "sheet scanned"
        );
        Ok(drop_blank_rows(outcome.rows))
    }

    /// Import rows and map them back onto records using the header rules.
    ///
    /// The first imported row is taken as the header row. Column `i` feeds
    /// `rules[i].field`; coded columns are translated back from labels to
    /// codes and sentinel cells are left out.
    pub fn import_records(&self, rules: &[HeaderRule]) -> SheetIoResult<Vec<Row>> {
        let rows = self.import()?;
        let Some((header, data)) = rows.split_first() else {
            return Ok(Vec::new());
        };

        for (i, rule) in rules.iter().enumerate() {
            let found = header.cells.get(i).map(String::as_str).unwrap_or_default();
            if found != rule.label {
                tracing::warn!(
                    column = i + 1,
                    expected = %rule.label,
                    found,
                    "header does not match rule"
                );
            }
        }

        let records = data
            .iter()
            .map(|row| {
                let mut record = Row::new();
                for (rule, cell) in rules.iter().zip(&row.cells) {
                    if cell.is_empty() || cell == SENTINEL {
                        continue;
                    }
                    rule.field.assign(&mut record, Value::String(rule.decode(cell)));
                }
                record
            })
            .filter(|record| !record.is_empty())
            .collect();
        Ok(records)
    }

    /// Probe the .xlsx reader first, then .xls
    fn open_first_sheet(&self) -> SheetIoResult<Option<Range<Data>>> {
        std::fs::metadata(&self.path)?;

        let xlsx_error = match open_workbook::<Xlsx<_>, _>(&self.path) {
            Ok(workbook) => return first_sheet(workbook),
            Err(e) => e.to_string(),
        };
        tracing::debug!(path = %self.path.display(), error = %xlsx_error, "not an .xlsx file");

        let xls_error = match open_workbook::<Xls<_>, _>(&self.path) {
            Ok(workbook) => return first_sheet(workbook),
            Err(e) => e.to_string(),
        };

        Err(SheetIoError::UnreadableFile(format!(
            "{} (xlsx: {}; xls: {})",
            self.path.display(),
            xlsx_error,
            xls_error
        )))
    }
}

fn first_sheet<R>(mut workbook: R) -> SheetIoResult<Option<Range<Data>>>
where
    R: Reader<BufReader<File>>,
    R::Error: Display,
{
    match workbook.worksheet_range_at(0) {
        None => Ok(None),
        Some(range) => range
            .map(Some)
            .map_err(|e| SheetIoError::Import(format!("Failed to read first sheet: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_io_error() {
        let importer = SheetImporter::new("/nonexistent/sheet.xlsx");
        assert!(matches!(importer.import(), Err(SheetIoError::Io(_))));
    }

    #[test]
    fn test_plain_text_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.xlsx");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "just some text").unwrap();

        let err = SheetImporter::new(&path).import().unwrap_err();
        assert!(matches!(err, SheetIoError::UnreadableFile(_)));
    }

    #[test]
    fn test_builder_sets_start_row() {
        let importer = SheetImporter::new("a.xlsx").start_row(3);
        assert_eq!(importer.options.start_row, 3);
        assert_eq!(importer.options.blank_row_limit, 50);
    }
}
