//! Batch exporter: rows + header rules → spreadsheet bytes

use super::download::Download;
use crate::error::{SheetIoError, SheetIoResult};
use crate::rules::HeaderRule;
use crate::types::{ExportFormat, ExportOptions, HeaderSpec, Row};
use crate::writer::{self, CellSink};
use std::path::{Path, PathBuf};

/// Appended to numeric-looking values so viewers keep them as text
pub const NUMERIC_GUARD: char = '\t';

/// Where an export goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Write the encoded file to disk
    File(PathBuf),
    /// Hand the bytes back as a download; `None` names it after the current time
    Download { filename: Option<String> },
}

/// Result of a successful export
#[derive(Debug)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// Terminal response for the web layer to send
    Download(Download),
}

/// Exporter for one set of header rules
pub struct SheetExporter {
    rules: Vec<HeaderRule>,
    options: ExportOptions,
}

impl SheetExporter {
    /// Parse the header specs once; they are reused for every row
    pub fn new(headers: &[HeaderSpec]) -> SheetIoResult<Self> {
        Ok(Self::from_rules(HeaderRule::parse_all(headers)?))
    }

    pub fn from_rules(rules: Vec<HeaderRule>) -> Self {
        Self {
            rules,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Header row labels, in column order
    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.label.as_str()).collect()
    }

    /// Resolve, trim and translate every column of one row
    pub fn render_row(&self, row: &Row) -> SheetIoResult<Vec<String>> {
        self.rules
            .iter()
            .map(|rule| {
                let resolved = rule.field.resolve(row);
                rule.format(resolved.trim(), self.options.unmapped)
            })
            .collect()
    }

    /// Encode a header row plus all rows in the given format
    pub fn encode(&self, rows: &[Row], format: ExportFormat) -> SheetIoResult<Vec<u8>> {
        let mut sink = writer::sink_for(format);

        for (col, label) in self.labels().into_iter().enumerate() {
            sink.write_cell(0, column_index(col)?, label)?;
        }

        let batch_size = self.options.batch_size.max(1);
        for (batch_no, batch) in rows.chunks(batch_size).enumerate() {
            let first_row = batch_no * batch_size;
            let buffer = batch
                .iter()
                .map(|row| self.render_row(row))
                .collect::<SheetIoResult<Vec<_>>>()?;

            self.write_batch(sink.as_mut(), first_row, buffer)?;
            tracing::debug!(batch = batch_no, rows = batch.len(), "batch written");
        }

        let bytes = sink.finish()?;
        tracing::info!(
            format = %format,
            rows = rows.len(),
            columns = self.rules.len(),
            bytes = bytes.len(),
            "export encoded"
        );
        Ok(bytes)
    }

    fn write_batch(
        &self,
        sink: &mut dyn CellSink,
        first_row: usize,
        buffer: Vec<Vec<String>>,
    ) -> SheetIoResult<()> {
        for (offset, cells) in buffer.into_iter().enumerate() {
            // header occupies sheet row 0
            let sheet_row = u32::try_from(first_row + offset + 1).map_err(|_| {
                SheetIoError::Export("too many rows for a single sheet".to_string())
            })?;
            for (col, value) in cells.into_iter().enumerate() {
                let value = if self.options.numeric_guard {
                    guard_numeric(value)
                } else {
                    value
                };
                sink.write_cell(sheet_row, column_index(col)?, &value)?;
            }
        }
        Ok(())
    }

    /// Encode and deliver to `target`
    pub fn export(
        &self,
        rows: &[Row],
        format: ExportFormat,
        target: ExportTarget,
    ) -> SheetIoResult<ExportOutcome> {
        let bytes = self.encode(rows, format)?;
        match target {
            ExportTarget::File(path) => {
                save(&path, &bytes)?;
                Ok(ExportOutcome::Saved(path))
            }
            ExportTarget::Download { filename } => Ok(ExportOutcome::Download(Download::new(
                filename.as_deref(),
                format,
                bytes,
            ))),
        }
    }

    /// Export straight to a file, picking the format from its extension
    pub fn export_to_path(&self, rows: &[Row], path: &Path) -> SheetIoResult<()> {
        let format = ExportFormat::from_path(path)?;
        let bytes = self.encode(rows, format)?;
        save(path, &bytes)
    }
}

fn save(path: &Path, bytes: &[u8]) -> SheetIoResult<()> {
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), "export saved");
    Ok(())
}

fn column_index(col: usize) -> SheetIoResult<u16> {
    u16::try_from(col).map_err(|_| SheetIoError::Export(format!("column {} out of range", col)))
}

/// Mark values a spreadsheet would otherwise turn into numbers
/// (long IDs, card numbers, zero-padded codes).
pub fn guard_numeric(mut value: String) -> String {
    if looks_numeric(&value) {
        value.push(NUMERIC_GUARD);
    }
    value
}

fn looks_numeric(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().any(|b| b.is_ascii_digit())
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        && value.parse::<f64>().is_ok()
}
