//! Spreadsheet writers
//!
//! Every output format implements [`CellSink`]: the exporter pushes cells in
//! row-major order and collects the encoded bytes at the end.

mod delimited;
mod html;
mod xls;
mod xlsx;

pub use delimited::CsvSink;
pub use html::HtmlSink;
pub use xls::XlsSink;
pub use xlsx::XlsxSink;

use crate::error::{SheetIoError, SheetIoResult};
use crate::types::ExportFormat;

/// Destination for exported cells
pub trait CellSink {
    /// Write one cell. Coordinates are 0-based; cells arrive row by row.
    fn write_cell(&mut self, row: u32, col: u16, value: &str) -> SheetIoResult<()>;

    /// Encode everything written so far
    fn finish(self: Box<Self>) -> SheetIoResult<Vec<u8>>;
}

/// Create the writer for an output format
pub fn sink_for(format: ExportFormat) -> Box<dyn CellSink> {
    match format {
        ExportFormat::Xlsx => Box::new(XlsxSink::new()),
        ExportFormat::Xls => Box::new(XlsSink::new()),
        ExportFormat::Csv => Box::new(CsvSink::new()),
        ExportFormat::Html => Box::new(HtmlSink::new()),
    }
}

/// Groups row-major cell writes into whole rows for the text formats.
/// Rows that receive no cells are not emitted.
#[derive(Debug, Default)]
pub(crate) struct RowAssembler {
    row: Option<u32>,
    cells: Vec<String>,
}

impl RowAssembler {
    /// Place a cell, returning the previous row once `row` moves past it
    pub(crate) fn put(
        &mut self,
        row: u32,
        col: u16,
        value: &str,
    ) -> SheetIoResult<Option<Vec<String>>> {
        let finished = match self.row {
            Some(current) if row < current => {
                return Err(SheetIoError::Export(format!(
                    "cell ({}, {}) written after row {}",
                    row, col, current
                )))
            }
            Some(current) if row > current => Some(std::mem::take(&mut self.cells)),
            _ => None,
        };
        self.row = Some(row);

        let col = col as usize;
        if self.cells.len() <= col {
            self.cells.resize(col + 1, String::new());
        }
        self.cells[col] = value.to_string();

        Ok(finished)
    }

    /// The last row, if any cells were written
    pub(crate) fn take(&mut self) -> Option<Vec<String>> {
        self.row.take().map(|_| std::mem::take(&mut self.cells))
    }
}
