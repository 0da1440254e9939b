//! .xlsx writer backed by rust_xlsxwriter

use super::CellSink;
use crate::error::{SheetIoError, SheetIoResult};
use rust_xlsxwriter::{Workbook, Worksheet};

/// Writes every cell as a string cell on a single worksheet
pub struct XlsxSink {
    worksheet: Worksheet,
}

impl XlsxSink {
    pub fn new() -> Self {
        Self {
            worksheet: Worksheet::new(),
        }
    }
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CellSink for XlsxSink {
    fn write_cell(&mut self, row: u32, col: u16, value: &str) -> SheetIoResult<()> {
        self.worksheet
            .write_string(row, col, value)
            .map_err(|e| SheetIoError::Export(format!("Failed to write cell: {}", e)))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> SheetIoResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook
            .save_to_buffer()
            .map_err(|e| SheetIoError::Export(format!("Failed to encode workbook: {}", e)))
    }
}
