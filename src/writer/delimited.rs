//! .csv writer backed by the csv crate

use super::{CellSink, RowAssembler};
use crate::error::{SheetIoError, SheetIoResult};

pub struct CsvSink {
    rows: RowAssembler,
    writer: csv::Writer<Vec<u8>>,
}

impl CsvSink {
    pub fn new() -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        Self {
            rows: RowAssembler::default(),
            writer,
        }
    }

    fn emit(&mut self, record: &[String]) -> SheetIoResult<()> {
        self.writer
            .write_record(record)
            .map_err(|e| SheetIoError::Export(format!("Failed to write CSV record: {}", e)))
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CellSink for CsvSink {
    fn write_cell(&mut self, row: u32, col: u16, value: &str) -> SheetIoResult<()> {
        if let Some(record) = self.rows.put(row, col, value)? {
            self.emit(&record)?;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> SheetIoResult<Vec<u8>> {
        if let Some(record) = self.rows.take() {
            self.emit(&record)?;
        }
        self.writer
            .into_inner()
            .map_err(|e| SheetIoError::Export(format!("Failed to flush CSV: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_quotes_when_needed() {
        let mut sink = Box::new(CsvSink::new());
        sink.write_cell(0, 0, "Name").unwrap();
        sink.write_cell(0, 1, "Tags").unwrap();
        sink.write_cell(1, 0, "Ann").unwrap();
        sink.write_cell(1, 1, "Active,Inactive").unwrap();
        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(text, "Name,Tags\nAnn,\"Active,Inactive\"\n");
    }

    #[test]
    fn test_csv_empty_sink() {
        let sink = Box::new(CsvSink::new());
        assert!(sink.finish().unwrap().is_empty());
    }
}
