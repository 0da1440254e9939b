//! Bounded sheet scanning
//!
//! Sheets exported by hand often carry thousands of formatted but empty
//! rows. The scanner walks rows top to bottom and gives up once it has seen
//! more than `blank_row_limit` blank rows in a row.

use crate::types::{ImportOptions, ImportedRow};
use calamine::{Data, Range};

/// Read access to one worksheet. Rows and columns are 1-based.
pub trait SheetSource {
    /// Last populated row, 0 for an empty sheet
    fn highest_row(&self) -> u32;

    /// Last populated column, 0 for an empty sheet
    fn highest_column(&self) -> u32;

    /// Cell value as text; empty for missing cells
    fn cell(&self, row: u32, col: u32) -> String;
}

impl SheetSource for Range<Data> {
    fn highest_row(&self) -> u32 {
        self.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    fn highest_column(&self) -> u32 {
        self.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    fn cell(&self, row: u32, col: u32) -> String {
        if row == 0 || col == 0 {
            return String::new();
        }
        self.get_value((row - 1, col - 1))
            .map(|data| data.to_string())
            .unwrap_or_default()
    }
}

/// Position of a scan in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub current_row: u32,
    pub current_column: u32,
    pub consecutive_empty_rows: usize,
}

/// Rows read from a sheet plus where the scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub rows: Vec<ImportedRow>,
    pub state: ScanState,
    /// True when the blank-row limit cut the scan short
    pub stopped_early: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct BoundedScanner {
    start_row: u32,
    blank_row_limit: usize,
}

impl BoundedScanner {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            start_row: options.start_row.max(1),
            blank_row_limit: options.blank_row_limit,
        }
    }

    pub fn scan<S: SheetSource + ?Sized>(&self, sheet: &S) -> ScanOutcome {
        let highest_row = sheet.highest_row();
        let highest_column = sheet.highest_column();
        let mut state = ScanState::default();
        let mut rows = Vec::new();
        let mut stopped_early = false;

        for row in self.start_row..=highest_row {
            state.current_row = row;

            let mut cells = Vec::with_capacity(highest_column as usize);
            for col in 1..=highest_column {
                state.current_column = col;
                cells.push(sheet.cell(row, col).trim().to_string());
            }

            let imported = ImportedRow { number: row, cells };
            if imported.is_blank() {
                state.consecutive_empty_rows += 1;
            } else {
                state.consecutive_empty_rows = 0;
            }
            rows.push(imported);

            if state.consecutive_empty_rows > self.blank_row_limit {
                stopped_early = true;
                tracing::debug!(
                    row,
                    limit = self.blank_row_limit,
                    "blank row limit reached, scan stopped"
                );
                break;
            }
        }

        ScanOutcome {
            rows,
            state,
            stopped_early,
        }
    }
}

/// Drop blank rows, unless the first scanned row is itself blank, in which
/// case the raw shape is kept so callers can see what the sheet looks like.
pub fn drop_blank_rows(rows: Vec<ImportedRow>) -> Vec<ImportedRow> {
    match rows.first() {
        Some(first) if !first.is_blank() => rows.into_iter().filter(|r| !r.is_blank()).collect(),
        _ => rows,
    }
}
