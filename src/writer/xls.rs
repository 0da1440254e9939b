//! Legacy .xls (BIFF8) writer
//!
//! Produces the smallest workbook Excel and calamine both accept: a globals
//! substream (fonts, XFs, one sheet entry, shared strings) followed by one
//! worksheet substream of LABELSST cells, wrapped in a CFB container under
//! the `Workbook` stream name.
//!
//! Reference: [MS-XLS] §2.3 (record enumeration), §2.4 (record layouts).

use super::CellSink;
use crate::error::{SheetIoError, SheetIoResult};
use std::collections::HashMap;
use std::io::{Cursor, Write};

// ── Record ids ──────────────────────────────────────────────────────────
const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const CONTINUE: u16 = 0x003C;
const CODEPAGE: u16 = 0x0042;
const WINDOW1: u16 = 0x003D;
const FONT: u16 = 0x0031;
const XF: u16 = 0x00E0;
const STYLE: u16 = 0x0293;
const BOUNDSHEET: u16 = 0x0085;
const SST: u16 = 0x00FC;
const DIMENSION: u16 = 0x0200;
const LABELSST: u16 = 0x00FD;
const WINDOW2: u16 = 0x023E;

const BIFF8_VERSION: u16 = 0x0600;
const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_WORKSHEET: u16 = 0x0010;
const CODEPAGE_UTF16: u16 = 1200;

/// Largest record body; longer payloads spill into CONTINUE records
const MAX_RECORD_DATA: usize = 8224;
/// BIFF8 sheet limits
const MAX_ROWS: u32 = 65_536;
const MAX_COLS: u16 = 256;
/// Style XFs 0..=15 are mandatory; cells use the first XF after them
const CELL_XF: u16 = 16;
/// Excel treats workbook streams below this size as suspicious
const MIN_STREAM_LEN: usize = 4096;

pub struct XlsSink {
    cells: Vec<u8>,
    strings: SharedStrings,
    used: Option<UsedRange>,
}

#[derive(Debug, Clone, Copy)]
struct UsedRange {
    first_row: u32,
    last_row: u32,
    first_col: u16,
    last_col: u16,
}

impl XlsSink {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            strings: SharedStrings::default(),
            used: None,
        }
    }

    fn track(&mut self, row: u32, col: u16) {
        self.used = Some(match self.used {
            None => UsedRange {
                first_row: row,
                last_row: row,
                first_col: col,
                last_col: col,
            },
            Some(r) => UsedRange {
                first_row: r.first_row.min(row),
                last_row: r.last_row.max(row),
                first_col: r.first_col.min(col),
                last_col: r.last_col.max(col),
            },
        });
    }

    fn globals(&self, sheet_offset: u32) -> Vec<u8> {
        let mut out = Vec::new();
        write_record(&mut out, BOF, &bof(BOF_WORKBOOK_GLOBALS));
        write_record(&mut out, CODEPAGE, &CODEPAGE_UTF16.to_le_bytes());
        write_record(&mut out, WINDOW1, &window1());
        // Excel skips font index 4, so four entries cover every reference
        for _ in 0..4 {
            write_record(&mut out, FONT, &font("Arial"));
        }
        for _ in 0..CELL_XF {
            write_record(&mut out, XF, &xf(true));
        }
        write_record(&mut out, XF, &xf(false));
        // Built-in "Normal" style on XF 0
        write_record(&mut out, STYLE, &[0x00, 0x80, 0x00, 0xFF]);
        write_record(&mut out, BOUNDSHEET, &boundsheet(sheet_offset, "Sheet1"));
        self.strings.write_to(&mut out);
        write_record(&mut out, EOF, &[]);
        out
    }

    fn worksheet(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_record(&mut out, BOF, &bof(BOF_WORKSHEET));
        write_record(&mut out, DIMENSION, &dimension(self.used));
        out.extend_from_slice(&self.cells);
        write_record(&mut out, WINDOW2, &window2());
        write_record(&mut out, EOF, &[]);
        out
    }
}

impl Default for XlsSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CellSink for XlsSink {
    fn write_cell(&mut self, row: u32, col: u16, value: &str) -> SheetIoResult<()> {
        if row >= MAX_ROWS || col >= MAX_COLS {
            return Err(SheetIoError::Export(format!(
                "cell ({}, {}) is outside the .xls limit of {} rows x {} columns",
                row, col, MAX_ROWS, MAX_COLS
            )));
        }
        if value.is_empty() {
            return Ok(());
        }

        let index = self.strings.intern(value);
        let mut data = Vec::with_capacity(10);
        data.extend_from_slice(&(row as u16).to_le_bytes());
        data.extend_from_slice(&col.to_le_bytes());
        data.extend_from_slice(&CELL_XF.to_le_bytes());
        data.extend_from_slice(&index.to_le_bytes());
        write_record(&mut self.cells, LABELSST, &data);
        self.track(row, col);
        Ok(())
    }

    fn finish(self: Box<Self>) -> SheetIoResult<Vec<u8>> {
        // BOUNDSHEET has a fixed size, so a dry run gives the sheet offset
        let sheet_offset = self.globals(0).len() as u32;
        let mut stream = self.globals(sheet_offset);
        stream.extend_from_slice(&self.worksheet());
        if stream.len() < MIN_STREAM_LEN {
            stream.resize(MIN_STREAM_LEN, 0);
        }

        tracing::debug!(
            bytes = stream.len(),
            strings = self.strings.unique.len(),
            "encoded BIFF8 workbook stream"
        );
        wrap_compound_file(&stream)
            .map_err(|e| SheetIoError::Export(format!("Failed to build .xls container: {}", e)))
    }
}

fn wrap_compound_file(stream: &[u8]) -> std::io::Result<Vec<u8>> {
    // Version 3 (512-byte sectors), as BIFF8 readers expect
    let mut compound =
        cfb::CompoundFile::create_with_version(cfb::Version::V3, Cursor::new(Vec::new()))?;
    {
        let mut workbook = compound.create_stream("/Workbook")?;
        workbook.write_all(stream)?;
        workbook.flush()?;
    }
    compound.flush()?;
    Ok(compound.into_inner().into_inner())
}

fn write_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(substream: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&BIFF8_VERSION.to_le_bytes());
    data.extend_from_slice(&substream.to_le_bytes());
    data.extend_from_slice(&0x0DBBu16.to_le_bytes()); // build
    data.extend_from_slice(&0x07CCu16.to_le_bytes()); // year
    data.extend_from_slice(&0x0000_0000u32.to_le_bytes()); // file history
    data.extend_from_slice(&0x0000_0006u32.to_le_bytes()); // lowest BIFF version
    data
}

fn window1() -> Vec<u8> {
    let fields: [u16; 9] = [0, 0, 0x3A5C, 0x2328, 0x0038, 0, 0, 1, 0x0258];
    fields.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn font(name: &str) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&200u16.to_le_bytes()); // height in twips
    data.extend_from_slice(&0u16.to_le_bytes()); // attributes
    data.extend_from_slice(&0x7FFFu16.to_le_bytes()); // system text colour
    data.extend_from_slice(&400u16.to_le_bytes()); // normal weight
    data.extend_from_slice(&0u16.to_le_bytes()); // escapement
    data.extend_from_slice(&[0, 0, 0, 0]); // underline, family, charset, reserved
    push_short_string(&mut data, name);
    data
}

fn xf(style: bool) -> Vec<u8> {
    let flags: u16 = if style { 0xFFF5 } else { 0x0001 };
    let used_attributes: u8 = if style { 0xF4 } else { 0x00 };
    let mut data = Vec::with_capacity(20);
    data.extend_from_slice(&0u16.to_le_bytes()); // font
    data.extend_from_slice(&0u16.to_le_bytes()); // number format "General"
    data.extend_from_slice(&flags.to_le_bytes());
    data.push(0x20); // bottom aligned
    data.push(0x00); // rotation
    data.push(0x00); // indent
    data.push(used_attributes);
    data.extend_from_slice(&0u32.to_le_bytes()); // border lines
    data.extend_from_slice(&0u32.to_le_bytes()); // border colours
    data.extend_from_slice(&0x20C0u16.to_le_bytes()); // default pattern colours
    data
}

fn boundsheet(offset: u32, name: &str) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&offset.to_le_bytes());
    data.push(0x00); // visible
    data.push(0x00); // worksheet
    push_short_string(&mut data, name);
    data
}

fn dimension(used: Option<UsedRange>) -> Vec<u8> {
    let (first_row, last_row, first_col, last_col) = match used {
        Some(r) => (r.first_row, r.last_row + 1, r.first_col, r.last_col + 1),
        None => (0, 0, 0, 0),
    };
    let mut data = Vec::with_capacity(14);
    data.extend_from_slice(&first_row.to_le_bytes());
    data.extend_from_slice(&last_row.to_le_bytes());
    data.extend_from_slice(&first_col.to_le_bytes());
    data.extend_from_slice(&last_col.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data
}

fn window2() -> Vec<u8> {
    let fields: [u16; 9] = [0x06B6, 0, 0, 0x0040, 0, 0, 0, 0, 0];
    fields.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// 1-byte length prefix; names here are always Latin-1
fn push_short_string(data: &mut Vec<u8>, text: &str) {
    data.push(text.len() as u8);
    data.push(0x00);
    data.extend_from_slice(text.as_bytes());
}

/// Character payload of a BIFF8 unicode string
struct EncodedString {
    units: u16,
    wide: bool,
    bytes: Vec<u8>,
}

impl EncodedString {
    /// Excel caps cell text at 32767 characters
    const MAX_UNITS: usize = 32_767;

    fn new(text: &str) -> Self {
        let mut utf16: Vec<u16> = text.encode_utf16().collect();
        if utf16.len() > Self::MAX_UNITS {
            tracing::warn!(
                length = utf16.len(),
                "cell text truncated to the .xls limit of 32767 characters"
            );
            utf16.truncate(Self::MAX_UNITS);
        }

        let wide = utf16.iter().any(|&u| u > 0xFF);
        let bytes = if wide {
            utf16.iter().flat_map(|u| u.to_le_bytes()).collect()
        } else {
            utf16.iter().map(|&u| u as u8).collect()
        };
        Self {
            units: utf16.len() as u16,
            wide,
            bytes,
        }
    }

    fn flags(&self) -> u8 {
        if self.wide {
            0x01
        } else {
            0x00
        }
    }

    fn char_width(&self) -> usize {
        if self.wide {
            2
        } else {
            1
        }
    }
}

/// The SST: deduplicated cell strings, split across CONTINUE records
#[derive(Default)]
struct SharedStrings {
    unique: Vec<String>,
    index: HashMap<String, u32>,
    total: u32,
}

impl SharedStrings {
    fn intern(&mut self, text: &str) -> u32 {
        self.total += 1;
        if let Some(&i) = self.index.get(text) {
            return i;
        }
        let i = self.unique.len() as u32;
        self.unique.push(text.to_string());
        self.index.insert(text.to_string(), i);
        i
    }

    /// Record bodies: the SST body first, then CONTINUE bodies.
    /// A string header never straddles a boundary; character data may, and
    /// each continuation restates the encoding flag.
    fn bodies(&self) -> Vec<Vec<u8>> {
        let mut header = Vec::with_capacity(MAX_RECORD_DATA);
        header.extend_from_slice(&self.total.to_le_bytes());
        header.extend_from_slice(&(self.unique.len() as u32).to_le_bytes());
        let mut bodies = vec![header];

        for text in &self.unique {
            let encoded = EncodedString::new(text);
            let width = encoded.char_width();

            let room = MAX_RECORD_DATA - bodies.last().map_or(0, Vec::len);
            if room < 3 + width {
                bodies.push(Vec::with_capacity(MAX_RECORD_DATA));
            }
            if let Some(current) = bodies.last_mut() {
                current.extend_from_slice(&encoded.units.to_le_bytes());
                current.push(encoded.flags());
            }

            let mut rest = encoded.bytes.as_slice();
            loop {
                let used = bodies.last().map_or(0, Vec::len);
                let room = (MAX_RECORD_DATA - used) / width * width;
                let take = room.min(rest.len());
                if let Some(current) = bodies.last_mut() {
                    current.extend_from_slice(&rest[..take]);
                }
                rest = &rest[take..];
                if rest.is_empty() {
                    break;
                }
                let mut next = Vec::with_capacity(MAX_RECORD_DATA);
                next.push(encoded.flags());
                bodies.push(next);
            }
        }
        bodies
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        for (i, body) in self.bodies().iter().enumerate() {
            let id = if i == 0 { SST } else { CONTINUE };
            write_record(out, id, body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(stream: &[u8]) -> Vec<(u16, usize)> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos + 4 <= stream.len() {
            let id = u16::from_le_bytes([stream[pos], stream[pos + 1]]);
            let len = u16::from_le_bytes([stream[pos + 2], stream[pos + 3]]) as usize;
            out.push((id, len));
            pos += 4 + len;
            if id == EOF && out.iter().filter(|(i, _)| *i == EOF).count() == 2 {
                break;
            }
        }
        out
    }

    #[test]
    fn test_shared_strings_are_deduplicated() {
        let mut sst = SharedStrings::default();
        assert_eq!(sst.intern("a"), 0);
        assert_eq!(sst.intern("b"), 1);
        assert_eq!(sst.intern("a"), 0);
        assert_eq!(sst.total, 3);
        assert_eq!(sst.unique.len(), 2);
    }

    #[test]
    fn test_long_strings_spill_into_continue_records() {
        let mut sst = SharedStrings::default();
        sst.intern(&"x".repeat(20_000));
        let bodies = sst.bodies();
        assert_eq!(bodies.len(), 3);
        assert!(bodies.iter().all(|b| b.len() <= MAX_RECORD_DATA));
        // 8 byte SST header + 3 byte string header + payload + 1 flag byte per continuation
        let total: usize = bodies.iter().map(Vec::len).sum();
        assert_eq!(total, 8 + 3 + 20_000 + 2);
        assert_eq!(bodies[1][0], 0x00);
    }

    #[test]
    fn test_wide_strings_keep_whole_characters() {
        let mut sst = SharedStrings::default();
        sst.intern(&"é中".repeat(3_000));
        for body in sst.bodies().iter().skip(1) {
            assert_eq!(body[0], 0x01);
            assert_eq!((body.len() - 1) % 2, 0);
        }
    }

    #[test]
    fn test_encoded_string_compression() {
        let latin = EncodedString::new("café");
        assert!(!latin.wide);
        assert_eq!(latin.bytes.len(), 4);

        let wide = EncodedString::new("状态");
        assert!(wide.wide);
        assert_eq!(wide.units, 2);
        assert_eq!(wide.bytes.len(), 4);
    }

    #[test]
    fn test_boundsheet_points_at_worksheet_bof() {
        let mut sink = XlsSink::new();
        sink.write_cell(0, 0, "Name").unwrap();
        sink.write_cell(1, 0, "Ann").unwrap();

        let offset = sink.globals(0).len();
        let globals = sink.globals(offset as u32);
        assert_eq!(globals.len(), offset);

        let mut stream = globals;
        stream.extend_from_slice(&sink.worksheet());
        let sheet_bof = u16::from_le_bytes([stream[offset], stream[offset + 1]]);
        let substream = u16::from_le_bytes([stream[offset + 6], stream[offset + 7]]);
        assert_eq!(sheet_bof, BOF);
        assert_eq!(substream, BOF_WORKSHEET);

        let ids: Vec<u16> = records(&stream).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids.iter().filter(|&&id| id == LABELSST).count(), 2);
        assert_eq!(ids.iter().filter(|&&id| id == XF).count(), 17);
    }

    #[test]
    fn test_limits_are_enforced() {
        let mut sink = XlsSink::new();
        assert!(sink.write_cell(65_536, 0, "x").is_err());
        assert!(sink.write_cell(0, 256, "x").is_err());
        assert!(sink.write_cell(65_535, 255, "x").is_ok());
    }

    #[test]
    fn test_finish_produces_compound_file() {
        let mut sink = Box::new(XlsSink::new());
        sink.write_cell(0, 0, "Name").unwrap();
        let bytes = sink.finish().unwrap();
        // CFB signature
        assert_eq!(&bytes[..8], &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
    }

    #[test]
    fn test_compound_file_is_version_3() {
        let mut sink = Box::new(XlsSink::new());
        sink.write_cell(0, 0, "Name").unwrap();
        let bytes = sink.finish().unwrap();
        // major version at 0x1A, sector shift at 0x1E
        assert_eq!(u16::from_le_bytes([bytes[0x1A], bytes[0x1B]]), 3);
        assert_eq!(u16::from_le_bytes([bytes[0x1E], bytes[0x1F]]), 9);
        assert_eq!(bytes.len() % 512, 0);
    }
}
