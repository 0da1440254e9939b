//! Legacy tab-comma text export
//!
//! Older consumers of these exports expect a hand-built text blob instead of
//! a real CSV file: a UTF-8 BOM, every field followed by `"\t ,"`, rows
//! separated by `\n`. The tab keeps spreadsheet viewers from reading IDs as
//! numbers. Prefer [`SheetExporter::encode`] with `ExportFormat::Csv`.

use super::SheetExporter;
use crate::error::SheetIoResult;
use crate::types::Row;

const BOM: &str = "\u{FEFF}";
const FIELD_END: &str = "\t ,";

/// Render rows in the legacy text layout
pub fn encode(exporter: &SheetExporter, rows: &[Row]) -> SheetIoResult<Vec<u8>> {
    let mut out = String::from(BOM);
    for label in exporter.labels() {
        out.push_str(label);
        out.push_str(FIELD_END);
    }
    out.push('\n');

    let batch_size = exporter.options().batch_size.max(1);
    let mut lines = Vec::with_capacity(rows.len());
    for batch in rows.chunks(batch_size) {
        for row in batch {
            let mut line = String::new();
            for value in exporter.render_row(row)? {
                line.push_str(&strip_line_breaks(&value));
                line.push_str(FIELD_END);
            }
            lines.push(line);
        }
    }
    out.push_str(&lines.join("\n"));

    Ok(out.into_bytes())
}

fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|&c| c != '\n' && c != '\r').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn exporter() -> SheetExporter {
        SheetExporter::new(&[
            ("Name".to_string(), "name".to_string()),
            (
                "Status(radio):1=On,0=Off".to_string(),
                "status".to_string(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_legacy_layout() {
        let rows: Vec<Row> = serde_json::from_value(json!([
            {"name": "Ann", "status": "1"},
            {"name": "Bob\nSmith", "status": "0"}
        ]))
        .unwrap();

        let text = String::from_utf8(encode(&exporter(), &rows).unwrap()).unwrap();
        assert_eq!(
            text,
            "\u{FEFF}Name\t ,Status\t ,\nAnn\t ,On\t ,\nBobSmith\t ,Off\t ,"
        );
    }

    #[test]
    fn test_legacy_header_only() {
        let text = String::from_utf8(encode(&exporter(), &[]).unwrap()).unwrap();
        assert_eq!(text, "\u{FEFF}Name\t ,Status\t ,\n");
    }
}
