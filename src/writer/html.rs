//! .html writer: one `<table>`, the first row as `<th>` cells

use super::{CellSink, RowAssembler};
use crate::error::SheetIoResult;

const HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">\n<title>Sheet1</title>\n</head>\n<body>\n<table border=\"1\" cellpadding=\"2\" cellspacing=\"0\">\n";
const TAIL: &str = "</table>\n</body>\n</html>\n";

pub struct HtmlSink {
    rows: RowAssembler,
    body: String,
    first_row: bool,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self {
            rows: RowAssembler::default(),
            body: String::new(),
            first_row: true,
        }
    }

    fn emit(&mut self, cells: &[String]) {
        let tag = if self.first_row { "th" } else { "td" };
        self.first_row = false;

        self.body.push_str("<tr>");
        for cell in cells {
            self.body.push('<');
            self.body.push_str(tag);
            self.body.push('>');
            escape_into(&mut self.body, cell);
            self.body.push_str("</");
            self.body.push_str(tag);
            self.body.push('>');
        }
        self.body.push_str("</tr>\n");
    }
}

impl Default for HtmlSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CellSink for HtmlSink {
    fn write_cell(&mut self, row: u32, col: u16, value: &str) -> SheetIoResult<()> {
        if let Some(cells) = self.rows.put(row, col, value)? {
            self.emit(&cells);
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> SheetIoResult<Vec<u8>> {
        if let Some(cells) = self.rows.take() {
            self.emit(&cells);
        }
        let mut html = String::with_capacity(HEAD.len() + self.body.len() + TAIL.len());
        html.push_str(HEAD);
        html.push_str(&self.body);
        html.push_str(TAIL);
        Ok(html.into_bytes())
    }
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_table_rows() {
        let mut sink = Box::new(HtmlSink::new());
        sink.write_cell(0, 0, "Name").unwrap();
        sink.write_cell(1, 0, "Ann").unwrap();
        let html = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert!(html.contains("<tr><th>Name</th></tr>"));
        assert!(html.contains("<tr><td>Ann</td></tr>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_html_escapes_markup() {
        let mut out = String::new();
        escape_into(&mut out, "<b>\"R&D\"</b>");
        assert_eq!(out, "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }
}
