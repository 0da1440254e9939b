//! Header rules: the label DSL embedded in column headers
//!
//! A header such as `Status(select):1=Active,2=Inactive` carries a display
//! label (`Status`), a choice kind (`select`) and a table translating stored
//! codes into labels. Headers without a recognized kind are plain columns.
//!
//! Rules are parsed once per export or import and then applied to every row.

use crate::error::{SheetIoError, SheetIoResult};
use crate::field::{FieldPath, SENTINEL};
use crate::types::{HeaderSpec, UnmappedCode};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Choice kinds that make a header carry a code table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceKind {
    Select,
    Selects,
    Radio,
    Checkbox,
    Switch,
}

impl ChoiceKind {
    /// Longest tag first, so `(selects)` is removed before `(select)` can split it
    const STRIP_ORDER: [ChoiceKind; 5] = [
        ChoiceKind::Selects,
        ChoiceKind::Checkbox,
        ChoiceKind::Select,
        ChoiceKind::Switch,
        ChoiceKind::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceKind::Select => "select",
            ChoiceKind::Selects => "selects",
            ChoiceKind::Radio => "radio",
            ChoiceKind::Checkbox => "checkbox",
            ChoiceKind::Switch => "switch",
        }
    }
}

impl FromStr for ChoiceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(ChoiceKind::Select),
            "selects" => Ok(ChoiceKind::Selects),
            "radio" => Ok(ChoiceKind::Radio),
            "checkbox" => Ok(ChoiceKind::Checkbox),
            "switch" => Ok(ChoiceKind::Switch),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ChoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How values in a column are rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFormat {
    /// Values are written as resolved
    Plain,
    /// Values are comma-separated codes translated through `codes`
    Coded {
        kind: ChoiceKind,
        codes: HashMap<String, String>,
    },
}

/// A parsed column header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRule {
    pub label: String,
    pub format: ColumnFormat,
    pub field: FieldPath,
}

impl HeaderRule {
    /// Parse a raw header label and its field path
    pub fn parse(raw: &str, field: &str) -> SheetIoResult<Self> {
        let field = FieldPath::parse(field)?;

        // First parenthesized group, non-greedy
        let tag_pattern = Regex::new(r"\(([\s\S]*?)\)")
            .map_err(|e| SheetIoError::InvalidInput(format!("Regex error: {}", e)))?;
        let kind = tag_pattern
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|tag| tag.as_str().trim().parse::<ChoiceKind>().ok());

        let Some(kind) = kind else {
            return Ok(Self {
                label: plain_label(raw),
                format: ColumnFormat::Plain,
                field,
            });
        };

        let mut parts = raw.split(':');
        let head = parts.next().unwrap_or_default();
        let codes = parts.next().map(parse_code_list).unwrap_or_default();

        let mut label = head.to_string();
        for tag in ChoiceKind::STRIP_ORDER {
            label = label.replace(&format!("({})", tag), "");
        }

        Ok(Self {
            label: label.trim().to_string(),
            format: ColumnFormat::Coded { kind, codes },
            field,
        })
    }

    /// Parse every `(label, field)` pair in order
    pub fn parse_all(specs: &[HeaderSpec]) -> SheetIoResult<Vec<Self>> {
        specs
            .iter()
            .map(|(raw, field)| Self::parse(raw, field))
            .collect()
    }

    /// The code table, empty for plain columns
    pub fn codes(&self) -> Option<&HashMap<String, String>> {
        match &self.format {
            ColumnFormat::Coded { codes, .. } => Some(codes),
            ColumnFormat::Plain => None,
        }
    }

    pub fn kind(&self) -> Option<ChoiceKind> {
        match &self.format {
            ColumnFormat::Coded { kind, .. } => Some(*kind),
            ColumnFormat::Plain => None,
        }
    }

    /// Translate a (trimmed) value through the code table.
    /// Empty values and the missing-value sentinel are not codes and pass through.
    pub fn format(&self, value: &str, policy: UnmappedCode) -> SheetIoResult<String> {
        let codes = match self.codes() {
            Some(codes) if !codes.is_empty() => codes,
            _ => return Ok(value.to_string()),
        };
        if value.is_empty() || value == SENTINEL {
            return Ok(value.to_string());
        }

        let mut segments = Vec::new();
        for code in value.split(',') {
            match codes.get(code) {
                Some(label) => segments.push(label.as_str()),
                None => match policy {
                    UnmappedCode::Fail => {
                        return Err(SheetIoError::UnmappedCode {
                            column: self.label.clone(),
                            code: code.to_string(),
                        })
                    }
                    UnmappedCode::Blank => {
                        tracing::warn!(column = %self.label, code, "unmapped code left blank");
                        segments.push("");
                    }
                    UnmappedCode::Passthrough => {
                        tracing::warn!(column = %self.label, code, "unmapped code kept as-is");
                        segments.push(code);
                    }
                },
            }
        }

        let joined = segments.join(",");
        if joined.is_empty() {
            Ok(value.to_string())
        } else {
            Ok(joined)
        }
    }

    /// Reverse lookup: turn a rendered cell back into its codes.
    /// Segments that match no label are returned untouched.
    pub fn decode(&self, rendered: &str) -> String {
        let codes = match self.codes() {
            Some(codes) if !codes.is_empty() => codes,
            _ => return rendered.to_string(),
        };

        rendered
            .split(',')
            .map(|segment| {
                codes
                    .iter()
                    .find(|(_, label)| label.as_str() == segment)
                    .map(|(code, _)| code.as_str())
                    .unwrap_or(segment)
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// `code=label,code=label`; entries without `=` are skipped
fn parse_code_list(list: &str) -> HashMap<String, String> {
    let mut codes = HashMap::new();
    for entry in list.split(',') {
        let mut pieces = entry.split('=');
        if let (Some(code), Some(label)) = (pieces.next(), pieces.next()) {
            codes.insert(code.trim().to_string(), label.trim().to_string());
        }
    }
    codes
}

/// Plain headers keep their full text, minus a dangling `:`
fn plain_label(raw: &str) -> String {
    raw.strip_suffix(':').unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(raw: &str) -> HeaderRule {
        HeaderRule::parse(raw, "status").unwrap()
    }

    #[test]
    fn test_parse_select_rule() {
        let r = rule("Status(select):1=Active,2=Inactive");
        assert_eq!(r.label, "Status");
        assert_eq!(r.kind(), Some(ChoiceKind::Select));
        let codes = r.codes().unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes["1"], "Active");
        assert_eq!(codes["2"], "Inactive");
    }

    #[test]
    fn test_parse_every_kind() {
        for kind in ["select", "selects", "radio", "checkbox", "switch"] {
            let r = rule(&format!("Flag({}):0=No,1=Yes", kind));
            assert_eq!(r.label, "Flag", "label for {}", kind);
            assert_eq!(r.kind().unwrap().as_str(), kind);
            assert_eq!(r.codes().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_selects_tag_is_not_split_by_select() {
        let r = rule("Tags(selects):a=Alpha");
        assert_eq!(r.label, "Tags");
    }

    #[test]
    fn test_tag_with_spaces_inside_parens() {
        let r = rule("Mode( radio ):a=Auto");
        assert_eq!(r.kind(), Some(ChoiceKind::Radio));
        assert_eq!(r.codes().unwrap()["a"], "Auto");
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let r = rule("Status(select):1=Active,broken,2 = Inactive ,=Empty");
        let codes = r.codes().unwrap();
        assert_eq!(codes.len(), 3);
        assert_eq!(codes["2"], "Inactive");
        assert_eq!(codes[""], "Empty");
        assert!(!codes.contains_key("broken"));
    }

    #[test]
    fn test_later_duplicate_code_wins() {
        let r = rule("Status(select):1=Old,1=New");
        assert_eq!(r.codes().unwrap()["1"], "New");
    }

    #[test]
    fn test_recognized_tag_without_mapping() {
        let r = rule("Enabled(switch)");
        assert_eq!(r.label, "Enabled");
        assert!(r.codes().unwrap().is_empty());
        assert_eq!(r.format("1", UnmappedCode::Fail).unwrap(), "1");
    }

    #[test]
    fn test_plain_header_keeps_full_text() {
        let r = rule("Created at: UTC");
        assert_eq!(r.label, "Created at: UTC");
        assert_eq!(r.format, ColumnFormat::Plain);
    }

    #[test]
    fn test_plain_header_trailing_colon_stripped() {
        assert_eq!(rule("Name:").label, "Name");
    }

    #[test]
    fn test_unknown_tag_is_plain() {
        let r = rule("Price(usd):1=One");
        assert_eq!(r.format, ColumnFormat::Plain);
        assert_eq!(r.label, "Price(usd):1=One");
    }

    #[test]
    fn test_invalid_field_path_rejected() {
        assert!(matches!(
            HeaderRule::parse("Deep", "a.b.c"),
            Err(SheetIoError::InvalidFieldPath(_))
        ));
    }

    #[test]
    fn test_format_translates_codes_in_order() {
        let r = rule("Status(select):1=Active,2=Inactive");
        assert_eq!(
            r.format("1,2", UnmappedCode::Fail).unwrap(),
            "Active,Inactive"
        );
        assert_eq!(
            r.format("2,1", UnmappedCode::Fail).unwrap(),
            "Inactive,Active"
        );
    }

    #[test]
    fn test_format_plain_is_identity() {
        let r = rule("Name");
        for value in ["", "-", "1,2", "hello world"] {
            assert_eq!(r.format(value, UnmappedCode::Fail).unwrap(), value);
        }
    }

    #[test]
    fn test_format_unmapped_policies() {
        let r = rule("Status(select):1=Active");

        let err = r.format("1,9", UnmappedCode::Fail).unwrap_err();
        assert!(matches!(
            err,
            SheetIoError::UnmappedCode { ref column, ref code } if column == "Status" && code == "9"
        ));

        assert_eq!(r.format("1,9", UnmappedCode::Blank).unwrap(), "Active,");
        assert_eq!(
            r.format("1,9", UnmappedCode::Passthrough).unwrap(),
            "Active,9"
        );
    }

    #[test]
    fn test_format_falls_back_when_nothing_resolves() {
        let r = rule("Status(select):1=Active");
        assert_eq!(r.format("9", UnmappedCode::Blank).unwrap(), "9");
        // a missing field renders as the sentinel
        assert_eq!(r.format("-", UnmappedCode::Blank).unwrap(), "-");
    }

    #[test]
    fn test_format_missing_and_empty_values_are_not_codes() {
        let r = rule("Status(select):1=Active");
        assert_eq!(r.format(SENTINEL, UnmappedCode::Fail).unwrap(), "-");
        assert_eq!(r.format("", UnmappedCode::Fail).unwrap(), "");
    }

    #[test]
    fn test_decode_reverses_labels() {
        let r = rule("Status(select):1=Active,2=Inactive");
        assert_eq!(r.decode("Active,Inactive"), "1,2");
        assert_eq!(r.decode("Unknown"), "Unknown");
        assert_eq!(rule("Name").decode("Active"), "Active");
    }

    #[test]
    fn test_parse_all_preserves_order() {
        let specs = vec![
            ("Name".to_string(), "name".to_string()),
            ("Age".to_string(), "meta.age".to_string()),
        ];
        let rules = HeaderRule::parse_all(&specs).unwrap();
        assert_eq!(rules[0].label, "Name");
        assert_eq!(rules[1].field.to_string(), "meta.age");
    }
}
