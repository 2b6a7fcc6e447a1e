//! Extraction of the constituents and change-history tables from page HTML.
//!
//! The page is scanned with plain string search and a handful of regexes, the
//! same way the rest of the scraping code treats markup: locate an anchor,
//! balance the enclosing element, then pull out rows and cells.

use regex::{Captures, Regex};

use crate::Error;

/// Which of the two source tables to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// The currently published constituents (one ticker per row).
    Current,
    /// The dated history of additions and removals.
    Changes,
}

impl TableKind {
    /// Element ids that mark the table, newest page layout first.
    fn anchors(self) -> &'static [&'static str] {
        match self {
            Self::Current => &[
                "constituents",
                "S&P_500_component_stocks",
                "S.26P_500_Component_Stocks",
            ],
            Self::Changes => &[
                "changes",
                "Selected_changes_to_the_list_of_S&P_500_components",
                "Recent_and_announced_changes_to_the_list_of_S.26P_500_Components",
            ],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Current => "current membership",
            Self::Changes => "change history",
        }
    }
}

/// A table as rows of cleaned `<td>` cell text.
///
/// Header rows built from `<th>` cells come through as empty rows, so row
/// positions match the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Both raw tables the core needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTables {
    pub current: RawTable,
    pub changes: RawTable,
}

struct Patterns {
    row_start: Regex,
    cell_start: Regex,
    sup: Regex,
    tag: Regex,
    entity: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, Error> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Parse(format!("regex compile error: {}", e)))
        };
        Ok(Self {
            row_start: compile(r"<tr[\s>]")?,
            cell_start: compile(r"<td[\s>]")?,
            sup: compile(r"(?s)<sup\b[^>]*>.*?</sup>")?,
            tag: compile(r"<[^>]*>")?,
            entity: compile(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);")?,
        })
    }
}

/// Extracts the current-membership and change-history tables.
pub fn extract_source_tables(html: &str) -> Result<SourceTables, Error> {
    let patterns = Patterns::compile()?;
    Ok(SourceTables {
        current: extract_with(html, TableKind::Current, &patterns)?,
        changes: extract_with(html, TableKind::Changes, &patterns)?,
    })
}

/// Extracts a single table.
pub fn extract_table(html: &str, kind: TableKind) -> Result<RawTable, Error> {
    let patterns = Patterns::compile()?;
    extract_with(html, kind, &patterns)
}

fn extract_with(html: &str, kind: TableKind, patterns: &Patterns) -> Result<RawTable, Error> {
    let start = kind
        .anchors()
        .iter()
        .find_map(|anchor| locate_table(html, anchor))
        .ok_or(Error::TableNotFound {
            table: kind.label(),
        })?;
    let table = table_span(html, start)
        .ok_or_else(|| Error::Parse(format!("unterminated {} table", kind.label())))?;

    let rows = split_at_matches(table, &patterns.row_start)
        .into_iter()
        .map(|row| {
            split_at_matches(row, &patterns.cell_start)
                .into_iter()
                .map(|cell| clean_cell(cell_body(cell), patterns))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();

    tracing::debug!("Extracted {} rows from the {} table", rows.len(), kind.label());
    Ok(RawTable { rows })
}

/// Byte offset of the `<table` that an anchor id belongs to or precedes.
fn locate_table(html: &str, anchor: &str) -> Option<usize> {
    let escaped = anchor.replace('&', "&amp;");
    let pos = [anchor, escaped.as_str()]
        .iter()
        .find_map(|id| html.find(&format!("id=\"{}\"", id)))?;
    let tag_start = html[..pos].rfind('<')?;
    if html[tag_start..].starts_with("<table") {
        return Some(tag_start);
    }
    html[pos..].find("<table").map(|i| pos + i)
}

/// The full `<table ...>...</table>` text starting at `start`, with nested
/// tables balanced.
fn table_span(html: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut cursor = start;
    loop {
        let rest = &html[cursor..];
        let close = rest.find("</table")?;
        match rest.find("<table") {
            Some(open) if open < close => {
                depth += 1;
                cursor += open + "<table".len();
            }
            _ => {
                depth = depth.saturating_sub(1);
                cursor += close + "</table".len();
                if depth == 0 {
                    let end = html[cursor..].find('>').map(|i| cursor + i + 1)?;
                    return Some(&html[start..end]);
                }
            }
        }
    }
}

/// Splits `text` into segments that each begin at a match of `marker` and run
/// up to the next match. Text before the first match is dropped.
fn split_at_matches<'a>(text: &'a str, marker: &Regex) -> Vec<&'a str> {
    let starts: Vec<usize> = marker.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[s..end]
        })
        .collect()
}

/// Inner markup of a `<td ...>` segment, up to its closing tag.
fn cell_body(segment: &str) -> &str {
    let Some(open_end) = segment.find('>') else {
        return "";
    };
    let body = &segment[open_end + 1..];
    let end = ["</td", "</tr", "</table"]
        .iter()
        .filter_map(|close| body.find(close))
        .min()
        .unwrap_or(body.len());
    &body[..end]
}

fn clean_cell(raw: &str, patterns: &Patterns) -> String {
    let without_refs = patterns.sup.replace_all(raw, "");
    let text = patterns.tag.replace_all(&without_refs, "");
    let decoded = patterns
        .entity
        .replace_all(&text, |caps: &Captures| decode_entity(&caps[1], &caps[0]));
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(name: &str, original: &str) -> String {
    let numeric = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    if let Some(code) = numeric {
        return char::from_u32(code)
            .map(|c| if c == '\u{a0}' { ' ' } else { c })
            .map(String::from)
            .unwrap_or_else(|| original.to_string());
    }
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        _ => original,
    };
    decoded.to_string()
}
