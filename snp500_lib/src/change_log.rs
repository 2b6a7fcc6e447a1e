//! Normalization of the raw change-history and constituents tables.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::error::SourceFormatError;

/// Accepted spellings of the effective-date cell.
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%Y-%m-%d"];

/// One dated membership change.
///
/// At least one of `added`/`removed` is non-empty and they never name the
/// same symbol. An empty `removed` is a pure addition, an empty `added` a
/// pure removal, anything else a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub effective_date: NaiveDate,
    pub added: String,
    pub removed: String,
}

impl ChangeRecord {
    pub fn new(effective_date: NaiveDate, added: &str, removed: &str) -> Self {
        Self {
            effective_date,
            added: added.to_string(),
            removed: removed.to_string(),
        }
    }

    /// The non-empty symbols this change touches.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        [self.added.as_str(), self.removed.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
    }
}

/// Converts change-history data rows (header rows already stripped) into
/// change records, newest first as the page lists them.
///
/// Rows whose first cell carries no 4-digit year share the date of the row
/// above; their cells start at the added ticker. The logical row is
/// `[date, added, added_name, removed, ...]`.
pub fn normalize_changes(rows: &[Vec<String>]) -> Result<Vec<ChangeRecord>, SourceFormatError> {
    let year_token = Regex::new(r"\b\d{4}\b")
        .map_err(|e| SourceFormatError::Markup(format!("regex compile error: {}", e)))?;

    let mut records = Vec::with_capacity(rows.len());
    let mut previous_date: Option<NaiveDate> = None;

    for (row, cells) in rows.iter().enumerate() {
        let first = cells.first().map(|c| c.trim()).unwrap_or("");
        let (date, rest) = if year_token.is_match(first) {
            let date = parse_change_date(first).ok_or_else(|| {
                SourceFormatError::UnparseableDate {
                    row,
                    value: first.to_string(),
                }
            })?;
            (date, &cells[1..])
        } else {
            let date = previous_date.ok_or(SourceFormatError::MissingLeadingDate { row })?;
            (date, &cells[..])
        };

        if rest.len() < 3 {
            return Err(SourceFormatError::ShortRow {
                row,
                cells: rest.len() + 1,
            });
        }

        if let Some(prev) = previous_date {
            if date > prev {
                tracing::warn!(
                    "Change row {} ({}) is newer than the row above it ({})",
                    row,
                    date,
                    prev
                );
            }
        }
        previous_date = Some(date);

        let added = rest[0].trim();
        let removed = rest[2].trim();
        if added.is_empty() && removed.is_empty() {
            tracing::debug!("Skipping change row {} on {}: no symbols", row, date);
            continue;
        }
        if added == removed {
            tracing::debug!("Skipping change row {} on {}: {} -> {}", row, date, added, removed);
            continue;
        }
        records.push(ChangeRecord::new(date, added, removed));
    }

    Ok(records)
}

/// Parses an effective-date cell in any of the page's date spellings.
pub fn parse_change_date(cell: &str) -> Option<NaiveDate> {
    let trimmed = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Collects the published constituents from data rows (header row already
/// stripped): the first non-empty cell of each row is its ticker.
pub fn parse_current_members(rows: &[Vec<String>]) -> Result<BTreeSet<String>, SourceFormatError> {
    let members: BTreeSet<String> = rows
        .iter()
        .filter_map(|cells| {
            cells
                .iter()
                .map(|c| c.trim())
                .find(|c| !c.is_empty())
                .map(str::to_string)
        })
        .collect();

    if members.is_empty() {
        return Err(SourceFormatError::EmptyTable {
            table: "current membership",
        });
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_dated_rows() {
        let rows = vec![row(&["March 30, 2016", "GPN", "Global Payments", "ESV", "Ensco", "Cap change"])];
        let records = normalize_changes(&rows).unwrap();
        assert_eq!(records, vec![ChangeRecord::new(date("2016-03-30"), "GPN", "ESV")]);
    }

    #[test]
    fn inherits_date_for_rowspan_rows() {
        let rows = vec![
            row(&["March 18, 2016", "FTV", "Fortive", "", "", "Spin-off"]),
            row(&["WLTW", "Willis Towers Watson", "ADT", "The ADT Corp", "Acquired"]),
        ];
        let records = normalize_changes(&rows).unwrap();
        assert_eq!(
            records,
            vec![
                ChangeRecord::new(date("2016-03-18"), "FTV", ""),
                ChangeRecord::new(date("2016-03-18"), "WLTW", "ADT"),
            ]
        );
    }

    #[test]
    fn first_row_without_date_is_an_error() {
        let rows = vec![row(&["WLTW", "Willis Towers Watson", "ADT", "The ADT Corp"])];
        assert_eq!(
            normalize_changes(&rows).unwrap_err(),
            SourceFormatError::MissingLeadingDate { row: 0 }
        );
    }

    #[test]
    fn unparseable_date_with_year_is_an_error() {
        let rows = vec![row(&["Sometime in 2016", "GPN", "Global Payments", "ESV"])];
        assert!(matches!(
            normalize_changes(&rows).unwrap_err(),
            SourceFormatError::UnparseableDate { row: 0, .. }
        ));
    }

    #[test]
    fn short_rows_are_rejected() {
        let rows = vec![row(&["March 30, 2016", "GPN", "Global Payments"])];
        assert_eq!(
            normalize_changes(&rows).unwrap_err(),
            SourceFormatError::ShortRow { row: 0, cells: 3 }
        );

        let rows = vec![
            row(&["March 30, 2016", "GPN", "Global Payments", "ESV"]),
            row(&["FTV", "Fortive"]),
        ];
        assert_eq!(
            normalize_changes(&rows).unwrap_err(),
            SourceFormatError::ShortRow { row: 1, cells: 3 }
        );
    }

    #[test]
    fn self_transitions_are_dropped() {
        let rows = vec![
            row(&["January 5, 2016", "GAS", "AGL Resources", "GAS", "AGL Resources"]),
            row(&["HPE", "Hewlett Packard Enterprise", "", ""]),
        ];
        let records = normalize_changes(&rows).unwrap();
        assert_eq!(records, vec![ChangeRecord::new(date("2016-01-05"), "HPE", "")]);
    }

    #[test]
    fn rows_without_symbols_are_dropped() {
        let rows = vec![row(&["June 1, 2016", "", "", "", "", "Note only"])];
        assert!(normalize_changes(&rows).unwrap().is_empty());
    }

    #[test]
    fn pure_removals_are_kept() {
        let rows = vec![row(&["March 23, 2015", "", "", "DNR", "Denbury Resources"])];
        let records = normalize_changes(&rows).unwrap();
        assert_eq!(records, vec![ChangeRecord::new(date("2015-03-23"), "", "DNR")]);
        assert_eq!(records[0].symbols().collect::<Vec<_>>(), vec!["DNR"]);
    }

    #[test]
    fn date_spellings() {
        assert_eq!(parse_change_date("September 2, 2015"), Some(date("2015-09-02")));
        assert_eq!(parse_change_date("Sep 2, 2015"), Some(date("2015-09-02")));
        assert_eq!(parse_change_date("2 September 2015"), Some(date("2015-09-02")));
        assert_eq!(parse_change_date("2015-09-02"), Some(date("2015-09-02")));
        assert_eq!(parse_change_date("Q3 2015"), None);
    }

    #[test]
    fn current_members_take_first_non_empty_cell() {
        let rows = vec![
            row(&["MMM", "3M", "Industrials"]),
            row(&["", "BRK.B", "Berkshire Hathaway"]),
            row(&[]),
            row(&["MMM", "3M duplicate"]),
        ];
        let members = parse_current_members(&rows).unwrap();
        assert_eq!(
            members.into_iter().collect::<Vec<_>>(),
            vec!["BRK.B".to_string(), "MMM".to_string()]
        );
    }

    #[test]
    fn empty_current_table_is_an_error() {
        assert_eq!(
            parse_current_members(&[row(&[]), row(&["", " "])]).unwrap_err(),
            SourceFormatError::EmptyTable {
                table: "current membership"
            }
        );
    }
}
