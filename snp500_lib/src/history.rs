//! The immutable membership-history snapshot and its date queries.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use snp500_api::{extract_source_tables, SourceTables};

use crate::change_log::{normalize_changes, parse_current_members, ChangeRecord};
use crate::corrections::{load_corrections, CorrectionTable};
use crate::error::{Snp500Error, SourceFormatError};
use crate::reconcile::reconcile_baseline;
use crate::reconstruct::reconstruct;
use crate::source::{fetch_with_retry, SourceConfig};

/// Query date used when none is given.
pub const DEFAULT_QUERY_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2015, 9, 15) {
    Some(date) => date,
    None => panic!("invalid default query date"),
};

/// Leading rows of the constituents table that are headers.
const CURRENT_HEADER_ROWS: usize = 1;
/// Leading rows of the change table that are headers (group row + column row).
const CHANGE_HEADER_ROWS: usize = 2;

/// Logs a replay step at `info` in verbose mode, `debug` otherwise.
pub(crate) fn log_step(verbose: bool, message: fmt::Arguments<'_>) {
    if verbose {
        tracing::info!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}

/// Symbols that entered and left the index between two dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipDiff {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Present on `to` but not on `from`.
    pub entered: Vec<String>,
    /// Present on `from` but not on `to`.
    pub left: Vec<String>,
}

/// Reconciled baseline plus normalized change log, fetched and derived once.
///
/// Nothing is mutated after construction; every query works on its own copy
/// of the baseline.
#[derive(Debug, Clone)]
pub struct IndexHistory {
    baseline: BTreeSet<String>,
    changes: Vec<ChangeRecord>,
    corrections: CorrectionTable,
    verbose: bool,
}

impl IndexHistory {
    /// Fetches the constituents page (configured from the environment) and
    /// builds the snapshot.
    pub async fn open(verbose: bool) -> Result<Self, Snp500Error> {
        Self::open_with(&SourceConfig::from_env(), verbose).await
    }

    /// Fetches the page described by `config` and builds the snapshot.
    pub async fn open_with(config: &SourceConfig, verbose: bool) -> Result<Self, Snp500Error> {
        let html = fetch_with_retry(config).await?;
        Self::from_html(&html, verbose)
    }

    /// Builds the snapshot from already-fetched page HTML, using the embedded
    /// correction table.
    pub fn from_html(html: &str, verbose: bool) -> Result<Self, Snp500Error> {
        let tables = extract_source_tables(html)?;
        let corrections = load_corrections()?;
        Self::from_tables(&tables, corrections, verbose)
    }

    /// Builds the snapshot from raw tables whose header rows are still present.
    pub fn from_tables(
        tables: &SourceTables,
        corrections: CorrectionTable,
        verbose: bool,
    ) -> Result<Self, Snp500Error> {
        let change_rows = tables.changes.rows.get(CHANGE_HEADER_ROWS..).unwrap_or(&[]);
        let changes = normalize_changes(change_rows)?;
        if changes.is_empty() {
            return Err(SourceFormatError::EmptyTable {
                table: "change history",
            }
            .into());
        }

        let current_rows = tables.current.rows.get(CURRENT_HEADER_ROWS..).unwrap_or(&[]);
        let mut baseline = parse_current_members(current_rows)?;
        reconcile_baseline(&mut baseline, &changes, &corrections, verbose)?;

        tracing::info!(
            "Loaded {} current members and {} change records ({} to {})",
            baseline.len(),
            changes.len(),
            changes[changes.len() - 1].effective_date,
            changes[0].effective_date
        );

        Ok(Self {
            baseline,
            changes,
            corrections,
            verbose,
        })
    }

    /// Index membership on `date`, sorted ascending.
    pub fn membership_at(&self, date: NaiveDate) -> Result<Vec<String>, Snp500Error> {
        let members = reconstruct(
            &self.baseline,
            &self.changes,
            &self.corrections,
            date,
            self.verbose,
        )?;
        tracing::debug!("{} members on {}", members.len(), date);
        Ok(members)
    }

    /// The reconciled baseline.
    pub fn baseline(&self) -> &BTreeSet<String> {
        &self.baseline
    }

    /// Normalized change records, newest first.
    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    pub fn corrections(&self) -> &CorrectionTable {
        &self.corrections
    }

    /// First date whose membership is the baseline: the day after the newest
    /// change, since a change effective on a date is undone for that date.
    pub fn baseline_date(&self) -> Option<NaiveDate> {
        self.changes
            .iter()
            .map(|r| r.effective_date)
            .max()
            .and_then(|newest| newest.checked_add_days(Days::new(1)))
    }

    /// Records undone for a query on `from` but not for one on `to`
    /// (`from <= effective_date < to`), newest first.
    pub fn changes_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&ChangeRecord> {
        self.changes
            .iter()
            .filter(|r| from <= r.effective_date && r.effective_date < to)
            .collect()
    }

    /// Symbols entering and leaving the index between `from` and `to`.
    pub fn diff(&self, from: NaiveDate, to: NaiveDate) -> Result<MembershipDiff, Snp500Error> {
        let before: BTreeSet<String> = self.membership_at(from)?.into_iter().collect();
        let after: BTreeSet<String> = self.membership_at(to)?.into_iter().collect();
        Ok(MembershipDiff {
            from: Some(from),
            to: Some(to),
            entered: after.difference(&before).cloned().collect(),
            left: before.difference(&after).cloned().collect(),
        })
    }
}
