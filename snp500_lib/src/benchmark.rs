//! Diagnostic comparison against an external yearly constituents snapshot.
//!
//! The snapshot is a CSV with a `Ticker` column and one column per year; a
//! non-empty cell marks membership on January 1 of that year.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::corrections::BenchmarkCorrections;
use crate::error::Snp500Error;
use crate::history::IndexHistory;

const TICKER_COLUMN: &str = "Ticker";

/// Error types for reading a benchmark snapshot.
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Failed to read benchmark CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Benchmark CSV has no '{0}' column")]
    MissingColumn(String),
}

/// Result of comparing one year of the snapshot with the reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkReport {
    pub year: i32,
    pub date: NaiveDate,
    pub snapshot_size: usize,
    pub reconstructed_size: usize,
    /// In the snapshot but not in the reconstruction.
    pub missing: Vec<String>,
    /// In the reconstruction but not in the snapshot.
    pub extra: Vec<String>,
}

impl BenchmarkReport {
    pub fn matches(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// The snapshot CSV held in memory.
pub struct SnapshotTable {
    headers: csv::StringRecord,
    rows: Vec<csv::StringRecord>,
}

impl SnapshotTable {
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, BenchmarkError> {
        Self::collect(csv::ReaderBuilder::new().flexible(true).from_reader(reader))
    }

    pub fn from_path(path: &Path) -> Result<Self, BenchmarkError> {
        Self::collect(csv::ReaderBuilder::new().flexible(true).from_path(path)?)
    }

    fn collect<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Self, BenchmarkError> {
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Result<usize, BenchmarkError> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| BenchmarkError::MissingColumn(name.to_string()))
    }

    /// Snapshot members on January 1 of `year`, with the benchmark
    /// corrections applied and symbols canonicalized.
    pub fn members(
        &self,
        year: i32,
        date: NaiveDate,
        corrections: &BenchmarkCorrections,
    ) -> Result<BTreeSet<String>, BenchmarkError> {
        let ticker_col = self.column(TICKER_COLUMN)?;
        let year_col = self.column(&year.to_string())?;

        let mut members: Vec<String> = self
            .rows
            .iter()
            .filter(|row| row.get(year_col).is_some_and(|cell| !cell.trim().is_empty()))
            .filter_map(|row| row.get(ticker_col))
            .map(|ticker| ticker.trim().to_string())
            .filter(|ticker| !ticker.is_empty())
            .collect();
        members.extend(corrections.extra_symbols.iter().cloned());

        for rename in &corrections.renames {
            if rename.before.map_or(true, |cutoff| date < cutoff) {
                for member in members.iter_mut() {
                    if *member == rename.from {
                        *member = rename.to.clone();
                    }
                }
            }
        }

        Ok(members.iter().map(|m| canonical_symbol(m)).collect())
    }
}

/// Share-class separators differ between sources (`BRK.B` vs `BRK-B`).
fn canonical_symbol(symbol: &str) -> String {
    symbol.replace('.', "-")
}

/// Compares the reconstruction on January 1 of each year with the snapshot.
pub fn benchmark(
    history: &IndexHistory,
    csv_path: &Path,
    years: &[i32],
) -> Result<Vec<BenchmarkReport>, Snp500Error> {
    let snapshot = SnapshotTable::from_path(csv_path)?;
    years
        .iter()
        .map(|&year| compare_year(history, &snapshot, year))
        .collect()
}

/// Compares one year of an already-loaded snapshot.
pub fn compare_year(
    history: &IndexHistory,
    snapshot: &SnapshotTable,
    year: i32,
) -> Result<BenchmarkReport, Snp500Error> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| Snp500Error::InvalidInput(format!("invalid benchmark year {}", year)))?;
    let expected = snapshot.members(year, date, history.corrections().benchmark())?;
    let reconstructed: BTreeSet<String> = history
        .membership_at(date)?
        .iter()
        .map(|m| canonical_symbol(m))
        .collect();

    let report = BenchmarkReport {
        year,
        date,
        snapshot_size: expected.len(),
        reconstructed_size: reconstructed.len(),
        missing: expected.difference(&reconstructed).cloned().collect(),
        extra: reconstructed.difference(&expected).cloned().collect(),
    };
    tracing::info!(
        "Benchmark {}: {} snapshot vs {} reconstructed, {} missing, {} extra",
        year,
        report.snapshot_size,
        report.reconstructed_size,
        report.missing.len(),
        report.extra.len()
    );
    Ok(report)
}
