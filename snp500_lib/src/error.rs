//! Error types for the library layer.

use std::fmt;

use chrono::NaiveDate;

use crate::benchmark::BenchmarkError;
use crate::change_log::ChangeRecord;
use crate::corrections::CorrectionsError;

/// The source page does not have the shape the normalizer expects.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceFormatError {
    #[error("could not locate the {table} table")]
    TableNotFound { table: &'static str },
    #[error("the {table} table has no data rows")]
    EmptyTable { table: &'static str },
    #[error("change row {row} has no date and no earlier row to inherit one from")]
    MissingLeadingDate { row: usize },
    #[error("change row {row} has {cells} cells, expected at least 4")]
    ShortRow { row: usize, cells: usize },
    #[error("change row {row} has an unparseable date '{value}'")]
    UnparseableDate { row: usize, value: String },
    #[error("markup error: {0}")]
    Markup(String),
}

/// Whether a symbol was expected in or out of the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Present,
    Absent,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Where in the pipeline a post-condition was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reconcile,
    Reconstruct(NaiveDate),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconcile => write!(f, "baseline reconciliation"),
            Self::Reconstruct(date) => write!(f, "reconstruction for {}", date),
        }
    }
}

/// A reconciled or reconstructed set broke a presence/absence post-condition
/// that no correction accounts for.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{stage}: expected {symbol} to be {expectation} after the {} change (added '{}', removed '{}')",
    .record.effective_date,
    .record.added,
    .record.removed
)]
pub struct InvariantViolation {
    pub stage: Stage,
    pub symbol: String,
    pub expectation: Expectation,
    pub record: ChangeRecord,
}

/// Errors produced by the library layer, wrapping page client errors and
/// adding source-format, invariant, correction and input failures.
#[derive(Debug)]
pub enum Snp500Error {
    /// Fetching the constituents page failed.
    Fetch(snp500_api::Error),
    /// The page content could not be turned into tables or change records.
    SourceFormat(SourceFormatError),
    /// A post-condition of reconciliation or reconstruction failed.
    Invariant(InvariantViolation),
    /// The correction table could not be loaded.
    Corrections(CorrectionsError),
    /// The benchmark snapshot could not be read.
    Benchmark(BenchmarkError),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for Snp500Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {}", e),
            Self::SourceFormat(e) => write!(f, "Source format error: {}", e),
            Self::Invariant(e) => write!(f, "Invariant violation: {}", e),
            Self::Corrections(e) => write!(f, "Corrections error: {}", e),
            Self::Benchmark(e) => write!(f, "Benchmark error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for Snp500Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::SourceFormat(e) => Some(e),
            Self::Invariant(e) => Some(e),
            Self::Corrections(e) => Some(e),
            Self::Benchmark(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<snp500_api::Error> for Snp500Error {
    fn from(e: snp500_api::Error) -> Self {
        match e {
            snp500_api::Error::TableNotFound { table } => {
                Self::SourceFormat(SourceFormatError::TableNotFound { table })
            }
            snp500_api::Error::Parse(msg) => Self::SourceFormat(SourceFormatError::Markup(msg)),
            other => Self::Fetch(other),
        }
    }
}

impl From<SourceFormatError> for Snp500Error {
    fn from(e: SourceFormatError) -> Self {
        Self::SourceFormat(e)
    }
}

impl From<InvariantViolation> for Snp500Error {
    fn from(e: InvariantViolation) -> Self {
        Self::Invariant(e)
    }
}

impl From<CorrectionsError> for Snp500Error {
    fn from(e: CorrectionsError) -> Self {
        Self::Corrections(e)
    }
}

impl From<BenchmarkError> for Snp500Error {
    fn from(e: BenchmarkError) -> Self {
        Self::Benchmark(e)
    }
}
