//! Library layer for snp500: reconstructs historical S&P 500 membership.
//!
//! Normalizes the change-history table of the constituents page, reconciles
//! the published constituents against the newest changes, and replays the
//! change log backward to any past date.

pub mod benchmark;
pub mod change_log;
pub mod corrections;
pub mod error;
pub mod history;
pub mod reconcile;
pub mod reconstruct;
pub mod source;
pub mod validation;

pub use snp500_api;
pub use snp500_api::{RawTable, SourceTables};

pub use benchmark::{benchmark, BenchmarkError, BenchmarkReport};
pub use change_log::{normalize_changes, parse_current_members, ChangeRecord};
pub use corrections::{load_corrections, parse_corrections, CorrectionTable, CorrectionsError};
pub use error::{Expectation, InvariantViolation, Snp500Error, SourceFormatError, Stage};
pub use history::{IndexHistory, MembershipDiff, DEFAULT_QUERY_DATE};
pub use source::{fetch_with_retry, SourceConfig};
