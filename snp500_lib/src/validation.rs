//! Validation of user-supplied dates and years.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::Snp500Error;
use crate::history::DEFAULT_QUERY_DATE;

/// The index took its 500-stock form in 1957.
pub const FIRST_INDEX_YEAR: i32 = 1957;

/// Validate a date in YYYY-MM-DD form.
pub fn validate_date(input: &str) -> Result<NaiveDate, Snp500Error> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Snp500Error::InvalidInput(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2015-09-15)",
            trimmed
        ))
    })
}

/// Validate an optional query date, falling back to [`DEFAULT_QUERY_DATE`].
pub fn validate_query_date(input: Option<&str>) -> Result<NaiveDate, Snp500Error> {
    match input {
        Some(value) => validate_date(value),
        None => Ok(DEFAULT_QUERY_DATE),
    }
}

/// Validate that `from` is not after `to`.
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> Result<(), Snp500Error> {
    if from > to {
        return Err(Snp500Error::InvalidInput(format!(
            "start date {} is after end date {}",
            from, to
        )));
    }
    Ok(())
}

/// Validate a benchmark year: between 1957 and the current year.
pub fn validate_year(year: i32) -> Result<i32, Snp500Error> {
    let current = Utc::now().date_naive().year();
    if !(FIRST_INDEX_YEAR..=current).contains(&year) {
        return Err(Snp500Error::InvalidInput(format!(
            "year must be between {} and {}, got {}",
            FIRST_INDEX_YEAR, current, year
        )));
    }
    Ok(year)
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
