//! Error types for the page client and table extraction.

/// Errors that can occur when fetching the source page or locating its tables.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The page returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// None of the anchors for a table were present in the page.
    #[error("Could not locate the {table} table")]
    TableNotFound { table: &'static str },
    /// The located table could not be scanned.
    #[error("parse error: {0}")]
    Parse(String),
}
