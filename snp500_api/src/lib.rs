mod client;
mod errors;
mod tables;
mod user_agent;
pub use self::client::{Client, DEFAULT_PAGE_URL};
pub use self::errors::Error;
pub use self::tables::{extract_source_tables, extract_table, RawTable, SourceTables, TableKind};
pub use self::user_agent::get_user_agent;
