use anyhow::Result;
use clap::Args;
use snp500_lib::{validation, ChangeRecord, IndexHistory};

use crate::output::{
    print_changes_csv, print_changes_markdown, print_changes_table, print_json, OutputFormat,
};

#[derive(Args)]
pub struct ChangesArgs {
    /// Only changes effective on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Only changes effective on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

pub fn run(args: &ChangesArgs, history: &IndexHistory, format: &OutputFormat) -> Result<()> {
    let since = args
        .since
        .as_deref()
        .map(validation::validate_date)
        .transpose()?;
    let until = args
        .until
        .as_deref()
        .map(validation::validate_date)
        .transpose()?;
    if let (Some(since), Some(until)) = (since, until) {
        validation::validate_date_range(since, until)?;
    }

    let changes: Vec<ChangeRecord> = history
        .changes()
        .iter()
        .filter(|r| since.map_or(true, |d| r.effective_date >= d))
        .filter(|r| until.map_or(true, |d| r.effective_date <= d))
        .cloned()
        .collect();

    eprintln!(
        "{} of {} change records",
        changes.len(),
        history.changes().len()
    );

    match format {
        OutputFormat::Table => print_changes_table(&changes),
        OutputFormat::Json => print_json(&changes),
        OutputFormat::Csv => print_changes_csv(&changes)?,
        OutputFormat::Markdown => print_changes_markdown(&changes),
    }

    Ok(())
}
