use anyhow::Result;
use clap::Args;
use snp500_lib::{validation, IndexHistory};

use crate::output::{print_diff_csv, print_diff_markdown, print_diff_table, print_json, OutputFormat};

#[derive(Args)]
pub struct DiffArgs {
    /// Earlier date (YYYY-MM-DD)
    #[arg(long)]
    pub from: String,

    /// Later date (YYYY-MM-DD)
    #[arg(long)]
    pub to: String,
}

pub fn run(args: &DiffArgs, history: &IndexHistory, format: &OutputFormat) -> Result<()> {
    let from = validation::validate_date(&args.from)?;
    let to = validation::validate_date(&args.to)?;
    validation::validate_date_range(from, to)?;

    let diff = history.diff(from, to)?;

    eprintln!(
        "{} entered, {} left between {} and {} ({} change records)",
        diff.entered.len(),
        diff.left.len(),
        from,
        to,
        history.changes_between(from, to).len()
    );

    match format {
        OutputFormat::Table => print_diff_table(&diff),
        OutputFormat::Json => print_json(&diff),
        OutputFormat::Csv => print_diff_csv(&diff)?,
        OutputFormat::Markdown => print_diff_markdown(&diff),
    }

    Ok(())
}
