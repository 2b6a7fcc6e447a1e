use anyhow::Result;
use clap::Args;
use snp500_lib::{validation, IndexHistory};

use crate::output::{
    print_json, print_members_csv, print_members_markdown, print_members_table, OutputFormat,
};

#[derive(Args)]
pub struct MembersArgs {
    /// Date to reconstruct (YYYY-MM-DD); defaults to the standard query date
    #[arg(long)]
    pub date: Option<String>,
}

pub fn run(args: &MembersArgs, history: &IndexHistory, format: &OutputFormat) -> Result<()> {
    let date = validation::validate_query_date(args.date.as_deref())?;
    let members = history.membership_at(date)?;

    eprintln!("S&P 500 on {} ({} members)", date, members.len());

    match format {
        OutputFormat::Table => print_members_table(&members),
        OutputFormat::Json => print_json(&members),
        OutputFormat::Csv => print_members_csv(&members)?,
        OutputFormat::Markdown => print_members_markdown(&members),
    }

    Ok(())
}
