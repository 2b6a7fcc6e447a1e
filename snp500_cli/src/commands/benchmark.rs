use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use snp500_lib::{benchmark, validation, IndexHistory};

use crate::output::{
    print_benchmark_csv, print_benchmark_markdown, print_benchmark_table, print_json, OutputFormat,
};

#[derive(Args)]
pub struct BenchmarkArgs {
    /// CSV with a Ticker column and one membership column per year
    #[arg(long)]
    pub csv: PathBuf,

    /// Year to compare (January 1); repeat for several years
    #[arg(long = "year", default_value = "2012")]
    pub years: Vec<i32>,
}

pub fn run(args: &BenchmarkArgs, history: &IndexHistory, format: &OutputFormat) -> Result<()> {
    let years = args
        .years
        .iter()
        .map(|&y| validation::validate_year(y))
        .collect::<Result<Vec<_>, _>>()?;

    let reports = benchmark(history, &args.csv, &years)?;

    let matching = reports.iter().filter(|r| r.matches()).count();
    eprintln!("{} of {} years match the snapshot", matching, reports.len());

    match format {
        OutputFormat::Table => print_benchmark_table(&reports),
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Csv => print_benchmark_csv(&reports)?,
        OutputFormat::Markdown => print_benchmark_markdown(&reports),
    }

    Ok(())
}
