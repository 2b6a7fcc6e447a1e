mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use snp500_lib::{IndexHistory, SourceConfig};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "snp500")]
#[command(about = "Reconstruct historical S&P 500 membership from the Wikipedia change log")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Log every reconciliation and replay step
    #[arg(long, global = true)]
    verbose: bool,

    /// Constituents page URL (overrides SNP500_SOURCE_URL)
    #[arg(long, global = true)]
    source_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show index membership on a date
    Members(commands::members::MembersArgs),
    /// List the normalized change log
    Changes(commands::changes::ChangesArgs),
    /// Show symbols that entered or left the index between two dates
    Diff(commands::diff::DiffArgs),
    /// Compare reconstructed membership with a yearly constituents CSV
    Benchmark(commands::benchmark::BenchmarkArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("snp500=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let mut config = SourceConfig::from_env();
    if let Some(url) = &cli.source_url {
        config = config.with_page_url(url);
    }
    let history = IndexHistory::open_with(&config, cli.verbose).await?;

    match &cli.command {
        Commands::Members(args) => commands::members::run(args, &history, &format)?,
        Commands::Changes(args) => commands::changes::run(args, &history, &format)?,
        Commands::Diff(args) => commands::diff::run(args, &history, &format)?,
        Commands::Benchmark(args) => commands::benchmark::run(args, &history, &format)?,
    }

    Ok(())
}
