use anyhow::Result;
use serde::Serialize;
use snp500_lib::{BenchmarkReport, ChangeRecord, MembershipDiff};
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Symbols per line in the membership grid.
const GRID_WIDTH: usize = 20;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct SymbolRow {
    #[tabled(rename = "#")]
    #[serde(rename = "#")]
    position: usize,
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
}

#[derive(Tabled, Serialize)]
struct ChangeRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Kind")]
    #[serde(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Added")]
    #[serde(rename = "Added")]
    added: String,
    #[tabled(rename = "Removed")]
    #[serde(rename = "Removed")]
    removed: String,
}

#[derive(Tabled, Serialize)]
struct DiffRow {
    #[tabled(rename = "Change")]
    #[serde(rename = "Change")]
    change: String,
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
}

#[derive(Tabled, Serialize)]
struct BenchmarkRow {
    #[tabled(rename = "Year")]
    #[serde(rename = "Year")]
    year: i32,
    #[tabled(rename = "Snapshot")]
    #[serde(rename = "Snapshot")]
    snapshot: usize,
    #[tabled(rename = "Reconstructed")]
    #[serde(rename = "Reconstructed")]
    reconstructed: usize,
    #[tabled(rename = "Missing")]
    #[serde(rename = "Missing")]
    missing: String,
    #[tabled(rename = "Extra")]
    #[serde(rename = "Extra")]
    extra: String,
}

fn change_kind(record: &ChangeRecord) -> &'static str {
    match (record.added.is_empty(), record.removed.is_empty()) {
        (false, true) => "addition",
        (true, false) => "removal",
        _ => "replacement",
    }
}

fn join_or_dash(symbols: &[String]) -> String {
    if symbols.is_empty() {
        "-".to_string()
    } else {
        symbols.join(" ")
    }
}

fn build_symbol_rows(members: &[String]) -> Vec<SymbolRow> {
    members
        .iter()
        .enumerate()
        .map(|(i, s)| SymbolRow {
            position: i + 1,
            symbol: s.clone(),
        })
        .collect()
}

fn build_change_rows(changes: &[ChangeRecord]) -> Vec<ChangeRow> {
    changes
        .iter()
        .map(|r| ChangeRow {
            date: r.effective_date.to_string(),
            kind: change_kind(r).to_string(),
            added: r.added.clone(),
            removed: r.removed.clone(),
        })
        .collect()
}

fn build_diff_rows(diff: &MembershipDiff) -> Vec<DiffRow> {
    let entered = diff.entered.iter().map(|s| DiffRow {
        change: "entered".to_string(),
        symbol: s.clone(),
    });
    let left = diff.left.iter().map(|s| DiffRow {
        change: "left".to_string(),
        symbol: s.clone(),
    });
    entered.chain(left).collect()
}

fn build_benchmark_rows(reports: &[BenchmarkReport]) -> Vec<BenchmarkRow> {
    reports
        .iter()
        .map(|r| BenchmarkRow {
            year: r.year,
            snapshot: r.snapshot_size,
            reconstructed: r.reconstructed_size,
            missing: join_or_dash(&r.missing),
            extra: join_or_dash(&r.extra),
        })
        .collect()
}

/// Lays symbols out in rows of `width`, padding the last row.
fn build_member_grid(members: &[String], width: usize) -> Table {
    let mut builder = Builder::default();
    for chunk in members.chunks(width.max(1)) {
        let mut record: Vec<String> = chunk.to_vec();
        if members.len() > width {
            record.resize(width, String::new());
        }
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table
}

// -- Table output --

pub fn print_members_table(members: &[String]) {
    println!("{}", build_member_grid(members, GRID_WIDTH));
}

pub fn print_changes_table(changes: &[ChangeRecord]) {
    println!("{}", Table::new(build_change_rows(changes)));
}

pub fn print_diff_table(diff: &MembershipDiff) {
    println!("{}", Table::new(build_diff_rows(diff)));
}

pub fn print_benchmark_table(reports: &[BenchmarkReport]) {
    println!("{}", Table::new(build_benchmark_rows(reports)));
}

// -- Markdown output --

pub fn print_members_markdown(members: &[String]) {
    let mut table = Table::new(build_symbol_rows(members));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_changes_markdown(changes: &[ChangeRecord]) {
    let mut table = Table::new(build_change_rows(changes));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_diff_markdown(diff: &MembershipDiff) {
    let mut table = Table::new(build_diff_rows(diff));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_benchmark_markdown(reports: &[BenchmarkReport]) {
    let mut table = Table::new(build_benchmark_rows(reports));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

fn write_csv<T: Serialize>(rows: Vec<T>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_members_csv(members: &[String]) -> Result<()> {
    write_csv(build_symbol_rows(members))
}

pub fn print_changes_csv(changes: &[ChangeRecord]) -> Result<()> {
    write_csv(build_change_rows(changes))
}

pub fn print_diff_csv(diff: &MembershipDiff) -> Result<()> {
    write_csv(build_diff_rows(diff))
}

pub fn print_benchmark_csv(reports: &[BenchmarkReport]) -> Result<()> {
    write_csv(build_benchmark_rows(reports))
}

// -- JSON output --

pub fn print_json<T: Serialize + ?Sized>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
