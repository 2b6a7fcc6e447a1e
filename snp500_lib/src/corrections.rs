//! Manual corrections for known errors in the change-history source.
//!
//! The table is pure data: the reconciler and reconstructor consult it, it
//! has no behavior of its own beyond evaluating its date conditions.
//!
//! Follows the compile-time `include_str!` pattern: the canonical table lives
//! in `seed_data/corrections.yml` and is embedded in the binary.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Error types for correction table operations.
#[derive(Error, Debug)]
pub enum CorrectionsError {
    #[error("Failed to parse corrections YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Empty symbol in corrections file")]
    EmptySymbol,
    #[error("Duplicate relabel for added symbol: {0}")]
    DuplicateRelabel(String),
}

/// A single correction: a symbol, an optional date condition and an effect.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Correction {
    /// Put `symbol` in the working set, for all dates or only before `before`.
    Include {
        symbol: String,
        #[serde(default)]
        before: Option<NaiveDate>,
    },
    /// Take `symbol` out of the working set, for all dates or only before `before`.
    Exclude {
        symbol: String,
        #[serde(default)]
        before: Option<NaiveDate>,
    },
    /// The logged add-event for `symbol` is really an add of `to`.
    RelabelAdded { symbol: String, to: String },
    /// Replacements that add `symbol` are not checked for the replaced ticker.
    SkipPresenceCheck { symbol: String },
}

impl Correction {
    fn symbol(&self) -> &str {
        match self {
            Self::Include { symbol, .. }
            | Self::Exclude { symbol, .. }
            | Self::RelabelAdded { symbol, .. }
            | Self::SkipPresenceCheck { symbol } => symbol,
        }
    }
}

/// A date-conditioned rename applied to benchmark snapshots.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRename {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub before: Option<NaiveDate>,
}

/// Fix-ups for the external yearly snapshot used by the benchmark.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkCorrections {
    #[serde(default)]
    pub extra_symbols: Vec<String>,
    #[serde(default)]
    pub renames: Vec<BenchmarkRename>,
}

/// Top-level structure for the corrections YAML file.
#[derive(Deserialize, Debug, Default)]
pub struct CorrectionsFile {
    #[serde(default)]
    pub corrections: Vec<Correction>,
    #[serde(default)]
    pub benchmark: BenchmarkCorrections,
}

/// The parsed correction table, indexed for lookup.
#[derive(Debug, Clone, Default)]
pub struct CorrectionTable {
    /// Include/exclude entries, in file order.
    membership: Vec<Correction>,
    relabels: HashMap<String, String>,
    unchecked: HashSet<String>,
    benchmark: BenchmarkCorrections,
}

impl CorrectionTable {
    /// A table with no corrections at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Applies include/exclude entries whose condition holds for `date`.
    pub fn seed(&self, set: &mut BTreeSet<String>, date: NaiveDate) {
        for correction in &self.membership {
            match correction {
                Correction::Include { symbol, before } if holds(*before, date) => {
                    set.insert(symbol.clone());
                }
                Correction::Exclude { symbol, before } if holds(*before, date) => {
                    set.remove(symbol);
                }
                _ => {}
            }
        }
    }

    /// The symbol a logged add-event really refers to.
    pub fn relabel_added<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.relabels.get(symbol).map(String::as_str).unwrap_or(symbol)
    }

    /// True when replacements adding `symbol` skip the presence check.
    pub fn skips_presence_check(&self, symbol: &str) -> bool {
        self.unchecked.contains(symbol)
    }

    pub fn benchmark(&self) -> &BenchmarkCorrections {
        &self.benchmark
    }

    /// Symbols the include/exclude entries can touch, regardless of date.
    pub fn seeded_symbols(&self) -> impl Iterator<Item = &str> {
        self.membership.iter().map(Correction::symbol)
    }
}

/// `before: None` holds for every date; otherwise only strictly earlier dates.
fn holds(before: Option<NaiveDate>, date: NaiveDate) -> bool {
    before.map_or(true, |cutoff| date < cutoff)
}

/// Parse a correction table from YAML content.
pub fn parse_corrections(yaml_content: &str) -> Result<CorrectionTable, CorrectionsError> {
    let file: CorrectionsFile = serde_yml::from_str(yaml_content)?;

    let mut table = CorrectionTable {
        benchmark: file.benchmark,
        ..CorrectionTable::default()
    };
    for correction in file.corrections {
        if correction.symbol().trim().is_empty() {
            return Err(CorrectionsError::EmptySymbol);
        }
        match correction {
            Correction::RelabelAdded { symbol, to } => {
                if to.trim().is_empty() {
                    return Err(CorrectionsError::EmptySymbol);
                }
                if table.relabels.contains_key(&symbol) {
                    return Err(CorrectionsError::DuplicateRelabel(symbol));
                }
                table.relabels.insert(symbol, to);
            }
            Correction::SkipPresenceCheck { symbol } => {
                table.unchecked.insert(symbol);
            }
            membership => table.membership.push(membership),
        }
    }

    Ok(table)
}

/// Load the correction table from the embedded YAML file.
pub fn load_corrections() -> Result<CorrectionTable, CorrectionsError> {
    let yaml_content = include_str!("../../seed_data/corrections.yml");
    parse_corrections(yaml_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn set(symbols: &[&str]) -> BTreeSet<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_all_effects() {
        let yaml = r#"
corrections:
  - effect: include
    symbol: "OLD"
    before: "2015-07-02"
  - effect: exclude
    symbol: "NEW"
  - effect: relabel_added
    symbol: "JOYG"
    to: "JOY"
  - effect: skip_presence_check
    symbol: "AYE"
"#;
        let table = parse_corrections(yaml).unwrap();
        assert_eq!(table.relabel_added("JOYG"), "JOY");
        assert_eq!(table.relabel_added("AAPL"), "AAPL");
        assert!(table.skips_presence_check("AYE"));
        assert!(!table.skips_presence_check("JOY"));
        assert_eq!(table.seeded_symbols().collect::<Vec<_>>(), vec!["OLD", "NEW"]);
    }

    #[test]
    fn test_seed_respects_before() {
        let yaml = r#"
corrections:
  - effect: include
    symbol: "KRFT"
    before: "2015-07-02"
  - effect: exclude
    symbol: "KHC"
    before: "2015-07-02"
"#;
        let table = parse_corrections(yaml).unwrap();

        let mut early = set(&["AAPL", "KHC"]);
        table.seed(&mut early, date("2015-07-01"));
        assert_eq!(early, set(&["AAPL", "KRFT"]));

        let mut on_cutoff = set(&["AAPL", "KHC"]);
        table.seed(&mut on_cutoff, date("2015-07-02"));
        assert_eq!(on_cutoff, set(&["AAPL", "KHC"]));
    }

    #[test]
    fn test_seed_applies_in_file_order() {
        let yaml = r#"
corrections:
  - effect: include
    symbol: "X"
  - effect: exclude
    symbol: "X"
"#;
        let table = parse_corrections(yaml).unwrap();
        let mut working = set(&["A"]);
        table.seed(&mut working, date("2000-01-01"));
        assert_eq!(working, set(&["A"]));
    }

    #[test]
    fn test_duplicate_relabel_rejected() {
        let yaml = r#"
corrections:
  - effect: relabel_added
    symbol: "JOYG"
    to: "JOY"
  - effect: relabel_added
    symbol: "JOYG"
    to: "JOYX"
"#;
        let result = parse_corrections(yaml);
        assert!(matches!(
            result.unwrap_err(),
            CorrectionsError::DuplicateRelabel(_)
        ));
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let yaml = r#"
corrections:
  - effect: include
    symbol: ""
"#;
        assert!(matches!(
            parse_corrections(yaml).unwrap_err(),
            CorrectionsError::EmptySymbol
        ));
    }

    #[test]
    fn test_unknown_effect_rejected() {
        let yaml = r#"
corrections:
  - effect: teleport
    symbol: "X"
"#;
        assert!(matches!(
            parse_corrections(yaml).unwrap_err(),
            CorrectionsError::YamlParse(_)
        ));
    }

    #[test]
    fn test_empty_file() {
        let table = parse_corrections("corrections: []\n").unwrap();
        let mut working = set(&["A"]);
        table.seed(&mut working, date("2010-01-01"));
        assert_eq!(working, set(&["A"]));
        assert!(table.benchmark().extra_symbols.is_empty());
    }

    #[test]
    fn test_load_embedded_corrections() {
        let table = load_corrections().unwrap();
        assert_eq!(table.relabel_added("JOYG"), "JOY");
        for symbol in ["KRFT", "ANR", "JOYG", "AYE"] {
            assert!(table.skips_presence_check(symbol), "{} should be unchecked", symbol);
        }

        let mut before_mergers = BTreeSet::new();
        table.seed(&mut before_mergers, date("2015-06-01"));
        assert_eq!(before_mergers, set(&["GCI", "KRFT", "MWV", "ZMH"]));

        let mut after_mergers = set(&["KHC"]);
        table.seed(&mut after_mergers, date("2015-09-15"));
        assert_eq!(after_mergers, set(&["KHC"]));

        assert_eq!(table.benchmark().extra_symbols.len(), 6);
        assert_eq!(table.benchmark().renames[0].from, "GOOGL");
    }
}
