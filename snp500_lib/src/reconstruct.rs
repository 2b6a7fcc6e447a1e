//! Replays the change log backward from the baseline to a past date.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::change_log::ChangeRecord;
use crate::corrections::CorrectionTable;
use crate::error::{Expectation, InvariantViolation, Stage};
use crate::history::log_step;

/// Membership on `date`, sorted ascending.
///
/// Every record effective on or after `date` is undone, newest first, on a
/// private copy of the baseline seeded with the date-conditioned corrections.
/// Records sharing a date are undone in source order.
pub fn reconstruct(
    baseline: &BTreeSet<String>,
    records: &[ChangeRecord],
    corrections: &CorrectionTable,
    date: NaiveDate,
    verbose: bool,
) -> Result<Vec<String>, InvariantViolation> {
    let mut working = baseline.clone();
    corrections.seed(&mut working, date);

    for (idx, record) in records
        .iter()
        .take_while(|r| r.effective_date >= date)
        .enumerate()
    {
        undo(&mut working, idx, record, corrections, date, verbose)?;
    }

    Ok(working.into_iter().collect())
}

fn undo(
    working: &mut BTreeSet<String>,
    idx: usize,
    record: &ChangeRecord,
    corrections: &CorrectionTable,
    date: NaiveDate,
    verbose: bool,
) -> Result<(), InvariantViolation> {
    let added = corrections.relabel_added(&record.added);
    let removed = record.removed.as_str();

    match (added.is_empty(), removed.is_empty()) {
        (false, true) => {
            log_step(
                verbose,
                format_args!("{:3}  ** Delete  {:5} on {}", idx, added, record.effective_date),
            );
            working.remove(added);
            check_membership(
                working,
                added,
                Expectation::Absent,
                Stage::Reconstruct(date),
                record,
            )?;
        }
        (true, false) => {
            log_step(
                verbose,
                format_args!("{:3}  ** Restore {:5} on {}", idx, removed, record.effective_date),
            );
            working.insert(removed.to_string());
        }
        (false, false) if added != removed => {
            log_step(
                verbose,
                format_args!(
                    "{:3}  replace {:5} by {:5} on {}",
                    idx, added, removed, record.effective_date
                ),
            );
            if working.remove(added) {
                working.insert(removed.to_string());
            }
            let stage = Stage::Reconstruct(date);
            check_membership(working, added, Expectation::Absent, stage, record)?;
            let unchecked = corrections.skips_presence_check(&record.added)
                || corrections.skips_presence_check(added);
            if !unchecked {
                check_membership(working, removed, Expectation::Present, stage, record)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Fails unless `symbol` is in `set` exactly when `expectation` says so.
pub(crate) fn check_membership(
    set: &BTreeSet<String>,
    symbol: &str,
    expectation: Expectation,
    stage: Stage,
    record: &ChangeRecord,
) -> Result<(), InvariantViolation> {
    if set.contains(symbol) == (expectation == Expectation::Present) {
        return Ok(());
    }
    Err(InvariantViolation {
        stage,
        symbol: symbol.to_string(),
        expectation,
        record: record.clone(),
    })
}
