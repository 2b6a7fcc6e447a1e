//! One-time reconciliation of the published constituents with the newest
//! change records.
//!
//! The constituents table often lags the change history by a few entries, so
//! the newest changes are applied forward before the baseline is trusted.

use std::collections::BTreeSet;

use crate::change_log::ChangeRecord;
use crate::corrections::CorrectionTable;
use crate::error::{Expectation, InvariantViolation, Stage};
use crate::history::log_step;
use crate::reconstruct::check_membership;

/// How many of the newest change records are checked against the baseline.
pub const RECONCILE_DEPTH: usize = 5;

/// Applies any of the first [`RECONCILE_DEPTH`] records the baseline does not
/// yet reflect. Returns the number of corrections made.
pub fn reconcile_baseline(
    baseline: &mut BTreeSet<String>,
    records: &[ChangeRecord],
    corrections: &CorrectionTable,
    verbose: bool,
) -> Result<usize, InvariantViolation> {
    let mut applied = 0;

    for record in records.iter().take(RECONCILE_DEPTH) {
        let added = corrections.relabel_added(&record.added);
        let removed = record.removed.as_str();

        if added.is_empty() {
            if baseline.remove(removed) {
                log_step(
                    verbose,
                    format_args!("Baseline is stale: remove {:5} ({})", removed, record.effective_date),
                );
                applied += 1;
            }
            continue;
        }
        if baseline.contains(added) || added == removed {
            continue;
        }

        if removed.is_empty() {
            log_step(
                verbose,
                format_args!("Baseline is stale: add {:5} ({})", added, record.effective_date),
            );
            baseline.insert(added.to_string());
        } else {
            log_step(
                verbose,
                format_args!(
                    "Baseline is stale: replace {:5} by {:5} ({})",
                    removed, added, record.effective_date
                ),
            );
            if baseline.remove(removed) {
                baseline.insert(added.to_string());
            }
            check_membership(baseline, added, Expectation::Present, Stage::Reconcile, record)?;
            check_membership(baseline, removed, Expectation::Absent, Stage::Reconcile, record)?;
        }
        applied += 1;
    }

    if applied > 0 {
        tracing::info!("Reconciled baseline with {} recent change(s)", applied);
    }
    Ok(applied)
}
