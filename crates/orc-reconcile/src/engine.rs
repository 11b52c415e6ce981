use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::differ::diff_records;
use crate::matcher::{match_record, translate_base, MatchOutcome};
use crate::normalize::PaymentRules;
use crate::partition::{partition_base_rows, ticket_set};
use crate::report::ReportBuilder;
use crate::source::LedgerSource;
use crate::{
    BaseVariant, Environment, RangeError, ReconciliationRange, ReconciliationReport, SourceRecord,
};

/// Match, normalize and diff every source record against the partitioned
/// base ledger.
///
/// Pure and deterministic: report order follows `records` order.
pub fn compare_all(
    environment: Environment,
    range: ReconciliationRange,
    records: &[SourceRecord],
    variants: &HashMap<String, BaseVariant>,
    rules: &PaymentRules,
) -> ReconciliationReport {
    let mut report = ReportBuilder::new(environment, range);

    for record in records {
        match match_record(record, variants) {
            MatchOutcome::Matched(row) => {
                let base = translate_base(row, record, rules);
                let diffs = diff_records(&record.fields, &base, rules);
                report.record_compared(record, base, diffs);
            }
            missing => {
                let field = missing.missing_field().unwrap_or_default();
                debug!(ticket_id = %record.ticket_id, field, "no base counterpart");
                report.record_missing(record, field);
            }
        }
    }

    report.finish()
}

/// Error returned by [`run_reconciliation`]. Any variant aborts the whole run.
#[derive(Debug)]
pub enum ReconcileError {
    Range(RangeError),
    /// The source-ledger query failed.
    SourceLoad(anyhow::Error),
    /// The bulk base-ledger query failed.
    BaseLoad(anyhow::Error),
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::Range(e) => write!(f, "invalid reconciliation range: {e}"),
            ReconcileError::SourceLoad(e) => write!(f, "source ledger load failed: {e:#}"),
            ReconcileError::BaseLoad(e) => write!(f, "base ledger load failed: {e:#}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Range(e) => Some(e),
            ReconcileError::SourceLoad(e) | ReconcileError::BaseLoad(e) => Some(&**e),
        }
    }
}

impl From<RangeError> for ReconcileError {
    fn from(e: RangeError) -> Self {
        ReconcileError::Range(e)
    }
}

/// One reconciliation run over the inclusive calendar days `start..=end`.
///
/// Exactly two reads hit the data source (none for the base ledger when the
/// source ledger has nothing in range). No partial report is ever returned.
pub async fn run_reconciliation(
    source: &dyn LedgerSource,
    environment: Environment,
    start: NaiveDate,
    end: NaiveDate,
    rules: &PaymentRules,
) -> Result<ReconciliationReport, ReconcileError> {
    let started = Instant::now();
    let range = ReconciliationRange::from_dates(start, end)?;
    info!(%environment, %range, "reconciliation run started");

    let records = source
        .list_unlinked_source_records(environment, &range)
        .await
        .map_err(ReconcileError::SourceLoad)?;

    let tickets = ticket_set(&records);
    info!(
        records = records.len(),
        tickets = tickets.len(),
        "unlinked source records loaded"
    );

    let variants = if tickets.is_empty() {
        HashMap::new()
    } else {
        let rows = source
            .load_base_rows_for_tickets(environment, &tickets)
            .await
            .map_err(ReconcileError::BaseLoad)?;
        info!(rows = rows.len(), "base rows loaded");
        partition_base_rows(rows)
    };

    let report = compare_all(environment, range, &records, &variants, rules);
    info!(
        total_compared = report.summary.total_compared,
        total_diff = report.summary.total_diff,
        diff_found = report.summary.diff_found,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "reconciliation run finished"
    );
    Ok(report)
}
