use crate::{
    ApprovalType, ComparisonLogEntry, DiffEntry, Environment, LedgerRecord, ReconciliationRange,
    ReconciliationReport, ReconciliationSummary, SourceRecord, TicketDiff,
};

/// Value reported on the source side of a synthetic "missing" diff.
pub const SOURCE_EXISTS: &str = "exists";

/// Accumulates diffs and the comparison log across one run.
#[derive(Debug)]
pub struct ReportBuilder {
    environment: Environment,
    range: ReconciliationRange,
    diffs: Vec<TicketDiff>,
    log: Vec<ComparisonLogEntry>,
}

impl ReportBuilder {
    pub fn new(environment: Environment, range: ReconciliationRange) -> Self {
        Self {
            environment,
            range,
            diffs: Vec::new(),
            log: Vec::new(),
        }
    }

    /// A ticket that never reached field comparison.
    pub fn record_missing(&mut self, record: &SourceRecord, field: &str) {
        self.diffs.push(TicketDiff {
            ticket_id: record.ticket_id.clone(),
            approval_type: record.approval_type(),
            field: field.to_string(),
            source: Some(SOURCE_EXISTS.to_string()),
            base: None,
        });
    }

    /// A matched ticket; logged even when `diffs` is empty.
    pub fn record_compared(
        &mut self,
        record: &SourceRecord,
        base: LedgerRecord,
        diffs: Vec<DiffEntry>,
    ) {
        let approval_type: ApprovalType = record.approval_type();
        for d in &diffs {
            self.diffs.push(TicketDiff {
                ticket_id: record.ticket_id.clone(),
                approval_type,
                field: d.field.clone(),
                source: d.source.clone(),
                base: d.base.clone(),
            });
        }
        self.log.push(ComparisonLogEntry {
            ticket_id: record.ticket_id.clone(),
            approval_type,
            source: record.fields.clone(),
            base,
            diffs,
        });
    }

    pub fn finish(self) -> ReconciliationReport {
        let summary = ReconciliationSummary {
            diff_found: !self.diffs.is_empty(),
            total_compared: self.log.len(),
            total_diff: self.diffs.len(),
        };
        ReconciliationReport {
            environment: self.environment,
            range: self.range,
            summary,
            diffs: self.diffs,
            log: self.log,
        }
    }
}
