use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::{BaseRow, BaseVariant, SourceRecord};

/// Distinct ticket ids of the loaded source records, in ascending order.
pub fn ticket_set(records: &[SourceRecord]) -> BTreeSet<String> {
    records.iter().map(|r| r.ticket_id.clone()).collect()
}

/// Split base rows into approval (`amount > 0`) and cancellation
/// (`amount < 0`) legs per ticket.
///
/// First row of each sign wins; rows must already be ordered by
/// `(ticket asc, amount desc)`. Later same-sign rows are dropped with a
/// warning. Zero and missing amounts are ignored, but their ticket still gets
/// an (empty) entry so it is distinguishable from a ticket with no base rows.
pub fn partition_base_rows(rows: Vec<BaseRow>) -> HashMap<String, BaseVariant> {
    let mut map: HashMap<String, BaseVariant> = HashMap::new();

    for row in rows {
        let amount = row.amount.unwrap_or(0);
        let variant = map.entry(row.ticket_id.clone()).or_default();

        let slot = if amount > 0 {
            &mut variant.positive
        } else if amount < 0 {
            &mut variant.negative
        } else {
            continue;
        };

        if slot.is_none() {
            *slot = Some(row);
            continue;
        }

        let kept_amount = slot.as_ref().and_then(|kept| kept.amount).unwrap_or(0);
        warn!(
            ticket_id = %row.ticket_id,
            kept_amount,
            discarded_amount = amount,
            "duplicate same-sign base row discarded"
        );
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApprovalType, LedgerRecord};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn row(ticket: &str, amount: Option<i64>) -> BaseRow {
        BaseRow::new(ticket, amount)
    }

    #[test]
    fn rows_split_by_amount_sign() {
        let map = partition_base_rows(vec![
            row("T1", Some(5000)),
            row("T1", Some(-5000)),
            row("T2", Some(-100)),
        ]);

        let t1 = &map["T1"];
        assert_eq!(t1.positive.as_ref().unwrap().amount, Some(5000));
        assert_eq!(t1.negative.as_ref().unwrap().amount, Some(-5000));

        let t2 = &map["T2"];
        assert!(t2.positive.is_none());
        assert_eq!(t2.negative.as_ref().unwrap().amount, Some(-100));
    }

    #[test]
    fn first_same_sign_row_wins() {
        // Query order is amount desc: 9000 precedes 3000, -1000 precedes -7000.
        let map = partition_base_rows(vec![
            row("T1", Some(9000)),
            row("T1", Some(3000)),
            row("T1", Some(-1000)),
            row("T1", Some(-7000)),
        ]);
        let t1 = &map["T1"];
        assert_eq!(t1.positive.as_ref().unwrap().amount, Some(9000));
        assert_eq!(t1.negative.as_ref().unwrap().amount, Some(-1000));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn each_discarded_duplicate_is_warned() {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let map = tracing::subscriber::with_default(subscriber, || {
            partition_base_rows(vec![
                row("T1", Some(9000)),
                row("T1", Some(3000)),
                row("T1", Some(-1000)),
                row("T1", Some(-7000)),
                row("T2", Some(500)),
            ])
        });
        assert_eq!(map["T1"].positive.as_ref().unwrap().amount, Some(9000));

        let out = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let warnings: Vec<&str> = out
            .lines()
            .filter(|l| l.contains("duplicate same-sign base row discarded"))
            .collect();
        assert_eq!(warnings.len(), 2, "log was: {out}");
        assert!(warnings[0].contains("WARN"));
        assert!(warnings[0].contains("ticket_id=T1"));
        assert!(warnings[0].contains("discarded_amount=3000"));
        assert!(warnings[1].contains("discarded_amount=-7000"));
    }

    #[test]
    fn zero_and_missing_amounts_leave_an_empty_variant() {
        let map = partition_base_rows(vec![row("T9", None), row("T9", Some(0))]);
        assert_eq!(map.get("T9"), Some(&BaseVariant::default()));
    }

    #[test]
    fn ticket_set_dedupes_approval_and_cancellation_rows() {
        let records = vec![
            SourceRecord::new("T2", LedgerRecord::empty(ApprovalType::Approval)),
            SourceRecord::new("T1", LedgerRecord::empty(ApprovalType::Approval)),
            SourceRecord::new("T2", LedgerRecord::empty(ApprovalType::Cancellation)),
        ];
        let set = ticket_set(&records);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["T1", "T2"]);
    }
}
