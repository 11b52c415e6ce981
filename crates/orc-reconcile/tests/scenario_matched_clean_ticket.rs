//! A ticket whose base leg agrees on every compared field is logged with an
//! empty diff list and counted as compared.

mod common;

use common::*;
use orc_reconcile::*;

#[tokio::test]
async fn identical_normalized_values_produce_empty_log_entry() {
    let ledger = FakeLedger::new(
        vec![card_source("T2", ApprovalType::Approval)],
        vec![card_base("T2", 15000)],
    );

    let report = run_reconciliation(
        &ledger,
        Environment::Stage,
        day(2025, 11, 21),
        day(2025, 11, 23),
        &PaymentRules::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.log.len(), 1);
    assert_eq!(report.log[0].ticket_id, "T2");
    assert!(report.log[0].diffs.is_empty(), "diffs: {:?}", report.log[0].diffs);
    assert_eq!(report.summary.total_compared, 1);
    assert_eq!(report.summary.total_diff, 0);
    assert!(report.is_clean());
}

#[tokio::test]
async fn approval_and_cancellation_of_one_ticket_match_their_own_legs() {
    let ledger = FakeLedger::new(
        vec![
            card_source("T7", ApprovalType::Approval),
            card_source("T7", ApprovalType::Cancellation),
        ],
        vec![card_base("T7", 15000), card_base("T7", -15000)],
    );

    let report = run_reconciliation(
        &ledger,
        Environment::Stage,
        day(2025, 11, 21),
        day(2025, 11, 21),
        &PaymentRules::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.summary.total_compared, 2);
    assert_eq!(report.summary.total_diff, 0);
    assert_eq!(report.log[0].approval_type, ApprovalType::Approval);
    assert_eq!(report.log[1].approval_type, ApprovalType::Cancellation);
    assert_eq!(report.log[1].base.sales_price, FieldValue::Int(15000));
    // One deduplicated ticket, one base query.
    assert_eq!(ledger.base_calls(), 1);
    assert_eq!(ledger.requested_tickets.lock().unwrap()[0].len(), 1);
}

#[tokio::test]
async fn field_mismatches_are_flattened_with_ticket_tags() {
    let mut source = card_source("T8", ApprovalType::Approval);
    source.fields.sales_price = FieldValue::text("16000");
    source.fields.credit_card_approval_no = FieldValue::Null;

    let ledger = FakeLedger::new(vec![source], vec![card_base("T8", 15000)]);
    let report = run_reconciliation(
        &ledger,
        Environment::Stage,
        day(2025, 11, 21),
        day(2025, 11, 21),
        &PaymentRules::default(),
    )
    .await
    .unwrap();

    let fields: Vec<&str> = report.diffs.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(fields, vec!["SalesPrice", "CreditCardApprovalNo"]);
    assert_eq!(report.diffs[0].source.as_deref(), Some("16000"));
    assert_eq!(report.diffs[0].base.as_deref(), Some("15000"));
    assert_eq!(report.diffs[1].source, None);
    assert_eq!(report.summary.total_diff, report.diffs.len());
    assert_eq!(report.summary.total_compared, 1);
}
