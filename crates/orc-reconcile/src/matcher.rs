use std::collections::HashMap;

use crate::normalize::PaymentRules;
use crate::{BaseRow, BaseVariant, FieldValue, LedgerRecord, SourceRecord};

/// Synthetic diff field for a ticket the base ledger does not know.
pub const BASE_MISSING: &str = "Base missing";
/// Synthetic diff field for a ticket whose matching leg is absent.
pub const BASE_VARIANT_MISSING: &str = "BASE row missing for this status";

/// Exactly one of these applies to every source record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// No base row at all for the ticket.
    TicketMissing,
    /// Ticket known, but not the leg the record's approval type asks for.
    VariantMissing,
    Matched(&'a BaseRow),
}

impl MatchOutcome<'_> {
    /// Diff field name reported for the two missing outcomes.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            MatchOutcome::TicketMissing => Some(BASE_MISSING),
            MatchOutcome::VariantMissing => Some(BASE_VARIANT_MISSING),
            MatchOutcome::Matched(_) => None,
        }
    }
}

/// Select the base leg for a source record (`A` -> positive, `C` -> negative).
pub fn match_record<'a>(
    record: &SourceRecord,
    variants: &'a HashMap<String, BaseVariant>,
) -> MatchOutcome<'a> {
    match variants.get(&record.ticket_id) {
        None => MatchOutcome::TicketMissing,
        Some(v) => match v.for_type(record.approval_type()) {
            None => MatchOutcome::VariantMissing,
            Some(row) => MatchOutcome::Matched(row),
        },
    }
}

/// Translate a base row onto the source ledger's field names.
///
/// - payment type is expressed through the alias table;
/// - approval type is copied from the source record (the leg was chosen by it);
/// - price is the absolute amount;
/// - the cash identification number is only carried for cash-like methods.
pub fn translate_base(row: &BaseRow, record: &SourceRecord, rules: &PaymentRules) -> LedgerRecord {
    let pay_method = row.pay_method_type.as_deref();
    let cash_like = pay_method.map(|m| rules.is_cash_like(m)).unwrap_or(false);

    LedgerRecord {
        hi_dms_idx: row.hi_dms_idx.clone(),
        vehicle_registration_no: row.car_number.clone(),
        from_date: row.service_start_dt.clone(),
        to_date: row.service_end_dt.clone(),
        payment_type: pay_method
            .map(|m| FieldValue::text(rules.source_code(m)))
            .unwrap_or(FieldValue::Null),
        approval_type: record.approval_type(),
        transaction_date: row.transaction_date.clone(),
        sales_price: absolute_amount(row.amount),
        credit_card_no: row.card_no.clone(),
        credit_card_approval_no: row.approval_no.clone(),
        transaction_id: row.pg_cno.clone(),
        cashbill_id: row.cash_auth_no.clone(),
        cash_trade_date: row.cash_tran_date.clone(),
        cash_identify_no: if cash_like {
            row.cash_auth_value.clone()
        } else {
            FieldValue::Null
        },
    }
}

/// `|amount|`; `i64::MIN` has no `i64` magnitude and is carried as text.
fn absolute_amount(amount: Option<i64>) -> FieldValue {
    let amount = amount.unwrap_or(0);
    match amount.checked_abs() {
        Some(n) => FieldValue::Int(n),
        None => FieldValue::Text(amount.unsigned_abs().to_string()),
    }
}
