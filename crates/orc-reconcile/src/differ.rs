//! Field-by-field comparison driven by a declarative table.
//!
//! Adding a compared field means adding a [`FieldSpec`] row; the comparison
//! loop itself never changes.

use crate::normalize::{collapse, normalize_date, normalize_timestamp, PaymentRules};
use crate::{DiffEntry, FieldValue, LedgerRecord};

/// Pre-comparison canonicalization applied to both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalizer {
    Raw,
    Date,
    Timestamp,
}

impl Normalizer {
    pub fn apply(&self, v: &FieldValue) -> FieldValue {
        match self {
            Normalizer::Raw => v.clone(),
            Normalizer::Date => normalize_date(v),
            Normalizer::Timestamp => normalize_timestamp(v),
        }
    }
}

/// When a table row participates in the comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// Only when the source record declares a cash-like payment type.
    SourceCashLike,
}

impl Condition {
    fn holds(&self, source: &LedgerRecord, rules: &PaymentRules) -> bool {
        match self {
            Condition::Always => true,
            Condition::SourceCashLike => rules.is_cash_like_value(&source.payment_type),
        }
    }
}

pub type Extractor = fn(&LedgerRecord) -> FieldValue;

#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub field: &'static str,
    pub source: Extractor,
    pub base: Extractor,
    pub normalizer: Normalizer,
    pub condition: Condition,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field", &self.field)
            .field("normalizer", &self.normalizer)
            .field("condition", &self.condition)
            .finish()
    }
}

macro_rules! field {
    ($name:literal, $attr:ident, $norm:expr, $cond:expr) => {
        FieldSpec {
            field: $name,
            source: |r: &LedgerRecord| r.$attr.clone(),
            base: |r: &LedgerRecord| r.$attr.clone(),
            normalizer: $norm,
            condition: $cond,
        }
    };
    ($name:literal, $attr:ident, $norm:expr) => {
        field!($name, $attr, $norm, Condition::Always)
    };
    ($name:literal, $attr:ident) => {
        field!($name, $attr, Normalizer::Raw, Condition::Always)
    };
}

fn approval_code(r: &LedgerRecord) -> FieldValue {
    FieldValue::text(r.approval_type.as_code())
}

/// Compared fields, in report order.
pub const FIELD_TABLE: &[FieldSpec] = &[
    field!("HiDmsIdx", hi_dms_idx),
    field!("VehicleRegisterationNo", vehicle_registration_no),
    field!("FromDate", from_date, Normalizer::Date),
    field!("ToDate", to_date, Normalizer::Date),
    field!("PaymentType", payment_type),
    FieldSpec {
        field: "ApprovalType",
        source: approval_code,
        base: approval_code,
        normalizer: Normalizer::Raw,
        condition: Condition::Always,
    },
    field!("TransactionDate", transaction_date, Normalizer::Timestamp),
    field!("SalesPrice", sales_price),
    field!("CreditCardNo", credit_card_no),
    field!("CreditCardApprovalNo", credit_card_approval_no),
    field!("TransactionID", transaction_id),
    field!("CashbillID", cashbill_id),
    field!("CashTradeDate", cash_trade_date),
    field!(
        "CashIdentifyNo",
        cash_identify_no,
        Normalizer::Raw,
        Condition::SourceCashLike
    ),
];

/// Compare a source record with its translated base counterpart.
pub fn diff_records(
    source: &LedgerRecord,
    base: &LedgerRecord,
    rules: &PaymentRules,
) -> Vec<DiffEntry> {
    diff_with_table(FIELD_TABLE, source, base, rules)
}

pub fn diff_with_table(
    table: &[FieldSpec],
    source: &LedgerRecord,
    base: &LedgerRecord,
    rules: &PaymentRules,
) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    for entry in table {
        if !entry.condition.holds(source, rules) {
            continue;
        }
        let s = collapse(&entry.normalizer.apply(&(entry.source)(source)));
        let b = collapse(&entry.normalizer.apply(&(entry.base)(base)));
        if s != b {
            out.push(DiffEntry {
                field: entry.field.to_string(),
                source: s,
                base: b,
            });
        }
    }
    out
}
