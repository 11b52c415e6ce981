use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::range::ReconciliationRange;

/// Physical ledger pair a run is executed against.
///
/// There is no default: every data-source call names its environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Stage,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Stage => "stage",
            Environment::Prod => "prod",
        }
    }

    /// Case-insensitive, whitespace-tolerant parse. Unknown names are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stage" => Some(Environment::Stage),
            "prod" => Some(Environment::Prod),
            _ => None,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a ticket-side record is the original approval or its cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ApprovalType {
    #[serde(rename = "A")]
    Approval,
    #[serde(rename = "C")]
    Cancellation,
}

impl ApprovalType {
    pub fn as_code(&self) -> &'static str {
        match self {
            ApprovalType::Approval => "A",
            ApprovalType::Cancellation => "C",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" => Some(ApprovalType::Approval),
            "C" => Some(ApprovalType::Cancellation),
            _ => None,
        }
    }
}

/// One ledger cell as the data source handed it over.
///
/// The two ledgers store the same facts in different representations
/// (native timestamps on one side, formatted strings on the other), so the
/// representation is kept until the normalizer decides how to compare it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Int(i64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        v.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::Timestamp(v)
    }
}

/// The comparable field set, named after the source ledger's columns.
///
/// Source rows load straight into this shape; base rows are translated onto
/// it by the matcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerRecord {
    pub hi_dms_idx: FieldValue,
    #[serde(rename = "VehicleRegisterationNo")]
    pub vehicle_registration_no: FieldValue,
    pub from_date: FieldValue,
    pub to_date: FieldValue,
    pub payment_type: FieldValue,
    pub approval_type: ApprovalType,
    pub transaction_date: FieldValue,
    pub sales_price: FieldValue,
    pub credit_card_no: FieldValue,
    pub credit_card_approval_no: FieldValue,
    #[serde(rename = "TransactionID")]
    pub transaction_id: FieldValue,
    #[serde(rename = "CashbillID")]
    pub cashbill_id: FieldValue,
    pub cash_trade_date: FieldValue,
    pub cash_identify_no: FieldValue,
}

impl LedgerRecord {
    /// All-null record of the given approval type.
    pub fn empty(approval_type: ApprovalType) -> Self {
        Self {
            hi_dms_idx: FieldValue::Null,
            vehicle_registration_no: FieldValue::Null,
            from_date: FieldValue::Null,
            to_date: FieldValue::Null,
            payment_type: FieldValue::Null,
            approval_type,
            transaction_date: FieldValue::Null,
            sales_price: FieldValue::Null,
            credit_card_no: FieldValue::Null,
            credit_card_approval_no: FieldValue::Null,
            transaction_id: FieldValue::Null,
            cashbill_id: FieldValue::Null,
            cash_trade_date: FieldValue::Null,
            cash_identify_no: FieldValue::Null,
        }
    }
}

/// One not-yet-linked row of the source ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
    #[serde(rename = "TicketID")]
    pub ticket_id: String,
    #[serde(flatten)]
    pub fields: LedgerRecord,
}

impl SourceRecord {
    pub fn new(ticket_id: impl Into<String>, fields: LedgerRecord) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            fields,
        }
    }

    pub fn approval_type(&self) -> ApprovalType {
        self.fields.approval_type
    }
}

/// One row of the base ledger's order x payment join.
///
/// `amount` is signed: positive rows are approval legs, negative rows are
/// cancellation legs. It is `None` when the order has no payment row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BaseRow {
    pub ticket_id: String,
    pub hi_dms_idx: FieldValue,
    pub car_number: FieldValue,
    pub service_start_dt: FieldValue,
    pub service_end_dt: FieldValue,
    pub pay_method_type: Option<String>,
    pub order_status: FieldValue,
    pub trade_status: FieldValue,
    pub amount: Option<i64>,
    pub transaction_date: FieldValue,
    pub card_no: FieldValue,
    pub approval_no: FieldValue,
    pub pg_cno: FieldValue,
    pub cash_auth_no: FieldValue,
    pub cash_tran_date: FieldValue,
    pub cash_auth_value: FieldValue,
}

impl BaseRow {
    /// Row with only the key and amount set.
    pub fn new(ticket_id: impl Into<String>, amount: Option<i64>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            hi_dms_idx: FieldValue::Null,
            car_number: FieldValue::Null,
            service_start_dt: FieldValue::Null,
            service_end_dt: FieldValue::Null,
            pay_method_type: None,
            order_status: FieldValue::Null,
            trade_status: FieldValue::Null,
            amount,
            transaction_date: FieldValue::Null,
            card_no: FieldValue::Null,
            approval_no: FieldValue::Null,
            pg_cno: FieldValue::Null,
            cash_auth_no: FieldValue::Null,
            cash_tran_date: FieldValue::Null,
            cash_auth_value: FieldValue::Null,
        }
    }
}

/// Approval and cancellation legs of one ticket in the base ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseVariant {
    pub positive: Option<BaseRow>,
    pub negative: Option<BaseRow>,
}

impl BaseVariant {
    /// The leg matching a source record's declared type.
    pub fn for_type(&self, approval_type: ApprovalType) -> Option<&BaseRow> {
        match approval_type {
            ApprovalType::Approval => self.positive.as_ref(),
            ApprovalType::Cancellation => self.negative.as_ref(),
        }
    }
}

/// One field-level mismatch. Values are the null-collapsed canonical tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub field: String,
    pub source: Option<String>,
    pub base: Option<String>,
}

/// A diff entry tagged with the ticket it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TicketDiff {
    pub ticket_id: String,
    pub approval_type: ApprovalType,
    pub field: String,
    pub source: Option<String>,
    pub base: Option<String>,
}

/// Audit record of one successfully matched ticket, diffs may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonLogEntry {
    pub ticket_id: String,
    pub approval_type: ApprovalType,
    pub source: LedgerRecord,
    pub base: LedgerRecord,
    pub diffs: Vec<DiffEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub diff_found: bool,
    pub total_compared: usize,
    pub total_diff: usize,
}

/// The engine's single output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub environment: Environment,
    pub range: ReconciliationRange,
    pub summary: ReconciliationSummary,
    pub diffs: Vec<TicketDiff>,
    pub log: Vec<ComparisonLogEntry>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        !self.summary.diff_found
    }
}
