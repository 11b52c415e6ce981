//! Representation-independent views of ledger cells.
//!
//! Every function here is total: input that cannot be understood becomes
//! [`FieldValue::Null`] (or `None` after collapsing) instead of an error, so a
//! single malformed cell never aborts a run.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::FieldValue;

/// Canonical timestamp rendering (`YYYYMMDDHHMMSS`).
pub const CANONICAL_TIMESTAMP: &str = "%Y%m%d%H%M%S";
/// Canonical date rendering (`YYYY-MM-DD`).
pub const CANONICAL_DATE: &str = "%Y-%m-%d";
/// How the source ledger formats timestamps as text.
pub const SOURCE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Payment-method vocabulary shared by both ledgers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRules {
    /// Payment types that carry a cash identification number.
    pub cash_like: Vec<String>,
    /// Base-ledger payment code -> source-ledger payment code.
    pub aliases: BTreeMap<String, String>,
}

impl Default for PaymentRules {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();
        // The base ledger splits virtual-account deposits out of CASH.
        aliases.insert("VIRTUAL_ACCT".to_string(), "CASH".to_string());
        Self {
            cash_like: vec!["CASH".to_string(), "VIRTUAL_ACCT".to_string()],
            aliases,
        }
    }
}

impl PaymentRules {
    pub fn is_cash_like(&self, payment_type: &str) -> bool {
        self.cash_like.iter().any(|c| c == payment_type)
    }

    pub fn is_cash_like_value(&self, v: &FieldValue) -> bool {
        v.as_text().map(|s| self.is_cash_like(s)).unwrap_or(false)
    }

    /// Base payment code expressed in the source ledger's vocabulary.
    pub fn source_code<'a>(&'a self, base_code: &'a str) -> &'a str {
        self.aliases
            .get(base_code)
            .map(|s| s.as_str())
            .unwrap_or(base_code)
    }
}

/// Render any timestamp-like value as `YYYYMMDDHHMMSS`.
///
/// Accepts native timestamps and dates, `YYYY-MM-DD HH:MM:SS` text, and text
/// that is already canonical (so the function is idempotent). Anything else
/// is absent.
pub fn normalize_timestamp(v: &FieldValue) -> FieldValue {
    match v {
        FieldValue::Null => FieldValue::Null,
        FieldValue::Timestamp(ts) => canonical_ts(*ts),
        FieldValue::Date(d) => canonical_ts(d.and_time(NaiveTime::MIN)),
        FieldValue::Int(n) => parse_timestamp_text(&n.to_string()),
        FieldValue::Text(s) => parse_timestamp_text(s),
    }
}

fn parse_timestamp_text(s: &str) -> FieldValue {
    let t = s.trim();
    if t.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(t, SOURCE_TIMESTAMP) {
        return canonical_ts(ts);
    }
    let is_canonical = t.len() == 14
        && t.bytes().all(|b| b.is_ascii_digit())
        && NaiveDateTime::parse_from_str(t, CANONICAL_TIMESTAMP).is_ok();
    if is_canonical {
        return FieldValue::text(t);
    }
    FieldValue::Null
}

fn canonical_ts(ts: NaiveDateTime) -> FieldValue {
    FieldValue::Text(ts.format(CANONICAL_TIMESTAMP).to_string())
}

/// Render any date-like value as `YYYY-MM-DD`.
///
/// Text is truncated to its first 10 characters before parsing, which drops
/// the time part of `YYYY-MM-DD HH:MM:SS`. Integers pass through unchanged.
pub fn normalize_date(v: &FieldValue) -> FieldValue {
    match v {
        FieldValue::Null => FieldValue::Null,
        // Integer-coded dates are compared as stored.
        FieldValue::Int(n) => FieldValue::Int(*n),
        FieldValue::Date(d) => canonical_date(*d),
        FieldValue::Timestamp(ts) => canonical_date(ts.date()),
        FieldValue::Text(s) => {
            let t = s.trim();
            let head = t.get(..10).unwrap_or(t);
            match NaiveDate::parse_from_str(head, CANONICAL_DATE) {
                Ok(d) => canonical_date(d),
                Err(_) => FieldValue::Null,
            }
        }
    }
}

fn canonical_date(d: NaiveDate) -> FieldValue {
    FieldValue::Text(d.format(CANONICAL_DATE).to_string())
}

/// Collapse a value to the token diffing compares.
///
/// `""`, `"0"`, `0` and null are all absent.
pub fn collapse(v: &FieldValue) -> Option<String> {
    match v {
        FieldValue::Null => None,
        FieldValue::Int(0) => None,
        FieldValue::Int(n) => Some(n.to_string()),
        FieldValue::Text(s) if s.is_empty() || s == "0" => None,
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Date(d) => Some(d.format(CANONICAL_DATE).to_string()),
        FieldValue::Timestamp(ts) => Some(ts.format(SOURCE_TIMESTAMP).to_string()),
    }
}
