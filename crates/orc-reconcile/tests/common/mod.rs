//! In-memory ledger pair for engine scenarios.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use orc_reconcile::*;

#[derive(Default)]
pub struct FakeLedger {
    pub source: Vec<SourceRecord>,
    pub base: Vec<BaseRow>,
    pub fail_source: bool,
    pub fail_base: bool,
    pub source_calls: AtomicUsize,
    pub base_calls: AtomicUsize,
    pub requested_tickets: Mutex<Vec<BTreeSet<String>>>,
    pub seen_envs: Mutex<Vec<Environment>>,
}

impl FakeLedger {
    pub fn new(source: Vec<SourceRecord>, base: Vec<BaseRow>) -> Self {
        Self {
            source,
            base,
            ..Default::default()
        }
    }

    pub fn source_calls(&self) -> usize {
        self.source_calls.load(Ordering::SeqCst)
    }

    pub fn base_calls(&self) -> usize {
        self.base_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LedgerSource for FakeLedger {
    async fn list_unlinked_source_records(
        &self,
        env: Environment,
        _range: &ReconciliationRange,
    ) -> Result<Vec<SourceRecord>> {
        self.source_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_envs.lock().unwrap().push(env);
        if self.fail_source {
            bail!("connection refused");
        }
        Ok(self.source.clone())
    }

    async fn load_base_rows_for_tickets(
        &self,
        env: Environment,
        ticket_ids: &BTreeSet<String>,
    ) -> Result<Vec<BaseRow>> {
        self.base_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_envs.lock().unwrap().push(env);
        self.requested_tickets.lock().unwrap().push(ticket_ids.clone());
        if self.fail_base {
            bail!("query timeout");
        }
        let mut rows: Vec<BaseRow> = self
            .base
            .iter()
            .filter(|r| ticket_ids.contains(&r.ticket_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.ticket_id
                .cmp(&b.ticket_id)
                .then(b.amount.unwrap_or(0).cmp(&a.amount.unwrap_or(0)))
        });
        Ok(rows)
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, mi, s).unwrap()
}

/// Card approval as the source ledger stores it.
pub fn card_source(ticket: &str, ty: ApprovalType) -> SourceRecord {
    let mut f = LedgerRecord::empty(ty);
    f.hi_dms_idx = FieldValue::text("900001");
    f.vehicle_registration_no = FieldValue::text("12가3456");
    f.from_date = FieldValue::text("2025-11-21");
    f.to_date = FieldValue::text("2025-11-22");
    f.payment_type = FieldValue::text("CARD");
    f.transaction_date = FieldValue::text("2025-11-21 10:15:00");
    f.sales_price = FieldValue::Int(15000);
    f.credit_card_no = FieldValue::text("4111-****-****-1111");
    f.credit_card_approval_no = FieldValue::text("30001234");
    f.transaction_id = FieldValue::text("PG20251121001");
    SourceRecord::new(ticket, f)
}

/// The base-ledger rows that agree with [`card_source`].
pub fn card_base(ticket: &str, amount: i64) -> BaseRow {
    let mut r = BaseRow::new(ticket, Some(amount));
    r.hi_dms_idx = FieldValue::text("900001");
    r.car_number = FieldValue::text("12가3456");
    r.service_start_dt = FieldValue::Timestamp(at(2025, 11, 21, 0, 0, 0));
    r.service_end_dt = FieldValue::Date(day(2025, 11, 22));
    r.pay_method_type = Some("CARD".to_string());
    r.transaction_date = FieldValue::Timestamp(at(2025, 11, 21, 10, 15, 0));
    r.card_no = FieldValue::text("4111-****-****-1111");
    r.approval_no = FieldValue::text("30001234");
    r.pg_cno = FieldValue::text("PG20251121001");
    r.cash_auth_no = FieldValue::text("");
    r
}
