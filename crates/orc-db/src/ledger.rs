use std::collections::{BTreeSet, HashMap};

use anyhow::{anyhow, bail, Context, Result};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use orc_reconcile::{
    ApprovalType, BaseRow, Environment, LedgerRecord, LedgerSource, ReconciliationRange,
    SourceRecord,
};

use crate::decode::{decode_cell, decode_text};

/// Unlinked source-ledger records modified within `[$1, $2)`.
///
/// Ordered so that report order is stable across runs.
pub const SOURCE_RECORDS_SQL: &str = r#"
    select
      "TicketID",
      "ApprovalType",
      "HiDmsIdx",
      "VehicleRegisterationNo",
      "FromDate",
      "ToDate",
      "PaymentType",
      "TransactionDate",
      "SalesPrice",
      "CreditCardNo",
      "CreditCardApprovalNo",
      "TransactionID",
      "CashbillID",
      "CashTradeDate",
      "CashIdentifyNo"
    from vtb_dms_order
    where "LastModifiedDate" >= $1
      and "LastModifiedDate" < $2
      and (business_order_sheet_seq is null or business_order_sheet_seq = '')
    order by "LastModifiedDate" asc, "TicketID" asc, "ApprovalType" asc
"#;

/// Orders joined with their payment transactions for a ticket set.
///
/// `amount desc` puts the approval leg ahead of the cancellation leg; the
/// partitioner relies on that order for its first-wins rule.
pub const BASE_ROWS_SQL: &str = r#"
    select
      tb.order_no,
      tb.hi_dms_idx,
      tb.car_number,
      tb.service_start_dt,
      tb.service_end_dt,
      tb.pay_method_type,
      tb.status as tb_status,
      tt.status as tt_status,
      tt.amount::bigint as amount,
      tt.transaction_date,
      tt.card_no,
      tt.approval_no,
      tt.pg_cno,
      tt.cash_auth_no,
      tt.cash_tran_date,
      tt.cash_auth_value
    from tb_order tb
    left join tb_trade tt
      on tb.order_no = tt.shop_order_no
    where tb.order_no = any($1)
    order by tb.order_no asc, tt.amount desc
"#;

const SOURCE_VIEW: &str = "vtb_dms_order";
const BASE_JOIN: &str = "tb_order/tb_trade";

/// Read the unlinked source-ledger records of `range`.
pub async fn load_source_records(
    pool: &PgPool,
    range: &ReconciliationRange,
) -> Result<Vec<SourceRecord>> {
    let rows = sqlx::query(SOURCE_RECORDS_SQL)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
        .context("load_source_records query failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for r in &rows {
        out.push(source_record_from_row(r)?);
    }
    Ok(out)
}

fn source_record_from_row(r: &PgRow) -> Result<SourceRecord> {
    let t = SOURCE_VIEW;
    let ticket_id = decode_text(r, t, "TicketID")?.unwrap_or_default();
    if ticket_id.trim().is_empty() {
        bail!("{t}: row with empty TicketID");
    }
    let code = decode_text(r, t, "ApprovalType")?.unwrap_or_default();
    let approval_type = ApprovalType::parse(&code).ok_or_else(|| {
        anyhow!("{t}: ticket {ticket_id} has invalid ApprovalType {code:?} (expected A or C)")
    })?;

    let fields = LedgerRecord {
        hi_dms_idx: decode_cell(r, t, "HiDmsIdx")?,
        vehicle_registration_no: decode_cell(r, t, "VehicleRegisterationNo")?,
        from_date: decode_cell(r, t, "FromDate")?,
        to_date: decode_cell(r, t, "ToDate")?,
        payment_type: decode_cell(r, t, "PaymentType")?,
        approval_type,
        transaction_date: decode_cell(r, t, "TransactionDate")?,
        sales_price: decode_cell(r, t, "SalesPrice")?,
        credit_card_no: decode_cell(r, t, "CreditCardNo")?,
        credit_card_approval_no: decode_cell(r, t, "CreditCardApprovalNo")?,
        transaction_id: decode_cell(r, t, "TransactionID")?,
        cashbill_id: decode_cell(r, t, "CashbillID")?,
        cash_trade_date: decode_cell(r, t, "CashTradeDate")?,
        cash_identify_no: decode_cell(r, t, "CashIdentifyNo")?,
    };
    Ok(SourceRecord::new(ticket_id, fields))
}

/// Bulk-read base rows for every ticket in `ticket_ids`. One query.
pub async fn load_base_rows(pool: &PgPool, ticket_ids: &BTreeSet<String>) -> Result<Vec<BaseRow>> {
    if ticket_ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = ticket_ids.iter().cloned().collect();

    let rows = sqlx::query(BASE_ROWS_SQL)
        .bind(ids)
        .fetch_all(pool)
        .await
        .context("load_base_rows query failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for r in &rows {
        out.push(base_row_from_row(r)?);
    }
    Ok(out)
}

fn base_row_from_row(r: &PgRow) -> Result<BaseRow> {
    let t = BASE_JOIN;
    let ticket_id = decode_text(r, t, "order_no")?
        .ok_or_else(|| anyhow!("{t}: row with null order_no"))?;
    let amount = r
        .try_get::<Option<i64>, _>("amount")
        .context("tb_trade.amount")?;

    Ok(BaseRow {
        hi_dms_idx: decode_cell(r, t, "hi_dms_idx")?,
        car_number: decode_cell(r, t, "car_number")?,
        service_start_dt: decode_cell(r, t, "service_start_dt")?,
        service_end_dt: decode_cell(r, t, "service_end_dt")?,
        pay_method_type: decode_text(r, t, "pay_method_type")?,
        order_status: decode_cell(r, t, "tb_status")?,
        trade_status: decode_cell(r, t, "tt_status")?,
        amount,
        transaction_date: decode_cell(r, t, "transaction_date")?,
        card_no: decode_cell(r, t, "card_no")?,
        approval_no: decode_cell(r, t, "approval_no")?,
        pg_cno: decode_cell(r, t, "pg_cno")?,
        cash_auth_no: decode_cell(r, t, "cash_auth_no")?,
        cash_tran_date: decode_cell(r, t, "cash_tran_date")?,
        cash_auth_value: decode_cell(r, t, "cash_auth_value")?,
        ticket_id,
    })
}

/// [`LedgerSource`] over one Postgres pool per environment.
///
/// An environment without a pool is an error; there is no fallback.
#[derive(Debug, Clone, Default)]
pub struct PgLedgerSource {
    pools: HashMap<Environment, PgPool>,
}

impl PgLedgerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, environment: Environment, pool: PgPool) -> Self {
        self.pools.insert(environment, pool);
        self
    }

    pub fn pool(&self, environment: Environment) -> Result<&PgPool> {
        self.pools
            .get(&environment)
            .ok_or_else(|| anyhow!("no database pool configured for environment {environment}"))
    }
}

#[async_trait::async_trait]
impl LedgerSource for PgLedgerSource {
    async fn list_unlinked_source_records(
        &self,
        environment: Environment,
        range: &ReconciliationRange,
    ) -> Result<Vec<SourceRecord>> {
        let pool = self.pool(environment)?;
        let records = load_source_records(pool, range).await?;
        debug!(%environment, %range, records = records.len(), "source query done");
        Ok(records)
    }

    async fn load_base_rows_for_tickets(
        &self,
        environment: Environment,
        ticket_ids: &BTreeSet<String>,
    ) -> Result<Vec<BaseRow>> {
        let pool = self.pool(environment)?;
        let rows = load_base_rows(pool, ticket_ids).await?;
        debug!(%environment, tickets = ticket_ids.len(), rows = rows.len(), "base query done");
        Ok(rows)
    }
}
