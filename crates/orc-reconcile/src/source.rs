//! Data-source boundary.
//!
//! The engine never talks to a database directly; a [`LedgerSource`] performs
//! the two bulk reads of a run. Implementations surface transport and query
//! failures as `Err`, never as an empty result.

use std::collections::BTreeSet;

use anyhow::Result;

use crate::{BaseRow, Environment, ReconciliationRange, SourceRecord};

#[async_trait::async_trait]
pub trait LedgerSource: Send + Sync {
    /// Source-ledger rows modified inside `range` and not yet linked to the
    /// base ledger, in a stable order.
    async fn list_unlinked_source_records(
        &self,
        env: Environment,
        range: &ReconciliationRange,
    ) -> Result<Vec<SourceRecord>>;

    /// Every order x payment row for the given tickets, ordered by
    /// `(ticket asc, amount desc)`. One query regardless of set size.
    async fn load_base_rows_for_tickets(
        &self,
        env: Environment,
        ticket_ids: &BTreeSet<String>,
    ) -> Result<Vec<BaseRow>>;
}
