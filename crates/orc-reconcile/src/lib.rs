//! orc-reconcile
//!
//! Ledger reconciliation engine.
//!
//! For a date range, every source-ledger record not yet linked to the base
//! ledger is matched to its base counterpart (approval or cancellation leg,
//! by amount sign), both sides are normalized into one comparable field set,
//! and every field-level discrepancy is reported together with summary counts.
//!
//! - Two bulk reads per run, both behind [`LedgerSource`]. Everything else is
//!   pure, deterministic, in-memory computation.
//! - A missing base counterpart is a finding, not an error.
//! - Unparseable field values normalize to absent; they never abort a run.

pub mod differ;
mod engine;
pub mod matcher;
pub mod normalize;
pub mod partition;
mod range;
mod report;
mod source;
mod types;

pub use engine::{compare_all, run_reconciliation, ReconcileError};
pub use normalize::PaymentRules;
pub use range::{RangeError, ReconciliationRange};
pub use report::ReportBuilder;
pub use source::LedgerSource;
pub use types::*;
