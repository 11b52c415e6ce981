//! PostgreSQL access for both ledgers.
//!
//! Plain `sqlx::query()` + binds, no compile-time macros: the ledgers belong
//! to other systems and are not migrated from here.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

mod decode;
mod ledger;

pub use decode::{canonical_decimal, canonical_float, cell_kind, CellKind};
pub use ledger::{
    load_base_rows, load_source_records, PgLedgerSource, BASE_ROWS_SQL, SOURCE_RECORDS_SQL,
};

/// Env var read by [`testkit_db_pool`] for DB-backed tests.
pub const ENV_TEST_DB_URL: &str = "ORC_TEST_DATABASE_URL";

/// Relations read by a reconciliation run.
pub const LEDGER_TABLES: &[&str] = &["vtb_dms_order", "tb_order", "tb_trade"];

/// Open a pool against `url`. The URL itself never appears in errors or logs.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Pool for DB-backed tests, from `ORC_TEST_DATABASE_URL`.
pub async fn testkit_db_pool() -> Result<PgPool> {
    let url = std::env::var(ENV_TEST_DB_URL)
        .with_context(|| format!("missing env var {ENV_TEST_DB_URL}"))?;
    connect(&url, 2).await
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    /// `(relation, exists)` for every entry of [`LEDGER_TABLES`], in order.
    pub tables: Vec<(String, bool)>,
}

impl DbStatus {
    pub fn ledgers_present(&self) -> bool {
        self.tables.iter().all(|(_, exists)| *exists)
    }
}

/// Connectivity plus presence of the ledger relations (tables or views).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let mut tables = Vec::with_capacity(LEDGER_TABLES.len());
    for name in LEDGER_TABLES {
        let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
            r#"
            select exists (
                select 1
                from information_schema.tables
                where table_schema = current_schema() and table_name = $1
            )
            "#,
        )
        .bind(*name)
        .fetch_one(pool)
        .await
        .with_context(|| format!("status table-exists query failed: {name}"))?;
        tables.push((name.to_string(), exists));
    }

    Ok(DbStatus {
        ok: one == 1,
        tables,
    })
}
