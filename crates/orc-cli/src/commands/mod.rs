//! Command handler modules for the `orc` binary.
//!
//! Shared argument parsing and wiring live here; command-specific logic
//! lives in the submodules.

pub mod reconcile;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use orc_config::{LoadedConfig, ReconConfig, ReconcileSection, UnusedKeyPolicy};
use orc_db::PgPool;
use orc_reconcile::{Environment, PaymentRules};
use tracing::warn;

/// Parse `--env` into an [`Environment`].
pub fn parse_environment(s: &str) -> Result<Environment> {
    Environment::parse(s)
        .with_context(|| format!("invalid --env '{}'. expected one of: stage | prod", s.trim()))
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_day(flag: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid --{flag} '{s}'. expected YYYY-MM-DD"))
}

/// Load layered config, run the unused-key guard and build the typed view.
pub fn load_config(paths: &[String], strict: bool) -> Result<(LoadedConfig, ReconConfig)> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = orc_config::load_layered_yaml(&path_refs)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = orc_config::report_unused_keys(&loaded.config_json, policy)?;
    for leaf in &report.unused_leaf_pointers {
        warn!(key = %leaf, "config key is not read by orc");
    }

    let cfg = ReconConfig::from_json(&loaded.config_json)?;
    Ok((loaded, cfg))
}

pub fn payment_rules(section: &ReconcileSection) -> PaymentRules {
    PaymentRules {
        cash_like: section.cash_payment_types.clone(),
        aliases: section.payment_aliases.clone(),
    }
}

/// Resolve the environment's database URL and open its pool.
pub async fn connect(cfg: &ReconConfig, environment: Environment) -> Result<PgPool> {
    let ledger = cfg.ledger(environment.as_str())?;
    let url = orc_config::resolve_database_url(&ledger.database_url_env)?;
    orc_db::connect(&url.url, ledger.max_connections)
        .await
        .with_context(|| format!("connect {environment} ledger (url from {})", url.env_var))
}
