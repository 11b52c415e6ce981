//! `orc reconcile`: one run against one environment.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use orc_artifacts::{write_report_artifacts, WriteReportArgs};
use orc_db::PgLedgerSource;
use orc_reconcile::{run_reconciliation, ReconciliationRange};

use super::{connect, load_config, parse_day, parse_environment, payment_rules};

pub struct ReconcileArgs {
    pub env: String,
    pub start: String,
    pub end: String,
    pub config_paths: Vec<String>,
    pub out: Option<PathBuf>,
    pub fail_on_diff: bool,
    pub strict_config: bool,
}

pub async fn run(args: ReconcileArgs) -> Result<()> {
    // Arguments and range are validated before any connection is opened.
    let environment = parse_environment(&args.env)?;
    let start = parse_day("start", &args.start)?;
    let end = parse_day("end", &args.end)?;
    let range = ReconciliationRange::from_dates(start, end).context("invalid --start/--end")?;

    let (loaded, cfg) = load_config(&args.config_paths, args.strict_config)?;
    let rules = payment_rules(&cfg.reconcile);
    let pool = connect(&cfg, environment).await?;
    let source = PgLedgerSource::new().with_pool(environment, pool);

    let report = run_reconciliation(&source, environment, start, end, &rules).await?;

    let exports_root = args.out.unwrap_or_else(|| PathBuf::from(&cfg.exports.root));
    let run_id = Uuid::new_v4();
    let written = write_report_artifacts(WriteReportArgs {
        exports_root: &exports_root,
        run_id,
        config_hash: &loaded.config_hash,
        report: &report,
    })?;
    info!(%run_id, dir = %written.run_dir.display(), "artifacts written");

    println!("run_id={run_id}");
    println!("env={environment}");
    println!("range={range}");
    println!("config_hash={}", loaded.config_hash);
    println!("total_compared={}", report.summary.total_compared);
    println!("total_diff={}", report.summary.total_diff);
    println!("diff_found={}", report.summary.diff_found);
    println!("artifacts_dir={}", written.run_dir.display());

    if args.fail_on_diff && !report.is_clean() {
        bail!(
            "DIFF_FOUND: {} diff(s) in {} for {}",
            report.summary.total_diff,
            environment,
            range
        );
    }
    Ok(())
}
