use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use orc_reconcile::{Environment, ReconciliationRange, ReconciliationReport, ReconciliationSummary};

pub const SCHEMA_VERSION: i32 = 1;

pub const REPORT_JSON: &str = "report.json";
pub const DIFFS_CSV: &str = "diffs.csv";
pub const COMPARE_LOG_JSONL: &str = "compare_log.jsonl";
pub const MANIFEST_JSON: &str = "manifest.json";

pub const DIFFS_CSV_HEADER: [&str; 5] = ["ticket_id", "approval_type", "field", "source", "base"];

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub environment: Environment,
    pub range: ReconciliationRange,
    pub config_hash: String,
    pub created_at_utc: DateTime<Utc>,
    pub summary: ReconciliationSummary,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactList {
    pub report_json: String,
    pub diffs_csv: String,
    pub compare_log_jsonl: String,
    pub manifest_json: String,
}

impl Default for ArtifactList {
    fn default() -> Self {
        Self {
            report_json: REPORT_JSON.to_string(),
            diffs_csv: DIFFS_CSV.to_string(),
            compare_log_jsonl: COMPARE_LOG_JSONL.to_string(),
            manifest_json: MANIFEST_JSON.to_string(),
        }
    }
}

pub struct WriteReportArgs<'a> {
    pub exports_root: &'a Path, // e.g. ./exports
    pub run_id: Uuid,
    pub config_hash: &'a str,
    pub report: &'a ReconciliationReport,
}

#[derive(Debug)]
pub struct WriteReportResult {
    pub run_dir: PathBuf,
    pub manifest_path: PathBuf,
}

/// Write every artifact of one run under `exports/<run_id>/`. Existing files
/// are overwritten.
pub fn write_report_artifacts(args: WriteReportArgs<'_>) -> Result<WriteReportResult> {
    let run_dir = args.exports_root.join(args.run_id.to_string());
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let report_path = run_dir.join(REPORT_JSON);
    let json = serde_json::to_string_pretty(args.report).context("serialize report failed")?;
    fs::write(&report_path, format!("{json}\n"))
        .with_context(|| format!("write report failed: {}", report_path.display()))?;

    write_diffs_csv(&run_dir.join(DIFFS_CSV), args.report)?;
    write_compare_log(&run_dir.join(COMPARE_LOG_JSONL), args.report)?;

    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        run_id: args.run_id,
        environment: args.report.environment,
        range: args.report.range,
        config_hash: args.config_hash.to_string(),
        created_at_utc: Utc::now(),
        summary: args.report.summary,
        artifacts: ArtifactList::default(),
    };

    let manifest_path = run_dir.join(MANIFEST_JSON);
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest failed")?;
    fs::write(&manifest_path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", manifest_path.display()))?;

    Ok(WriteReportResult {
        run_dir,
        manifest_path,
    })
}

/// One row per diff; an absent side is an empty cell.
fn write_diffs_csv(path: &Path, report: &ReconciliationReport) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("open diffs csv failed: {}", path.display()))?;
    w.write_record(DIFFS_CSV_HEADER)
        .context("write diffs csv header failed")?;
    for d in &report.diffs {
        w.write_record([
            d.ticket_id.as_str(),
            d.approval_type.as_code(),
            d.field.as_str(),
            d.source.as_deref().unwrap_or(""),
            d.base.as_deref().unwrap_or(""),
        ])
        .with_context(|| format!("write diffs csv row failed: ticket {}", d.ticket_id))?;
    }
    w.flush()
        .with_context(|| format!("flush diffs csv failed: {}", path.display()))?;
    Ok(())
}

fn write_compare_log(path: &Path, report: &ReconciliationReport) -> Result<()> {
    let mut f = fs::File::create(path)
        .with_context(|| format!("create compare log failed: {}", path.display()))?;
    for entry in &report.log {
        let line = serde_json::to_string(entry).context("serialize compare log entry failed")?;
        writeln!(f, "{line}")
            .with_context(|| format!("write compare log failed: {}", path.display()))?;
    }
    Ok(())
}
