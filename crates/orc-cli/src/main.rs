use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "orc")]
#[command(about = "Order ledger reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile unlinked source-ledger records of a date range against the base ledger
    Reconcile {
        /// Ledger environment (stage | prod). Required; there is no default.
        #[arg(long)]
        env: String,

        /// First calendar day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last calendar day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Exports root; overrides `exports.root` from config
        #[arg(long)]
        out: Option<PathBuf>,

        /// Exit non-zero when any diff is found
        #[arg(long, default_value_t = false)]
        fail_on_diff: bool,

        /// Fail (instead of warn) on config keys nothing reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env overlay ...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Connectivity and presence of the ledger tables
    Status {
        #[arg(long)]
        env: String,

        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent when absent; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Reconcile {
            env,
            start,
            end,
            config_paths,
            out,
            fail_on_diff,
            strict_config,
        } => {
            commands::reconcile::run(commands::reconcile::ReconcileArgs {
                env,
                start,
                end,
                config_paths,
                out,
                fail_on_diff,
                strict_config,
            })
            .await?;
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = orc_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Db { cmd } => match cmd {
            DbCmd::Status { env, config_paths } => {
                let environment = commands::parse_environment(&env)?;
                let (_, cfg) = commands::load_config(&config_paths, false)?;
                let pool = commands::connect(&cfg, environment).await?;
                let s = orc_db::status(&pool).await?;
                println!("env={}", environment);
                println!("db_ok={}", s.ok);
                for (table, exists) in &s.tables {
                    println!("table.{table}={exists}");
                }
                if !s.ledgers_present() {
                    anyhow::bail!("DB_STATUS: ledger relations missing in {environment}");
                }
            }
        },
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the `key=value` results.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
