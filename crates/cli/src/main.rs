//! wxarchive: nightly weather and seeing archive pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wxarchive_core::{load_config, validate_config, ArchivePipeline, RunRequest, SanitizedConfig};

/// Environment variable naming the config file when `--config` is absent.
const CONFIG_ENV: &str = "WXARCHIVE_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "wxarchive", version, about = "Nightly weather and seeing archive pipeline")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Archive one observing date
    Run {
        /// Archive root directory
        archive_root: PathBuf,

        /// UT date (YYYY-MM-DD or YYYY/MM/DD); defaults to today
        date: Option<String>,

        /// Skip all ledger updates
        #[arg(long)]
        no_ledger: bool,

        /// Config file path
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli.command).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// `--config`, else `$WXARCHIVE_CONFIG`, else `config.toml`.
fn resolve_config_path(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Run {
            archive_root,
            date,
            no_ledger,
            config,
        } => {
            let config_path = resolve_config_path(config, std::env::var(CONFIG_ENV).ok());

            info!("Loading configuration from {:?}", config_path);
            let config = load_config(&config_path)
                .with_context(|| format!("Failed to load config from {:?}", config_path))?;
            validate_config(&config).context("Configuration validation failed")?;
            debug!(config = ?SanitizedConfig::from(&config), "Configuration loaded");

            let pipeline = ArchivePipeline::from_config(Arc::new(config))
                .context("Failed to create pipeline")?;

            let request = RunRequest {
                archive_root,
                date,
                ledger_enabled: !no_ledger,
            };
            let summary = pipeline.run(request).await.context("Archive session aborted")?;

            info!(
                "Archived {} into {} with {} error(s)",
                summary.date,
                summary.session_dir.display(),
                summary.error_count
            );
            Ok(())
        }
    }
}
