//! wgt-import - Chat history importer
//!
//! Reads a group chat export, rebuilds every player's complete score history
//! (missing days filled in as failures) and writes it to the score store
//! and/or a PostgreSQL script. Safe to re-run: existing scores are never
//! changed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wgt_common::config::{self, ConfigSource, TomlConfig};
use wgt_import::emit::{self, sql_script, ApplyReport, SqliteScoreStore, UpsertOperation};
use wgt_import::pipeline::{self, PipelineConfig};

/// Command-line arguments for wgt-import
#[derive(Parser, Debug)]
#[command(name = "wgt-import")]
#[command(about = "Import historical Wordle scores from a group chat export")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a chat export and import the reconciled scores
    Run(RunArgs),

    /// Write a starter configuration file
    InitConfig {
        /// Destination (defaults to the per-user config location)
        path: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Chat export text file
    chat: PathBuf,

    /// Configuration file (alias table, anchor date) [default: $WGT_CONFIG, then user config]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite score database [default: $WGT_DATABASE, then config, then user data dir]
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Also write the operations as a PostgreSQL script
    #[arg(long)]
    sql_out: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Do not touch the database
    #[arg(long)]
    dry_run: bool,

    /// Create players from the alias table before importing
    #[arg(long)]
    seed_players: bool,
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn log_banner() {
    info!(
        "Starting wgt-import v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Run(run_args) => run(run_args).await,
        Command::InitConfig { path } => {
            init_tracing("info");
            log_banner();
            init_config(path)
        }
    }
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::default_config_path().context("Could not determine config directory")?,
    };

    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    config::write_toml_config(&TomlConfig::example(), &path)?;
    info!("Edit the [[alias]] entries to match your chat, then run `wgt-import run <chat>`");
    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    // Configuration first so its log level applies
    let (toml_config, source) = config::load_config(args.config.as_deref())?;

    init_tracing(&toml_config.logging.level);
    log_banner();

    match &source {
        ConfigSource::CompiledDefaults => {
            warn!("No configuration file found; using compiled defaults (empty alias table)")
        }
        other => info!("Configuration: {}", other),
    }

    let pipeline_config = PipelineConfig::from_toml(&toml_config);
    for (longer, shorter) in pipeline_config.aliases.overlapping_names() {
        warn!(
            "Alias {:?} contains alias {:?}; the earlier entry wins for matching senders",
            longer, shorter
        );
    }

    // Whole input is read before processing begins
    info!("Chat export: {}", args.chat.display());
    let text = pipeline::read_chat(&args.chat)?;

    let mut output = pipeline::run(&text, &pipeline_config);

    if let Some(path) = &args.sql_out {
        pipeline::write_output(path, &sql_script::render(&output.operations))?;
        info!(
            "SQL file generated: {} ({} INSERT statements)",
            path.display(),
            output.operations.len()
        );
    }

    let stored = if args.dry_run {
        info!("Dry run: database not modified");
        None
    } else {
        let db_path = config::resolve_database_path(args.database.as_deref(), &toml_config);
        Some(store_operations(&db_path, args.seed_players, &pipeline_config, &output.operations).await)
    };

    if let Some(Ok(report)) = &stored {
        output.summary.apply = Some(report.clone());
    }

    // Diagnostics are reported even when the store step failed
    output.summary.log();

    if let Some(path) = &args.summary_json {
        output.summary.write_json(path)?;
        info!("Summary written: {}", path.display());
    }

    match stored {
        Some(Err(e)) => Err(e.context("Import aborted; re-running is safe")),
        _ => Ok(()),
    }
}

async fn store_operations(
    db_path: &Path,
    seed_players: bool,
    pipeline_config: &PipelineConfig,
    operations: &[UpsertOperation],
) -> Result<ApplyReport> {
    let pool = wgt_common::db::init_database(db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let store = SqliteScoreStore::new(pool);

    if seed_players {
        let created = store.seed_players(&pipeline_config.aliases.players()).await?;
        info!("Seeded {} new players", created);
    }

    let report = emit::apply(&store, operations).await;
    store.pool().close().await;
    Ok(report?)
}
