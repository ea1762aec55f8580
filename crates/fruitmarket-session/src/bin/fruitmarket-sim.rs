//! Scripted market session.
//!
//! Plays the offers and purchases of a JSON script through a game session
//! and prints the session export as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fruitmarket_export::{ExportRegistry, export_session_json, live_table};
use fruitmarket_session::{GameSession, Script, play};
use fruitmarket_types::GameConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fruitmarket-sim")]
#[command(about = "Play a scripted fruit market session and export the results")]
struct Args {
    /// Game configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Round script (JSON)
    #[arg(long)]
    script: PathBuf,

    /// Print the live table instead of the nested export
    #[arg(long)]
    table: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let script = Script::from_json_file(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;

    let mut session = GameSession::new(config).context("starting session")?;
    let receipts = play(&mut session, &script).context("playing script")?;
    info!(rounds = receipts.len(), "Script complete");

    let snapshot = session.snapshot();
    let output = if args.table {
        let registry = ExportRegistry::standard().context("building export registry")?;
        serde_json::to_value(live_table(&snapshot, &registry).to_records())?
    } else {
        export_session_json(&snapshot)
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
