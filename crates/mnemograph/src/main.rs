//! Mnemograph CLI - inspect and lay out retention graph snapshots

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mnemograph::cli::{InspectCommand, LayoutCommand, OutputFormat, ValidateCommand};
use mnemograph::config::Config;
use mnemograph::error::Result;

/// Mnemograph - lay out and inspect memory-retention graphs
#[derive(Parser)]
#[command(name = "mnemograph")]
#[command(about = "Lay out and inspect layered memory-retention graph snapshots")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Compute node positions for a snapshot")]
    Layout(LayoutCommand),

    #[clap(about = "Show retention details for one node")]
    Inspect(InspectCommand),

    #[clap(about = "Report malformed nodes and edges in a snapshot")]
    Validate(ValidateCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!("Config loaded: {:?}", config);

    match &cli.command {
        Command::Layout(cmd) => cmd.execute(&config, format).await,
        Command::Inspect(cmd) => cmd.execute(&config, format).await,
        Command::Validate(cmd) => cmd.execute(&config, format).await,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mnemograph=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
