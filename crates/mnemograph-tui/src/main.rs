use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use ratatui::widgets::Block;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mnemograph::config::Config;
use mnemograph::graph::GraphMode;
use mnemograph::scheduler::{Scheduler, TickKind};
use mnemograph::source::{FileSnapshotSource, SnapshotSource};
use mnemograph::view::{GraphView, now_unix};
use mnemograph_tui::event::{Event, spawn_terminal_events};
use mnemograph_tui::{App, Tui, ui};

#[derive(Parser, Debug)]
#[command(name = "mnemograph-tui")]
#[command(about = "Interactive terminal viewer for memory-retention graphs")]
#[command(version)]
struct Args {
    /// Snapshot JSON file to poll
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Layer naming scheme (vocabulary or article)
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<GraphMode>,
}

fn parse_mode(value: &str) -> Result<GraphMode, String> {
    match value {
        "vocabulary" => Ok(GraphMode::Vocabulary),
        "article" => Ok(GraphMode::Article),
        other => Err(format!("unknown mode '{other}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading config")?;
    if let Some(mode) = args.mode {
        config.viewer.mode = mode;
    }
    if let Some(path) = args.snapshot {
        config.viewer.snapshot_path = Some(path);
    }

    // Logs go to a file; stderr belongs to the terminal UI
    let _guard = init_logging(&config)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let source: Option<Arc<dyn SnapshotSource>> = config
        .viewer
        .snapshot_path
        .clone()
        .map(|path| Arc::new(FileSnapshotSource::new(path)) as Arc<dyn SnapshotSource>);
    if source.is_none() {
        tracing::warn!("No snapshot file given; showing an empty graph");
    }

    let mut scheduler = Scheduler::new();
    scheduler.spawn_periodic(
        TickKind::Clock,
        Duration::from_secs(config.viewer.clock_interval_secs),
        tx.clone(),
    )?;
    scheduler.spawn_periodic(
        TickKind::Curve,
        Duration::from_secs(config.curve.refresh_secs),
        tx.clone(),
    )?;
    if source.is_some() {
        scheduler.spawn_periodic(
            TickKind::Poll,
            Duration::from_secs(config.viewer.poll_interval_secs),
            tx.clone(),
        )?;
    }

    let view = GraphView::new(&config, now_unix());
    let mut app = App::new(view, source, tx.clone());

    let mut tui = Tui::new()?;
    tui.enter()?;
    let input = spawn_terminal_events(tx);

    app.request_snapshot();
    let result = run(&mut tui, &mut app, &mut rx).await;

    input.abort();
    scheduler.shutdown();
    tui.exit()?;
    result
}

async fn run(
    tui: &mut Tui,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> anyhow::Result<()> {
    let mut redraw = true;
    loop {
        if redraw {
            let areas = ui::areas(tui.area()?, app.view.selection().is_some());
            app.set_graph_area(Block::bordered().inner(areas.graph));
            tui.terminal().draw(|frame| ui::draw(frame, app, &areas))?;
        }

        let Some(event) = rx.recv().await else {
            break;
        };
        redraw = app.handle_event(event);

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    let path = match &config.viewer.log_file {
        Some(path) => path.clone(),
        None => dirs::data_local_dir()
            .context("no local data directory")?
            .join("mnemograph")
            .join("tui.log"),
    };
    let dir = path.parent().map(PathBuf::from).unwrap_or_default();
    let file_name = path
        .file_name()
        .context("log file path has no file name")?
        .to_owned();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mnemograph=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}
