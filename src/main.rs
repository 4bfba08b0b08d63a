mod mmdc;
mod session;
mod sink;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use viewer::config::{ConfigError, ViewerConfig};
use viewer::engine::DiagramEngine;
use viewer::fullscreen::KeyBus;
use viewer::viewer::{DiagramViewer, ViewerSurface};

use crate::mmdc::MermaidCli;
use crate::session::SessionCommand;
use crate::sink::FileSink;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("stdin read failed: {0}")]
    Stdin(std::io::Error),
    #[error("diagram failed to render ({code})")]
    Render { code: &'static str },
    #[error("rendered diagram could not be written to {}", path.display())]
    Write { path: PathBuf },
}

#[derive(Parser, Debug)]
#[command(name = "docview", about = "Headless host for the interactive diagram viewer")]
struct Cli {
    /// Mermaid CLI executable used as the rendering engine.
    #[arg(long, env = "DOCVIEW_MMDC", default_value = "mmdc")]
    mmdc: PathBuf,

    /// Scratch directory for engine input/output files.
    #[arg(long, env = "DOCVIEW_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Where the mounted SVG is written.
    #[arg(long, short, env = "DOCVIEW_OUT", default_value = "diagram.svg")]
    out: PathBuf,

    /// Overrides `DOCVIEW_RENDER_TIMEOUT_SECS`; 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a diagram file once.
    Render { file: PathBuf },
    /// Render a diagram file, then read interaction commands from stdin.
    Session { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ViewerConfig::from_env()?;
    if let Some(secs) = cli.timeout_secs {
        config.render_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let work_dir = cli.work_dir.unwrap_or_else(|| std::env::temp_dir().join("docview"));
    let engine: Arc<dyn DiagramEngine> = Arc::new(MermaidCli::probe(cli.mmdc, work_dir).await);
    let bus = KeyBus::new();
    let mut viewer = DiagramViewer::new(Some(engine), FileSink::new(cli.out), bus.clone(), &config);
    viewer.set_on_fullscreen_change(Box::new(|mode| tracing::info!(?mode, "host notified of presentation change")));

    match cli.command {
        Command::Render { file } => render(&mut viewer, &file).await,
        Command::Session { file } => {
            render(&mut viewer, &file).await?;
            run_session(&mut viewer, &bus).await
        }
    }
}

async fn render(viewer: &mut DiagramViewer<FileSink>, file: &Path) -> Result<(), CliError> {
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CliError::Read { path: file.to_owned(), source })?;

    tracing::info!(id = viewer.id(), file = %file.display(), "rendering diagram");
    viewer.set_source(text);
    viewer.settle().await;

    println!("{}", session::describe(viewer));
    match viewer.surface() {
        ViewerSurface::Error(panel) => Err(CliError::Render { code: panel.code }),
        ViewerSurface::Interactive { .. } if !viewer.sink().is_mounted() => {
            Err(CliError::Write { path: viewer.sink().path().to_owned() })
        }
        ViewerSurface::Loading | ViewerSurface::Interactive { .. } => Ok(()),
    }
}

async fn run_session(viewer: &mut DiagramViewer<FileSink>, bus: &KeyBus) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(CliError::Stdin)? {
        if line.trim_start().starts_with('#') {
            continue;
        }
        match line.parse::<SessionCommand>() {
            Ok(command) => {
                let actions = session::apply(viewer, bus, &command);
                tracing::debug!(?command, ?actions, "session command applied");
                println!("{}", session::describe(viewer));
            }
            Err(error) => eprintln!("docview: {error}"),
        }
    }
    Ok(())
}
