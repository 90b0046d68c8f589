use anyhow::{Context, Result};
use clap::Parser;
use sharedpanel::{
    Category, HostBridge, HostMessage, MemoryBridge, PanelConfig, PanelData, StdioBridge,
    TextFormat, bridge,
};
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "dm-sharedpanel")]
#[command(about = "Game-data table editor for the DM host", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Editor format to start in (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<TextFormat>,

    /// Category tab to start on (overrides config)
    #[arg(short, long, value_enum)]
    tab: Option<Category>,

    /// Log file (overrides config; stdout is reserved for the host protocol)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Run without a host: requests are only logged and the panel starts open
    #[arg(long)]
    standalone: bool,

    /// Snapshot JSON to load at startup (mainly for --standalone)
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = match &cli.config {
            Some(p) => p.clone(),
            None => PanelConfig::default_path()?,
        };
        PanelConfig::default().save(&path)?;
        eprintln!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = PanelConfig::load(cli.config.as_deref())?;
    if let Some(format) = cli.format {
        config.default_format = format;
    }
    if let Some(tab) = cli.tab {
        config.default_tab = tab;
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }

    // Initialize logging to file (use RUST_LOG env var to control level, e.g. RUST_LOG=debug)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {:?}", config.log_file))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    tracing::info!(?config, standalone = cli.standalone, "starting panel");

    let (tx, rx) = mpsc::channel::<HostMessage>();

    if let Some(path) = &cli.data {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        let data: PanelData =
            serde_json::from_str(&text).with_context(|| format!("parsing {path:?}"))?;
        tracing::info!(entries = data.entry_count(), "seeded snapshot from {:?}", path);
        tx.send(HostMessage::Populate(Some(data)))
            .context("queueing seeded snapshot")?;
    }

    let bridge: Box<dyn HostBridge> = if cli.standalone {
        drop(tx);
        Box::new(MemoryBridge::default())
    } else {
        let stdin = std::io::BufReader::new(std::io::stdin());
        bridge::spawn_reader(stdin, tx).context("starting host reader")?;
        Box::new(StdioBridge::stdout())
    };

    sharedpanel::run_gui(config, bridge, rx, cli.standalone)
        .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
