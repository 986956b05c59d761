use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use scened::engine::ChannelDispatcher;
use scened::light::AttributeSpec;
use scened::Config;
use scened::Dispatcher;
use scened::EntityState;
use scened::Reproducer;
use scened::StateStore;
use tokio::task::JoinHandle;
use tracing_subscriber::prelude::*;

const DEFAULT_CONFIG: &str = "scened.toml";

#[derive(Debug, Parser)]
#[command(name = "scened", version, about = "Reproduce light scenes")]
struct Cli {
    /// Path to the TOML configuration file (default: scened.toml, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the commands that bring the current states in line with a scene
    Reproduce {
        /// JSON array of observed light states
        #[arg(long)]
        current: PathBuf,

        /// JSON array of desired light states
        #[arg(long)]
        desired: PathBuf,
    },

    /// Run the HTTP API, and the MQTT bridge if configured
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // Logs go to stderr so `reproduce` output stays machine readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(config.logging.filter())
        .init();

    let spec = Arc::new(AttributeSpec::standard());

    match cli.command {
        Command::Reproduce { current, desired } => reproduce(spec, &current, &desired).await,
        Command::Serve => serve(spec, config).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None if Path::new(DEFAULT_CONFIG).exists() => Ok(Config::from_file(DEFAULT_CONFIG)?),
        None => Ok(Config::default()),
    }
}

fn read_states(path: &Path) -> anyhow::Result<Vec<EntityState>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn reproduce(spec: Arc<AttributeSpec>, current: &Path, desired: &Path) -> anyhow::Result<()> {
    let store = StateStore::from_states(read_states(current)?);
    let desired = read_states(desired)?;

    let (dispatcher, mut rx) = ChannelDispatcher::new();
    let reproducer = Reproducer::new(spec, Arc::new(store), Arc::new(dispatcher));

    let report = reproducer.reproduce(desired).await;

    while let Ok(cmd) = rx.try_recv() {
        println!("{}", serde_json::to_string(&cmd)?);
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} entities failed to reproduce", report.failed.len());
    }
    Ok(())
}

async fn serve(spec: Arc<AttributeSpec>, config: Config) -> anyhow::Result<()> {
    tracing::info!("scened starting");

    let store = Arc::new(StateStore::new());
    let (dispatcher, bridge_task) = start_dispatcher(&config, &store).await?;
    let reproducer = Arc::new(Reproducer::new(spec, Arc::clone(&store), dispatcher));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let api = tokio::spawn(scened::api::serve(
        config.api.listen.clone(),
        config.api.port,
        reproducer,
        shutdown_rx,
    ));

    tracing::info!("Press Ctrl+C to exit");
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }

    shutdown_tx.send(()).ok();
    let result = api.await.context("HTTP API task failed")?;

    if let Some(task) = bridge_task {
        task.abort();
    }

    result.map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("scened shutdown complete");
    Ok(())
}

/// Pick the dispatcher for `serve`: the MQTT bridge when configured,
/// otherwise a channel whose commands are only logged.
async fn start_dispatcher(
    config: &Config,
    store: &Arc<StateStore>,
) -> anyhow::Result<(Arc<dyn Dispatcher>, Option<JoinHandle<()>>)> {
    if let Some((bridge, task)) = start_bridge(config, store).await? {
        return Ok((bridge, Some(task)));
    }

    tracing::warn!("No MQTT bridge configured, commands will only be logged");
    let (dispatcher, mut rx) = ChannelDispatcher::new();
    let task = tokio::spawn(async move {
        while let Some(cmd) = rx.recv().await {
            tracing::info!("Command: {}", serde_json::to_string(&cmd).unwrap_or_default());
        }
    });
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(dispatcher);
    Ok((dispatcher, Some(task)))
}

#[cfg(feature = "integration_mqtt")]
async fn start_bridge(
    config: &Config,
    store: &Arc<StateStore>,
) -> anyhow::Result<Option<(Arc<dyn Dispatcher>, JoinHandle<()>)>> {
    let Some(mqtt) = &config.mqtt else {
        return Ok(None);
    };

    let bridge = scened::integrations::mqtt::connect(mqtt).await?;
    let task = tokio::spawn(Arc::clone(&bridge).run(Arc::clone(store)));
    let dispatcher: Arc<dyn Dispatcher> = bridge;
    Ok(Some((dispatcher, task)))
}

#[cfg(not(feature = "integration_mqtt"))]
async fn start_bridge(
    _config: &Config,
    _store: &Arc<StateStore>,
) -> anyhow::Result<Option<(Arc<dyn Dispatcher>, JoinHandle<()>)>> {
    Ok(None)
}
