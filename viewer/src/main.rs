//! Coin Market Live Viewer
//!
//! Polls the snapshot artifact on a timer and renders each tick:
//! - Chart series and bounds for an external plotter
//! - Price table with dense ranks or budget grants
//! - Optional in-process producer over a watch channel

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use coinmarket_core::{RankingMode, Roster};
use coinmarket_env::{snapshot_channel, FileSnapshotStore, SnapshotSource, TokioContext};
use coinmarket_sim::{
    ConsumerConfig, JsonFileSink, LogSink, ProducerConfig, RenderSink, SnapshotConsumer,
    SnapshotProducer,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Dense ranks by current price
    Rank,
    /// Greedy wishlist allocation against the budget
    Budget,
}

/// Coin market live viewer
#[derive(Parser, Debug)]
#[command(name = "coinmarket-viewer")]
#[command(about = "Render live coin price snapshots", long_about = None)]
struct Args {
    /// Simulation horizon
    #[arg(long = "max_round", default_value = "60")]
    max_round: u64,

    /// Budget for budget mode
    #[arg(long = "total_budgets", default_value = "1000000")]
    total_budgets: f64,

    /// Table mode
    #[arg(long, value_enum, default_value = "budget")]
    mode: Mode,

    /// Roster CSV with `coin` and `wishlist_won` columns
    #[arg(long, default_value = "wishlist.csv")]
    roster: PathBuf,

    /// Snapshot artifact path
    #[arg(long, default_value = "coin_brownian.json")]
    snapshot: PathBuf,

    /// Polling period in milliseconds
    #[arg(long = "interval_ms", default_value = "2000")]
    interval_ms: u64,

    /// Run the producer in this process over a watch channel
    #[arg(long = "in_process")]
    in_process: bool,

    /// Producer pacing in in-process mode
    #[arg(long = "round_interval_secs", default_value = "20")]
    round_interval_secs: u64,

    /// Also write each payload as JSON to this file
    #[arg(long = "render_out")]
    render_out: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let roster = Roster::load(&args.roster)
        .with_context(|| format!("loading roster {}", args.roster.display()))?;

    let mode = match args.mode {
        Mode::Rank => RankingMode::Dense,
        Mode::Budget => RankingMode::Budget {
            total_budget: args.total_budgets,
        },
    };
    let config = ConsumerConfig::default()
        .with_max_round(args.max_round)
        .with_poll_interval(Duration::from_millis(args.interval_ms))
        .with_mode(mode);

    let mut sinks: Vec<Box<dyn RenderSink>> = vec![Box::new(LogSink)];
    if let Some(path) = &args.render_out {
        info!("Writing render payloads to {}", path.display());
        sinks.push(Box::new(JsonFileSink::new(path)));
    }

    if args.in_process {
        let (tx, rx) = snapshot_channel();
        let producer_config = ProducerConfig::default()
            .with_max_round(args.max_round)
            .with_round_interval(Duration::from_secs(args.round_interval_secs));
        let mut producer =
            SnapshotProducer::new(TokioContext::shared(), Arc::new(tx), roster.clone(), producer_config)?;

        info!("Running producer in-process");
        let handle = tokio::spawn(async move { producer.run().await });

        view(Arc::new(rx), &roster, config, &mut sinks).await?;
        handle.abort();
    } else {
        info!("Polling {}", args.snapshot.display());
        view(Arc::new(FileSnapshotStore::new(&args.snapshot)), &roster, config, &mut sinks).await?;
    }

    Ok(())
}

async fn view<S: SnapshotSource>(
    source: Arc<S>,
    roster: &Roster,
    config: ConsumerConfig,
    sinks: &mut Vec<Box<dyn RenderSink>>,
) -> Result<()> {
    let mut consumer = SnapshotConsumer::new(source, roster, config)?;
    let report = consumer
        .run(sinks, shutdown_on(tokio::signal::ctrl_c()))
        .await;
    info!(
        "Viewer stopped after {} ticks ({} rendered, {} not ready, {} corrupt)",
        report.ticks, report.rendered, report.not_ready, report.corrupt
    );
    Ok(())
}

/// Completes when `signal` fires. If the handler cannot be installed the
/// viewer keeps running until the process is killed.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
