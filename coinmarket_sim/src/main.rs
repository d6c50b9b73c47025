//! Coin Market Snapshot Producer CLI
//!
//! Simulates one GBM price path per roster coin and publishes a growing
//! prefix of it to the snapshot artifact every round.

use clap::Parser;
use coinmarket_core::{GbmParams, Roster};
use coinmarket_env::{FileSnapshotStore, TokioContext};
use coinmarket_sim::{ProducerConfig, SnapshotProducer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Coin market snapshot producer
#[derive(Parser, Debug)]
#[command(name = "coinmarket-producer")]
#[command(about = "Publish simulated coin price paths round by round", long_about = None)]
struct Args {
    /// Number of rounds, also the simulation horizon
    #[arg(long = "max_round", default_value = "60")]
    max_round: u64,

    /// Roster CSV with `coin` and `wishlist_won` columns
    #[arg(long, default_value = "wishlist.csv")]
    roster: String,

    /// Snapshot artifact path
    #[arg(long, default_value = "coin_brownian.json")]
    snapshot: String,

    /// Seconds between rounds
    #[arg(long = "round_interval_secs", default_value = "20")]
    round_interval_secs: u64,

    /// Initial price
    #[arg(long, default_value = "100.0")]
    s0: f64,

    /// Drift
    #[arg(long, default_value = "0.2", allow_hyphen_values = true)]
    mu: f64,

    /// Volatility
    #[arg(long, default_value = "0.62")]
    sigma: f64,

    /// Extra publish attempts before a round is skipped
    #[arg(long = "write_retries", default_value = "3")]
    write_retries: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let roster = match Roster::load(&args.roster) {
        Ok(roster) => roster,
        Err(e) => {
            error!("Failed to load roster {}: {}", args.roster, e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} coins from {}", roster.len(), args.roster);

    let config = ProducerConfig::default()
        .with_max_round(args.max_round)
        .with_round_interval(Duration::from_secs(args.round_interval_secs))
        .with_gbm(GbmParams::new(args.s0, args.mu, args.sigma))
        .with_write_retries(args.write_retries, Duration::from_millis(250));

    let sink = Arc::new(FileSnapshotStore::new(&args.snapshot));
    let mut producer = match SnapshotProducer::new(TokioContext::shared(), sink, roster, config) {
        Ok(producer) => producer,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Publishing to {}", args.snapshot);
    let report = producer.run().await;

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize report: {}", e),
        }
    } else {
        info!(
            "Done: {} published, {} skipped, {} entity failures",
            report.rounds_published, report.rounds_skipped, report.entity_failures
        );
    }
}
