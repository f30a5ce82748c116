use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use v2v_engine::{SimConfig, SimEngine, SimResult, TransferFloor};

#[derive(Parser, Debug)]
#[command(name = "v2v-engine")]
#[command(about = "Vehicle-to-vehicle wireless energy market simulation")]
struct Args {
    /// Scenario JSON file; unspecified fields keep their reference values
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Number of vehicles on the road
    #[arg(short, long)]
    agents: Option<usize>,

    /// Number of rounds to simulate
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Use the slow network profile instead of the fast one
    #[arg(long, default_value = "false")]
    slow_network: bool,

    /// Seed for the run's random source
    #[arg(long)]
    seed: Option<u64>,

    /// Never move more energy than the battery thresholds allow
    #[arg(long, default_value = "false")]
    strict_transfer: bool,

    /// Feed settled energy back into the pricing policy at this rate
    #[arg(long)]
    learning_rate: Option<f64>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("simulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> SimResult<()> {
    let mut config = match &args.scenario {
        Some(path) => {
            info!(path = %path.display(), "loading scenario");
            SimConfig::from_file(path)?
        }
        None => SimConfig::default(),
    };

    if let Some(agents) = args.agents {
        config.agent_count = agents;
    }
    if let Some(rounds) = args.rounds {
        config.round_count = rounds;
    }
    if args.slow_network {
        config.fast_network = false;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.strict_transfer {
        config.physics.transfer_floor = TransferFloor::Strict;
    }
    if args.learning_rate.is_some() {
        config.market.price_learning_rate = args.learning_rate;
    }

    let output = SimEngine::new(config)?.run();
    let summary = output.summary();

    info!(
        total_energy_kwh = %format!("{:.2}", summary.total_energy_kwh),
        successful_deals = summary.successful_deals,
        failed_attempts = summary.failed_attempts,
        total_value = %format!("{:.4}", summary.total_value),
        "key results"
    );
    match summary.avg_latency_ms {
        Some(ms) => info!(avg_latency_ms = %format!("{:.1}", ms), "network"),
        None => info!("network: no negotiated pairs"),
    }
    info!(
        active_rounds = summary.energy_timeline.len(),
        vehicles = output.fleet.len(),
        "energy timeline"
    );

    Ok(())
}
