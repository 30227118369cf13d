//! Tangle Simulator CLI
//!
//! Run deterministic tangle or witness-chain growth simulations and write
//! per-tick metrics as CSV.

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tangle_core::TipSelectionMode;
use tangle_sim::{
    seeded_path, write_json, RunSummary, SimError, SimulationFile, TangleConfig, TangleRunner, WitnessConfig,
    WitnessRunner,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Deterministic DAG ledger growth simulator
#[derive(Parser, Debug)]
#[command(name = "tangle-sim", version)]
#[command(about = "Simulate tangle and witness-chain DAG growth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file with [tangle] and [witness] sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of consecutive seeds to run, starting at the configured seed
    #[arg(long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    seeds: u64,

    /// Recheck all structural invariants after every tick
    #[arg(long, global = true)]
    check_invariants: bool,

    /// Verbose output (per-transaction debug logs)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print run summaries as JSON on stdout
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tangle with tip selection by uniform choice, biased walk or both
    Tangle(TangleArgs),
    /// Per-user chains that cite recent blocks of other users
    Witness(WitnessArgs),
}

#[derive(Args, Debug)]
struct TangleArgs {
    /// Number of processes
    #[arg(short = 'n', long)]
    processes: Option<usize>,

    /// Expected transactions per process per tick
    #[arg(short, long)]
    lambda: Option<f64>,

    /// Last simulated tick
    #[arg(short, long)]
    duration: Option<f64>,

    #[arg(long)]
    min_delay: Option<f64>,

    #[arg(long)]
    max_delay: Option<f64>,

    /// Tip selection (random_only, mcmc_only, hybrid)
    #[arg(short, long)]
    mode: Option<TipSelectionMode>,

    /// Probability of the biased walk in hybrid mode
    #[arg(long)]
    security_bias: Option<f64>,

    /// Height-bias exponent of the walk
    #[arg(short, long)]
    alpha: Option<f64>,

    /// Master seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Metrics CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl TangleArgs {
    fn apply(&self, config: &mut TangleConfig) {
        if let Some(v) = self.processes {
            config.num_processes = v;
        }
        if let Some(v) = self.lambda {
            config.lambda_per_process = v;
        }
        if let Some(v) = self.duration {
            config.sim_duration = v;
        }
        if let Some(v) = self.min_delay {
            config.min_delay = v;
        }
        if let Some(v) = self.max_delay {
            config.max_delay = v;
        }
        if let Some(v) = self.mode {
            config.mode = v;
        }
        if let Some(v) = self.security_bias {
            config.security_bias = v;
        }
        if let Some(v) = self.alpha {
            config.alpha_high = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = &self.output {
            config.output = v.clone();
        }
    }
}

#[derive(Args, Debug)]
struct WitnessArgs {
    /// Number of users
    #[arg(short = 'n', long)]
    users: Option<usize>,

    /// Probability that a user posts in a tick
    #[arg(short, long)]
    post_prob: Option<f64>,

    /// Last simulated tick
    #[arg(short, long)]
    duration: Option<f64>,

    #[arg(long)]
    min_delay: Option<f64>,

    #[arg(long)]
    max_delay: Option<f64>,

    /// Maximum witnesses cited per block
    #[arg(short = 'w', long)]
    max_witnesses: Option<usize>,

    /// Master seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Metrics CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl WitnessArgs {
    fn apply(&self, config: &mut WitnessConfig) {
        if let Some(v) = self.users {
            config.num_users = v;
        }
        if let Some(v) = self.post_prob {
            config.post_prob_per_step = v;
        }
        if let Some(v) = self.duration {
            config.sim_duration = v;
        }
        if let Some(v) = self.min_delay {
            config.min_delay = v;
        }
        if let Some(v) = self.max_delay {
            config.max_delay = v;
        }
        if let Some(v) = self.max_witnesses {
            config.max_witnesses = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = &self.output {
            config.output = v.clone();
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !cli.json {
        info!("Tangle Simulator v{}", env!("CARGO_PKG_VERSION"));
    }

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let file = match &cli.config {
        Some(path) => SimulationFile::load(path)?,
        None => SimulationFile::default(),
    };

    let summaries = match &cli.command {
        Command::Tangle(args) => {
            let mut config = file.tangle;
            args.apply(&mut config);
            run_tangle(cli, config)?
        }
        Command::Witness(args) => {
            let mut config = file.witness;
            args.apply(&mut config);
            run_witness(cli, config)?
        }
    };

    if cli.json {
        let mut stdout = io::stdout().lock();
        write_json(&mut stdout, &summaries)?;
        writeln!(stdout)?;
    } else {
        for summary in &summaries {
            info!(
                "✓ {} seed={}: {} nodes, {} tips, {} messages -> {}",
                summary.simulation,
                summary.seed,
                summary.total_nodes,
                summary.final_tips,
                summary.messages_sent,
                summary.output.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
            );
        }
    }

    Ok(())
}

/// Seeds of a sweep and the CSV path each one writes to.
fn sweep(base_seed: u64, count: u64, output: &Path) -> Vec<(u64, PathBuf)> {
    (0..count)
        .map(|offset| {
            let seed = base_seed.wrapping_add(offset);
            let path = if count > 1 { seeded_path(output, seed) } else { output.to_path_buf() };
            (seed, path)
        })
        .collect()
}

fn run_tangle(cli: &Cli, config: TangleConfig) -> Result<Vec<RunSummary>, SimError> {
    config.validate()?;

    let mut summaries = Vec::new();
    for (seed, output) in sweep(config.seed, cli.seeds, &config.output) {
        let run_config = TangleConfig {
            seed,
            output: output.clone(),
            ..config.clone()
        };
        let mut runner = TangleRunner::new(run_config)?.with_invariant_checks(cli.check_invariants);
        summaries.push(runner.run_to_file(&output)?);
    }
    Ok(summaries)
}

fn run_witness(cli: &Cli, config: WitnessConfig) -> Result<Vec<RunSummary>, SimError> {
    config.validate()?;

    let mut summaries = Vec::new();
    for (seed, output) in sweep(config.seed, cli.seeds, &config.output) {
        let run_config = WitnessConfig {
            seed,
            output: output.clone(),
            ..config.clone()
        };
        let mut runner = WitnessRunner::new(run_config)?.with_invariant_checks(cli.check_invariants);
        summaries.push(runner.run_to_file(&output)?);
    }
    Ok(summaries)
}
