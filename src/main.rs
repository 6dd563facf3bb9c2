//! CLI for the relocation benchmark

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use relocation_bench::{
    compare, AnomalyPolicy, BenchConfig, BenchReport, Benchmark, Distribution, Strategy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relocation-bench")]
#[command(about = "Measure and verify point relocation in duplicate-tolerant indexes", long_about = None)]
struct Cli {
    /// JSON configuration file. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output format for the final report
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy)]
enum StrategyArg {
    Bucketed,
    Native,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Bucketed => Strategy::Bucketed,
            StrategyArg::Native => Strategy::Native,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum DistributionArg {
    Cube,
    Cluster,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark with one strategy
    Run {
        /// Relocation strategy
        #[arg(short, long, value_enum, default_value = "native")]
        strategy: StrategyArg,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Run both strategies on the same workload
    Compare {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args)]
struct Overrides {
    /// Number of entries in the index
    #[arg(short = 'n', long)]
    population: Option<usize>,
    /// Point dimensionality
    #[arg(short, long)]
    dimension: Option<usize>,
    /// Relocations per round
    #[arg(short, long)]
    batch_size: Option<usize>,
    /// Number of timed rounds
    #[arg(short, long)]
    rounds: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    distribution: Option<DistributionArg>,
    /// Move distances, cycled within a batch (e.g., "0,1,10")
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    move_distance: Option<Vec<f64>>,
    /// Fraction of points placed on an already used coordinate
    #[arg(long)]
    collision_fraction: Option<f64>,
    /// Stop at the first anomaly instead of logging it
    #[arg(long)]
    fail_fast: bool,
}

impl Overrides {
    fn apply(self, config: &mut BenchConfig) {
        if let Some(v) = self.population {
            config.population = v;
        }
        if let Some(v) = self.dimension {
            config.dimension = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.rounds {
            config.rounds = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.distribution {
            config.distribution = match v {
                DistributionArg::Cube => Distribution::Cube,
                DistributionArg::Cluster => Distribution::Cluster,
            };
        }
        if let Some(v) = self.move_distance {
            config.move_distances = v;
        }
        if let Some(v) = self.collision_fraction {
            config.collision_fraction = v;
        }
        if self.fail_fast {
            config.policy = AnomalyPolicy::Fail;
        }
    }
}

fn print_reports(reports: &[BenchReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        OutputFormat::Text => {
            println!(
                "{:<10} {:>10} {:>12} {:>10} {:>16} {:>12} {:>8}",
                "strategy", "population", "relocations", "anomalies", "relocations/s", "avg round", "valid"
            );
            for r in reports {
                println!(
                    "{:<10} {:>10} {:>12} {:>10} {:>16.0} {:>10.1}us {:>8}",
                    r.strategy,
                    r.population,
                    r.metrics.total_relocations,
                    r.metrics.total_anomalies,
                    r.metrics.relocations_per_second,
                    r.metrics.avg_round_latency_us,
                    r.verification.is_consistent()
                );
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        // Validated by the benchmark, once the overrides are in.
        Some(path) => BenchConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => BenchConfig::default(),
    };

    let reports = match cli.command {
        Commands::Run {
            strategy,
            overrides,
        } => {
            overrides.apply(&mut config);
            let mut bench = Benchmark::new(config, strategy.into())?;
            vec![bench.run()?]
        }
        Commands::Compare { overrides } => {
            overrides.apply(&mut config);
            compare(&config)?
        }
    };

    print_reports(&reports, cli.format)
}
