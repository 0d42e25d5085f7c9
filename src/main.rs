//! SUCCESSION - CLI Entry Point
//!
//! Grid-based ecosystem simulator with soil and vegetation succession.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use succession::stats::PopulationStats;
use succession::{benchmark, Config, Error, World};

#[derive(Parser)]
#[command(name = "succession")]
#[command(version)]
#[command(about = "Grid-based ecosystem simulator with soil and vegetation succession")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of steps to simulate
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Output directory for the stats history
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run the same configuration under several seeds in parallel
    Sweep {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of steps per run
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// First seed
        #[arg(long, default_value = "0")]
        first_seed: u64,

        /// Number of seeds
        #[arg(short, long, default_value = "8")]
        runs: u64,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of steps
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Grid width and height
        #[arg(long, default_value = "50")]
        size: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            steps,
            output,
            seed,
            quiet,
        } => {
            let config = load_config(&config)?;
            init_logging(&config.logging.log_level);
            run_simulation(config, steps, output, seed, quiet)
        }

        Commands::Sweep {
            config,
            steps,
            first_seed,
            runs,
        } => {
            let config = load_config(&config)?;
            init_logging(&config.logging.log_level);
            run_sweep(config, steps, first_seed, runs)
        }

        Commands::Benchmark { steps, size, seed } => {
            init_logging("warn");
            run_benchmark(steps, size, seed)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

/// Install env_logger; RUST_LOG overrides the configured level
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn run_simulation(
    config: Config,
    steps: u64,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output)?;

    // Create world
    let mut world = match seed {
        Some(s) => {
            println!("Using seed: {}", s);
            World::new_with_seed(config, s)?
        }
        None => World::initialize(config)?,
    };

    println!("Starting simulation");
    println!("  Seed: {}", world.seed());
    println!("  Grid size: {}x{}", world.config().world.width, world.config().world.height);
    println!("  Initial animals: {}", world.animal_population());
    println!("  Steps: {}", steps);
    println!();

    let start = Instant::now();
    let stats_interval = world.config().logging.stats_interval;

    for _ in 0..steps {
        world.step()?;

        // Stats output
        if !quiet && world.time % stats_interval == 0 {
            println!("{}", world.stats.summary());
        }

        if let Some(sweep) = world.last_sweep().filter(|s| s.tick == world.time) {
            if !quiet {
                println!("  Fire: {} cells burned", sweep.burned.len());
            }
        }

        // Check for extinction
        if world.is_extinct() {
            println!("\nAll animals extinct at step {}", world.time);
            break;
        }
    }

    let elapsed = start.elapsed();
    let steps_per_sec = world.time as f64 / elapsed.as_secs_f64();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Steps: {}", world.time);
    println!("Speed: {:.1} steps/s", steps_per_sec);
    println!("Final animals: {}", world.stats.animals());
    println!("{}", world.stats.summary());

    // Save stats history
    let stats_path = output.join("stats_history.json");
    world.stats_history.save(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn run_sweep(
    config: Config,
    steps: u64,
    first_seed: u64,
    runs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Seed Sweep ===");
    println!("Seeds: {}..{}", first_seed, first_seed + runs);
    println!("Steps: {}", steps);
    println!();

    let start = Instant::now();

    // Each world is single-threaded and owns its own rng
    let results: Vec<(u64, Result<PopulationStats, Error>)> = (first_seed..first_seed + runs)
        .into_par_iter()
        .map(|seed| {
            let outcome = World::new_with_seed(config.clone(), seed)
                .map_err(Error::from)
                .and_then(|mut world| {
                    world.run(steps)?;
                    Ok(world.stats)
                });
            (seed, outcome)
        })
        .collect();

    for (seed, outcome) in &results {
        match outcome {
            Ok(stats) => println!("seed {:>6} | {}", seed, stats.summary()),
            Err(e) => println!("seed {:>6} | failed: {}", seed, e),
        }
    }

    println!();
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn run_benchmark(steps: u64, size: usize, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SUCCESSION Benchmark ===");
    println!("Steps: {}", steps);
    println!("Grid: {}x{}", size, size);
    println!();

    let result = benchmark(steps, size, seed)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
