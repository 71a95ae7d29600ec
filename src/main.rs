use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use dino_evo::simulation::brain::Topology;
use dino_evo::simulation::params::{Params, TrainingParams};
use dino_evo::simulation::population::{
    DEFAULT_ELITISM, DEFAULT_MUTATION_RATE, Population, PopulationConfig,
};
use dino_evo::simulation::runner::{INPUT_SIZE, RunnerGame};
use dino_evo::simulation::session::Session;

#[derive(Parser, Debug)]
#[command(name = "dino-evo")]
#[command(about = "Evolve neural networks that jump over obstacles in a headless runner game")]
struct Args {
    /// Number of generations to train
    #[arg(short, long, default_value_t = 50)]
    generations: u32,

    /// Networks per generation
    #[arg(short, long, default_value_t = 50, conflicts_with = "load")]
    population: usize,

    /// Hidden layer size
    #[arg(long, default_value_t = 8, conflicts_with = "load")]
    hidden: usize,

    /// Per-parameter mutation probability
    #[arg(long, default_value_t = DEFAULT_MUTATION_RATE, conflicts_with = "load")]
    mutation_rate: f64,

    /// Networks carried over unchanged per generation
    #[arg(long, default_value_t = DEFAULT_ELITISM, conflicts_with = "load")]
    elitism: usize,

    /// Seed for the population and the obstacle course
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with `runner` and/or `training` parameter overrides
    #[arg(long)]
    params: Option<PathBuf>,

    /// Resume from a saved population instead of starting fresh; the saved
    /// configuration is used as-is
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the trained population here
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParamsFile {
    runner: Params,
    training: TrainingParams,
}

fn load_params(path: Option<&PathBuf>) -> Result<ParamsFile> {
    let Some(path) = path else {
        return Ok(ParamsFile::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read params file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("invalid params file {}", path.display()))
}

fn build_population(args: &Args) -> Result<Population> {
    if let Some(path) = &args.load {
        let mut population = Population::load_from_file(path)
            .with_context(|| format!("failed to load population from {}", path.display()))?;
        if let Some(seed) = args.seed {
            population.reseed(seed);
        }
        tracing::info!(
            path = %path.display(),
            generation = population.generation(),
            size = population.size(),
            "resumed population"
        );
        return Ok(population);
    }

    let config = PopulationConfig::new(args.population, Topology::new(INPUT_SIZE, args.hidden, 1))
        .with_mutation_rate(args.mutation_rate)
        .with_elitism(args.elitism);
    let population = match args.seed {
        Some(seed) => Population::with_seed(config, seed),
        None => Population::new(config),
    };
    population.context("invalid population configuration")
}

/// Log filter built from `RUST_LOG`, falling back to `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let args = Args::parse();
    let ParamsFile { runner, training } = load_params(args.params.as_ref())?;

    let population = build_population(&args)?;
    let game = match args.seed {
        Some(seed) => RunnerGame::with_seed(runner, seed),
        None => RunnerGame::new(runner),
    }
    .context("invalid runner parameters")?;

    let mut session = Session::new(population, game, training).context("failed to start training")?;

    tracing::info!(
        generations = args.generations,
        size = session.population().size(),
        topology = %session.population().topology(),
        "training started"
    );

    for _ in 0..args.generations {
        let summary = session.run_generation()?;
        println!(
            "gen {:>4}  best {:>8.2}s  avg {:>8.2}s  worst {:>8.2}s",
            summary.generation, summary.best_fitness, summary.avg_fitness, summary.worst_fitness
        );
    }

    let population = session.into_population();
    if let Some(champion) = population.champion() {
        println!(
            "champion survived {:.2}s in generation {}",
            champion.fitness, champion.generation
        );
    }

    if let Some(path) = &args.save {
        population
            .save_to_file(path)
            .with_context(|| format!("failed to save population to {}", path.display()))?;
        tracing::info!(path = %path.display(), "population saved");
    }

    Ok(())
}
