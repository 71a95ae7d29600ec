//! Generational evolution of a fixed-size set of networks.
//!
//! Each call to [`Population::evolve`] ranks the current networks by the
//! supplied fitness scores, carries the top `elitism_count` forward unchanged,
//! and fills the rest of the next generation with mutated crossover children
//! of tournament-selected parents.

use std::cmp::Ordering;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::brain::{Network, Topology};
use super::error::{EvoError, Result};
use super::stats::{FitnessHistory, GenerationSummary};

/// Probability of perturbing each parameter of an offspring.
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;
/// Number of top networks copied unchanged into the next generation.
pub const DEFAULT_ELITISM: usize = 2;
/// Number of candidates drawn per tournament.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

/// Parameters fixed for the lifetime of a population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of networks per generation.
    pub size: usize,
    /// Shape shared by every network.
    pub topology: Topology,
    /// Per-parameter mutation probability, within `[0, 1]`.
    pub mutation_rate: f64,
    /// Elites carried over per generation, at most `size`.
    pub elitism_count: usize,
    /// Candidates per tournament draw.
    pub tournament_size: usize,
}

impl PopulationConfig {
    /// Creates a config with the default mutation rate, elitism and tournament size.
    pub fn new(size: usize, topology: Topology) -> Self {
        Self {
            size,
            topology,
            mutation_rate: DEFAULT_MUTATION_RATE,
            elitism_count: DEFAULT_ELITISM,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
        }
    }

    /// Overrides the mutation rate.
    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    /// Overrides the number of elites.
    pub fn with_elitism(mut self, elitism_count: usize) -> Self {
        self.elitism_count = elitism_count;
        self
    }

    /// Overrides the tournament size.
    pub fn with_tournament_size(mut self, tournament_size: usize) -> Self {
        self.tournament_size = tournament_size;
        self
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(EvoError::InvalidConfig(
                "population size must be positive".to_string(),
            ));
        }
        self.topology.validate()?;
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvoError::InvalidConfig(format!(
                "mutation rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.elitism_count > self.size {
            return Err(EvoError::InvalidConfig(format!(
                "elitism count {} exceeds population size {}",
                self.elitism_count, self.size
            )));
        }
        if self.tournament_size == 0 {
            return Err(EvoError::InvalidConfig(
                "tournament size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A network index paired with its fitness, as ordered by [`rank`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedIndividual {
    /// Position of the network in the generation that was scored.
    pub index: usize,
    /// Its fitness score.
    pub fitness: f64,
}

/// Orders indices by descending fitness.
///
/// The sort is stable: equal scores keep their original index order, so the
/// lower index ranks first. `-0.0` and `0.0` count as equal. Scores are
/// expected to be finite; NaN compares equal to everything.
pub fn rank(fitness_scores: &[f64]) -> Vec<RankedIndividual> {
    let mut ranked: Vec<RankedIndividual> = fitness_scores
        .iter()
        .enumerate()
        .map(|(index, &fitness)| RankedIndividual { index, fitness })
        .collect();
    ranked.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal));
    ranked
}

/// Tournament selection over a ranked list.
///
/// Draws `tournament_size` positions uniformly with replacement from the
/// whole list and returns the fittest candidate. Because `ranked` is sorted
/// best-first, that is the candidate at the smallest drawn position.
///
/// # Panics
///
/// Panics if `ranked` is empty.
pub fn select_parent<'a, R: Rng + ?Sized>(
    ranked: &'a [RankedIndividual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a RankedIndividual {
    let mut winner = rng.random_range(0..ranked.len());
    for _ in 1..tournament_size {
        winner = winner.min(rng.random_range(0..ranked.len()));
    }
    &ranked[winner]
}

/// Best network seen since the last reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Champion {
    /// Its fitness score.
    pub fitness: f64,
    /// Generation in which it was scored.
    pub generation: u32,
    /// Deep copy of the network.
    pub network: Network,
}

/// A fixed-size population of networks evolving generation by generation.
#[derive(Debug, Clone)]
pub struct Population {
    config: PopulationConfig,
    networks: Vec<Network>,
    generation: u32,
    best_fitness: Option<f64>,
    avg_fitness: Option<f64>,
    best_network: Option<Network>,
    champion: Option<Champion>,
    history: FitnessHistory,
    rng: ChaCha8Rng,
}

/// Serialized form of a population; the random source is not persisted.
#[derive(Serialize, Deserialize)]
struct PopulationSnapshot {
    config: PopulationConfig,
    generation: u32,
    networks: Vec<Network>,
    best_fitness: Option<f64>,
    avg_fitness: Option<f64>,
    best_network: Option<Network>,
    champion: Option<Champion>,
    history: FitnessHistory,
}

impl Population {
    /// Creates a random population seeded from the thread-local RNG.
    pub fn new(config: PopulationConfig) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Creates a random population with a deterministic random source.
    pub fn with_seed(config: PopulationConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a random population driven by `rng`.
    pub fn with_rng(config: PopulationConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        let mut population = Self {
            config,
            networks: Vec::with_capacity(config.size),
            generation: 1,
            best_fitness: None,
            avg_fitness: None,
            best_network: None,
            champion: None,
            history: FitnessHistory::default(),
            rng,
        };
        population.initialize();
        Ok(population)
    }

    /// Refills the population with fresh random networks.
    ///
    /// Clears the last generation's statistics but leaves the generation
    /// counter, the champion and the history alone.
    pub fn initialize(&mut self) {
        let topology = self.config.topology;
        self.networks = (0..self.config.size)
            .map(|_| Network::generate(topology, &mut self.rng))
            .collect();
        self.best_fitness = None;
        self.avg_fitness = None;
        self.best_network = None;
        tracing::debug!(
            size = self.config.size,
            %topology,
            generation = self.generation,
            "population initialized"
        );
    }

    /// Starts over from generation 1 with new random networks.
    pub fn reset(&mut self) {
        self.generation = 1;
        self.champion = None;
        self.history.clear();
        self.initialize();
    }

    /// Replaces the random source, e.g. after loading from disk.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Produces the next generation from this generation's fitness scores.
    ///
    /// `fitness_scores[i]` must be the fitness of `networks()[i]`. On error
    /// nothing about the population changes.
    pub fn evolve(&mut self, fitness_scores: &[f64]) -> Result<GenerationSummary> {
        let size = self.networks.len();
        if fitness_scores.len() != size {
            return Err(EvoError::FitnessLength {
                expected: size,
                actual: fitness_scores.len(),
            });
        }
        if let Some((index, &value)) = fitness_scores
            .iter()
            .enumerate()
            .find(|(_, score)| !score.is_finite())
        {
            return Err(EvoError::InvalidFitness { index, value });
        }

        let ranked = rank(fitness_scores);
        let top = ranked[0];
        let summary = GenerationSummary::from_scores(self.generation, fitness_scores);

        let mut next_generation: Vec<Network> = ranked
            .iter()
            .take(self.config.elitism_count)
            .map(|elite| self.networks[elite.index].clone())
            .collect();

        while next_generation.len() < size {
            let parent1 = select_parent(&ranked, self.config.tournament_size, &mut self.rng).index;
            let parent2 = select_parent(&ranked, self.config.tournament_size, &mut self.rng).index;
            let mut child = Network::crossover(
                &self.networks[parent1],
                &self.networks[parent2],
                &mut self.rng,
            )?;
            child.mutate(self.config.mutation_rate, &mut self.rng)?;
            next_generation.push(child);
        }

        let best_network = self.networks[top.index].clone();
        if self
            .champion
            .as_ref()
            .is_none_or(|champion| top.fitness > champion.fitness)
        {
            self.champion = Some(Champion {
                fitness: top.fitness,
                generation: self.generation,
                network: best_network.clone(),
            });
        }

        self.best_fitness = Some(summary.best_fitness);
        self.avg_fitness = Some(summary.avg_fitness);
        self.best_network = Some(best_network);
        self.networks = next_generation;
        self.generation += 1;
        self.history.record(summary);

        tracing::info!(
            generation = summary.generation,
            best = summary.best_fitness,
            avg = summary.avg_fitness,
            worst = summary.worst_fitness,
            champion = self.champion.as_ref().map_or(0.0, |c| c.fitness),
            "generation evolved"
        );

        Ok(summary)
    }

    /// Draws one parent from `ranked` using this population's random source.
    pub fn select_parent(&mut self, ranked: &[RankedIndividual]) -> usize {
        select_parent(ranked, self.config.tournament_size, &mut self.rng).index
    }

    /// Configuration fixed at construction.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Number of networks per generation.
    pub fn size(&self) -> usize {
        self.config.size
    }

    /// Shape shared by every network.
    pub fn topology(&self) -> Topology {
        self.config.topology
    }

    /// Networks of the current generation.
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Current generation, starting at 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Top score of the most recently evaluated generation.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best_fitness
    }

    /// Mean score of the most recently evaluated generation.
    pub fn avg_fitness(&self) -> Option<f64> {
        self.avg_fitness
    }

    /// Copy of the top network of the most recently evaluated generation.
    pub fn best_network(&self) -> Option<&Network> {
        self.best_network.as_ref()
    }

    /// Best network scored since the last reset.
    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    /// Summaries of recent generations.
    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    /// Saves the population to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = PopulationSnapshot {
            config: self.config,
            generation: self.generation,
            networks: self.networks.clone(),
            best_fitness: self.best_fitness,
            avg_fitness: self.avg_fitness,
            best_network: self.best_network.clone(),
            champion: self.champion.clone(),
            history: self.history.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a population from a JSON file, reseeding its random source.
    ///
    /// The file is rejected unless its config is valid and every network
    /// matches the configured topology.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: PopulationSnapshot = serde_json::from_str(&json)?;
        snapshot.config.validate()?;

        if snapshot.networks.len() != snapshot.config.size {
            return Err(EvoError::InvalidConfig(format!(
                "file holds {} networks for a population of {}",
                snapshot.networks.len(),
                snapshot.config.size
            )));
        }
        if snapshot.generation == 0 {
            return Err(EvoError::InvalidConfig(
                "generation counter starts at 1".to_string(),
            ));
        }
        let expected = snapshot.config.topology;
        let stored = snapshot
            .networks
            .iter()
            .chain(snapshot.best_network.as_ref())
            .chain(snapshot.champion.as_ref().map(|c| &c.network));
        for network in stored {
            network.check_shape()?;
            let actual = network.topology();
            if actual != expected {
                return Err(EvoError::TopologyMismatch {
                    left: expected,
                    right: actual,
                });
            }
        }

        Ok(Self {
            config: snapshot.config,
            networks: snapshot.networks,
            generation: snapshot.generation,
            best_fitness: snapshot.best_fitness,
            avg_fitness: snapshot.avg_fitness,
            best_network: snapshot.best_network,
            champion: snapshot.champion,
            history: snapshot.history,
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        })
    }
}
