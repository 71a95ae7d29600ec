//! # Dino Evo - Neuroevolution for a Side-Scrolling Runner
//!
//! A population of agents, each steered by a small feed-forward neural
//! network, learns to time jumps over scrolling obstacles through
//! generational evolution.
//!
//! ## Features
//!
//! - Fixed-topology 3-layer network with sigmoid activations
//! - Uniform per-parameter crossover and additive-noise mutation
//! - Elitism and tournament selection between generations
//! - Seedable random sources for reproducible runs
//! - Headless runner game implementing the environment interface
//! - Save/load population state as JSON
//!
//! ## Core Modules
//!
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::population`] - Generational evolution
//! - [`simulation::agent`] - Per-episode agent state
//! - [`simulation::environment`] - Interface to the game world
//! - [`simulation::runner`] - The runner game
//! - [`simulation::session`] - Training loop state

/// Core simulation logic and data structures.
pub mod simulation {
    /// Agent state: network, fitness and liveness.
    pub mod agent;
    /// Neural network implementation for agent brains.
    pub mod brain;
    /// Interface between agents and the world they act in.
    pub mod environment;
    /// Crate error type.
    pub mod error;
    /// Obstacles scrolling through the runner game.
    pub mod obstacle;
    /// Game and training parameters.
    pub mod params;
    /// Fixed-size population with elitism and tournament selection.
    pub mod population;
    /// Headless runner game environment.
    pub mod runner;
    /// Training session driving a population through an environment.
    pub mod session;
    /// Per-generation fitness statistics.
    pub mod stats;
}

pub use simulation::error::{EvoError, Result};
