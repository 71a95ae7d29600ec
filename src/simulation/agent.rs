//! Agent state for a single episode.
//!
//! An agent owns one network, accumulates fitness while it survives, and
//! freezes that fitness the moment it dies.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::brain::Network;
use super::error::Result;

/// One network paired with its fitness and liveness for one generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    network: Network,
    fitness: f64,
    alive: bool,
}

impl Agent {
    /// Creates a living agent with zero fitness.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            fitness: 0.0,
            alive: true,
        }
    }

    /// The agent's network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Consumes the agent, returning its network.
    pub fn into_network(self) -> Network {
        self.network
    }

    /// Fitness accumulated so far.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Checks if the agent is alive.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Runs the agent's network on one observation.
    pub fn think(&self, inputs: &[f32]) -> Result<Array1<f32>> {
        self.network.predict(inputs)
    }

    /// Credits `dt` of survival time.
    pub fn survive(&mut self, dt: f64) {
        self.reward(dt);
    }

    /// Adds `amount` to the fitness of a living agent.
    ///
    /// Negative and non-finite amounts are ignored so fitness never decreases.
    pub fn reward(&mut self, amount: f64) {
        if self.alive && amount.is_finite() && amount > 0.0 {
            self.fitness += amount;
        }
    }

    /// Marks the agent dead, freezing its fitness.
    pub fn kill(&mut self) {
        self.alive = false;
    }
}
