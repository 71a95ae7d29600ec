//! Fixed-topology feed-forward network used as an agent's brain.
//!
//! A network is exactly two sigmoid layers (input → hidden → output). The
//! shape is chosen once at construction and cannot change afterwards, which
//! is what lets crossover pair parameters element by element.

use std::fmt;

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{EvoError, Result};

pub mod layer;

pub use layer::Layer;

/// Layer sizes of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Number of sensory inputs.
    pub inputs: usize,
    /// Number of hidden neurons.
    pub hidden: usize,
    /// Number of outputs.
    pub outputs: usize,
}

impl Topology {
    /// Creates a topology without validating it.
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Self {
        Self {
            inputs,
            hidden,
            outputs,
        }
    }

    /// Rejects any zero-sized layer.
    pub fn validate(&self) -> Result<()> {
        if self.inputs == 0 || self.hidden == 0 || self.outputs == 0 {
            return Err(EvoError::InvalidConfig(format!(
                "every layer needs at least one neuron, got {self}"
            )));
        }
        Ok(())
    }

    /// Total number of weights and biases in a network of this shape.
    pub fn parameter_count(&self) -> usize {
        (self.inputs + 1) * self.hidden + (self.hidden + 1) * self.outputs
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.inputs, self.hidden, self.outputs)
    }
}

/// A three-layer perceptron with sigmoid activations.
///
/// `Clone` is a deep copy: the clone owns its own arrays, so mutating one
/// never affects the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    hidden: Layer,
    output: Layer,
}

impl Network {
    /// Creates a network with every parameter drawn uniformly from `[-1, 1]`.
    pub fn new_random<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Result<Self> {
        topology.validate()?;
        Ok(Self::generate(topology, rng))
    }

    /// Creates a random network for a topology the caller has already validated.
    pub(crate) fn generate<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Self {
        Self {
            hidden: Layer::new_random(topology.inputs, topology.hidden, rng),
            output: Layer::new_random(topology.hidden, topology.outputs, rng),
        }
    }

    /// Builds a network from explicit layers, checking that they chain.
    pub fn from_layers(hidden: Layer, output: Layer) -> Result<Self> {
        let network = Self { hidden, output };
        network.check_shape()?;
        Ok(network)
    }

    /// Layer sizes of this network.
    pub fn topology(&self) -> Topology {
        Topology::new(
            self.hidden.input_size(),
            self.hidden.output_size(),
            self.output.output_size(),
        )
    }

    /// Input → hidden layer.
    pub fn hidden_layer(&self) -> &Layer {
        &self.hidden
    }

    /// Hidden → output layer.
    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    /// Verifies the internal arrays agree with each other.
    ///
    /// Only deserialized or hand-assembled networks can fail this.
    pub fn check_shape(&self) -> Result<()> {
        let declared = self.topology();
        let chained = self.output.input_size() == self.hidden.output_size();
        if !chained || !self.hidden.is_consistent() || !self.output.is_consistent() {
            let actual = Topology::new(
                self.hidden.input_size(),
                self.output.input_size(),
                self.output.biases().len(),
            );
            return Err(EvoError::TopologyMismatch {
                left: declared,
                right: actual,
            });
        }
        declared.validate()
    }

    /// Runs a forward pass; every output lies in `(0, 1)`.
    pub fn predict(&self, inputs: &[f32]) -> Result<Array1<f32>> {
        let expected = self.hidden.input_size();
        if inputs.len() != expected {
            return Err(EvoError::InputLength {
                expected,
                actual: inputs.len(),
            });
        }
        let hidden = self.hidden.forward(ArrayView1::from(inputs));
        Ok(self.output.forward(hidden.view()))
    }

    /// Perturbs each parameter independently with probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) -> Result<()> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(EvoError::InvalidConfig(format!(
                "mutation rate must be within [0, 1], got {rate}"
            )));
        }
        self.hidden.mutate(rate, rng);
        self.output.mutate(rate, rng);
        Ok(())
    }

    /// Creates a child choosing every parameter from one parent or the other.
    ///
    /// The choice is made per scalar, not per matrix. Parents must share a topology.
    pub fn crossover<R: Rng + ?Sized>(parent1: &Network, parent2: &Network, rng: &mut R) -> Result<Self> {
        let (left, right) = (parent1.topology(), parent2.topology());
        if left != right {
            return Err(EvoError::TopologyMismatch { left, right });
        }
        Ok(Self {
            hidden: Layer::crossover(&parent1.hidden, &parent2.hidden, rng),
            output: Layer::crossover(&parent1.output, &parent2.output, rng),
        })
    }

    /// Euclidean distance between two networks of the same topology.
    pub fn distance(network1: &Network, network2: &Network) -> Result<f32> {
        let (left, right) = (network1.topology(), network2.topology());
        if left != right {
            return Err(EvoError::TopologyMismatch { left, right });
        }
        let sum_sq = network1.hidden.squared_distance(&network2.hidden)
            + network1.output.squared_distance(&network2.output);
        Ok(sum_sq.sqrt())
    }

    /// Number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.topology().parameter_count()
    }

    /// Flattens all weights and biases, hidden layer first.
    pub fn to_flat_vector(&self) -> Vec<f32> {
        self.hidden
            .parameters()
            .chain(self.output.parameters())
            .collect()
    }
}
