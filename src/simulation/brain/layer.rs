//! Single fully connected layer with sigmoid activation.

use ndarray::{Array1, Array2, ArrayView1, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the additive noise applied to a mutated parameter.
pub const MUTATION_NOISE: f32 = 0.5;

/// Logistic sigmoid, `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// A single layer of the feed-forward network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Weight matrix (`output_size` × `input_size`).
    pub(crate) weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub(crate) biases: Array1<f32>,
}

impl Layer {
    /// Creates a new layer with every weight and bias drawn from `U[-1, 1]`.
    pub fn new_random<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        Self {
            weights: Array2::from_shape_fn((output_size, input_size), |_| {
                rng.random_range(-1.0..=1.0)
            }),
            biases: Array1::from_shape_fn(output_size, |_| rng.random_range(-1.0..=1.0)),
        }
    }

    /// Number of inputs this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs this layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Weight matrix, one row per output.
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Bias vector.
    pub fn biases(&self) -> &Array1<f32> {
        &self.biases
    }

    /// `true` when the bias vector agrees with the weight matrix.
    pub(crate) fn is_consistent(&self) -> bool {
        self.biases.len() == self.weights.nrows()
    }

    /// Performs forward pass with sigmoid activation.
    #[inline]
    pub fn forward(&self, inputs: ArrayView1<'_, f32>) -> Array1<f32> {
        let mut output = self.weights.dot(&inputs);
        output += &self.biases;
        output.mapv_inplace(sigmoid);
        output
    }

    /// Adds `U[-0.5, 0.5]` noise to each parameter independently with probability `rate`.
    ///
    /// `rate` must already be validated to lie in `[0, 1]`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        let mut perturb = |value: f32| {
            if rng.random_bool(rate) {
                value + rng.random_range(-MUTATION_NOISE..=MUTATION_NOISE)
            } else {
                value
            }
        };
        self.weights.mapv_inplace(&mut perturb);
        self.biases.mapv_inplace(&mut perturb);
    }

    /// Creates a new layer taking each parameter from either parent with equal odds.
    ///
    /// Both parents must have the same shape.
    pub fn crossover<R: Rng + ?Sized>(parent1: &Layer, parent2: &Layer, rng: &mut R) -> Self {
        let mut pick = |a: &f32, b: &f32| if rng.random_bool(0.5) { *a } else { *b };
        Self {
            weights: Zip::from(&parent1.weights)
                .and(&parent2.weights)
                .map_collect(&mut pick),
            biases: Zip::from(&parent1.biases)
                .and(&parent2.biases)
                .map_collect(&mut pick),
        }
    }

    /// Sum of squared differences to another layer of the same shape.
    pub(crate) fn squared_distance(&self, other: &Layer) -> f32 {
        let weights: f32 = Zip::from(&self.weights)
            .and(&other.weights)
            .fold(0.0, |acc, a, b| acc + (a - b) * (a - b));
        let biases: f32 = Zip::from(&self.biases)
            .and(&other.biases)
            .fold(0.0, |acc, a, b| acc + (a - b) * (a - b));
        weights + biases
    }

    /// Iterates over every weight followed by every bias.
    pub(crate) fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights.iter().chain(self.biases.iter()).copied()
    }
}
