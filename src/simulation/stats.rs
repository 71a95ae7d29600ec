use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fitness statistics of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation the scores belong to.
    pub generation: u32,
    /// Highest score.
    pub best_fitness: f64,
    /// Arithmetic mean of all scores.
    pub avg_fitness: f64,
    /// Lowest score.
    pub worst_fitness: f64,
}

impl GenerationSummary {
    /// Summarises a non-empty, finite score vector.
    pub fn from_scores(generation: u32, scores: &[f64]) -> Self {
        let (best, worst) = scores
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(best, worst), &s| {
                (best.max(s), worst.min(s))
            });
        Self {
            generation,
            best_fitness: best,
            avg_fitness: scores.iter().sum::<f64>() / scores.len() as f64,
            worst_fitness: worst,
        }
    }
}

/// Bounded record of recent generation summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// Recent summaries, oldest first
    records: VecDeque<GenerationSummary>,
    /// Maximum number of generations to keep
    max_history: usize,
}

impl Default for FitnessHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FitnessHistory {
    /// Creates an empty history holding at most `max_history` entries.
    pub fn new(max_history: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Appends a summary, evicting the oldest beyond capacity.
    pub fn record(&mut self, summary: GenerationSummary) {
        self.records.push_back(summary);
        while self.records.len() > self.max_history {
            self.records.pop_front();
        }
    }

    /// All retained summaries, oldest first.
    pub fn records(&self) -> &VecDeque<GenerationSummary> {
        &self.records
    }

    /// Most recent summary.
    pub fn latest(&self) -> Option<&GenerationSummary> {
        self.records.back()
    }

    /// Mean of the retained best-fitness values (last N generations)
    pub fn avg_best(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            self.records.iter().map(|r| r.best_fitness).sum::<f64>() / self.records.len() as f64
        }
    }

    /// Number of generations tracked
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
