//! PageRank estimators
//!
//! This module provides the random-surfer transition model and the two
//! estimators built on it: a sampling estimator that averages transition
//! distributions along a random walk, and an iterative estimator that
//! applies the PageRank recurrence until it reaches a fixed point.

pub mod iterative;
pub mod sampling;
pub mod transition;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::Corpus;

/// Default damping factor
pub const DEFAULT_DAMPING: f64 = 0.85;
/// Default number of samples for the sampling estimator
pub const DEFAULT_SAMPLES: usize = 10_000;
/// Default per-page convergence tolerance for the iterative estimator
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Result of a PageRank computation
#[derive(Debug, Clone, Serialize)]
pub struct RankResult {
    /// Scores for each page (indexed by page ID)
    pub scores: Vec<f64>,
    /// Iterations performed (transitions taken, for the sampler)
    pub iterations: usize,
    /// Final convergence delta (largest per-page change)
    pub delta: f64,
    /// Whether the algorithm converged
    pub converged: bool,
}

impl RankResult {
    /// Create a new result
    pub fn new(scores: Vec<f64>, iterations: usize, delta: f64, converged: bool) -> Self {
        Self {
            scores,
            iterations,
            delta,
            converged,
        }
    }

    /// Get top N pages by score
    pub fn top_n(&self, n: usize) -> Vec<(u32, f64)> {
        let mut indexed: Vec<_> = self
            .scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (i as u32, s))
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.truncate(n);
        indexed
    }

    /// Get the score for a specific page
    pub fn score(&self, page: u32) -> f64 {
        self.scores.get(page as usize).copied().unwrap_or(0.0)
    }

    /// Total probability mass
    pub fn sum(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Key the scores by page name
    pub fn to_map(&self, corpus: &Corpus) -> BTreeMap<String, f64> {
        self.scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (corpus.page_name(i as u32).to_string(), s))
            .collect()
    }
}

/// Rescale `scores` in place to sum to 1; no-op when the mass is zero.
pub(crate) fn normalize(scores: &mut [f64]) {
    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        for score in scores.iter_mut() {
            *score /= sum;
        }
    }
}
