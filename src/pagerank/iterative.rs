//! Iterative PageRank estimator
//!
//! Applies the PageRank recurrence
//!
//! ```text
//! new[p] = (1 - d) / n + d * sum(old[q] / outdegree(q) for q linking to p)
//! ```
//!
//! as a Jacobi step: every page reads the previous iteration's scores, never
//! a partially updated buffer. Iteration stops once no page moves by more
//! than the tolerance.
//!
//! Dangling pages contribute nothing to the sum. Their mass is not spread
//! over the corpus the way textbook PageRank does it, so the raw scores of a
//! corpus with dangling pages sum to less than 1; the final estimate is
//! rescaled to sum to 1.

use rayon::prelude::*;

use super::{normalize, RankResult, DEFAULT_DAMPING, DEFAULT_TOLERANCE};
use crate::error::{Error, Result};
use crate::graph::Corpus;

/// Corpora with at least this many pages compute each step in parallel.
const PARALLEL_THRESHOLD: usize = 1024;

/// Fixed-point PageRank estimator
#[derive(Debug, Clone)]
pub struct IterativePageRank {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Largest per-page change accepted as converged
    pub tolerance: f64,
    /// Optional iteration cap; `None` iterates until convergence
    pub max_iterations: Option<usize>,
}

impl Default for IterativePageRank {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: None,
        }
    }
}

impl IterativePageRank {
    /// Create a new IterativePageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Cap the number of iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::parameter(
                "damping",
                format!("{} is outside [0, 1]", self.damping),
            ));
        }
        // Without teleportation the recurrence need not contract
        if self.damping >= 1.0 && self.max_iterations.is_none() {
            return Err(Error::parameter(
                "damping",
                "damping 1 requires max_iterations",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::parameter(
                "tolerance",
                format!("{} is not a positive number", self.tolerance),
            ));
        }
        // Rounding can leave a one-ulp oscillation that never drops below this
        if self.tolerance < f64::EPSILON && self.max_iterations.is_none() {
            return Err(Error::parameter(
                "tolerance",
                format!(
                    "{} is below f64::EPSILON and requires max_iterations",
                    self.tolerance
                ),
            ));
        }
        Ok(())
    }

    /// Run to convergence from the uniform distribution
    pub fn run(&self, corpus: &Corpus) -> Result<RankResult> {
        let n = corpus.num_pages();
        self.run_from(corpus, vec![1.0 / n as f64; n])
    }

    /// Run to convergence from a supplied starting distribution
    ///
    /// `initial` must hold one score per page, indexed by page ID.
    pub fn run_from(&self, corpus: &Corpus, initial: Vec<f64>) -> Result<RankResult> {
        self.check()?;
        let n = corpus.num_pages();
        if initial.len() != n {
            return Err(Error::parameter(
                "initial",
                format!("expected {n} scores, got {}", initial.len()),
            ));
        }

        let mut scores = initial;
        let mut new_scores = vec![0.0; n];
        let mut iterations = 0;
        let mut delta = f64::MAX;

        while delta > self.tolerance {
            if self.max_iterations.is_some_and(|max| iterations >= max) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    iterations,
                    delta,
                    tolerance = self.tolerance,
                    "iteration cap reached before convergence"
                );
                break;
            }
            iterations += 1;

            self.step(corpus, &scores, &mut new_scores);

            delta = scores
                .iter()
                .zip(new_scores.iter())
                .map(|(old, new)| (old - new).abs())
                .fold(0.0, f64::max);

            std::mem::swap(&mut scores, &mut new_scores);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(pages = n, iterations, delta, "iterative estimate complete");

        normalize(&mut scores);
        Ok(RankResult::new(
            scores,
            iterations,
            delta,
            delta <= self.tolerance,
        ))
    }

    /// Apply one step of the recurrence, reading `old` and writing `new`.
    ///
    /// Both slices are indexed by page ID and must have one entry per page.
    pub fn step(&self, corpus: &Corpus, old: &[f64], new: &mut [f64]) {
        let n = corpus.num_pages();
        let teleport = (1.0 - self.damping) / n as f64;

        let rank = |page: usize| -> f64 {
            let inflow: f64 = corpus
                .inbound(page as u32)
                .iter()
                .map(|&q| old[q as usize] / corpus.out_degree(q) as f64)
                .sum();
            teleport + self.damping * inflow
        };

        if n >= PARALLEL_THRESHOLD {
            new.par_iter_mut()
                .enumerate()
                .for_each(|(page, slot)| *slot = rank(page));
        } else {
            for (page, slot) in new.iter_mut().enumerate() {
                *slot = rank(page);
            }
        }
    }
}
