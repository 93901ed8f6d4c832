//! Sampling PageRank estimator
//!
//! Simulates a random surfer for a fixed number of samples. At every step
//! the running distribution absorbs the current transition distribution as
//! a cumulative mean, then the next page is drawn from that distribution.
//! The expectation converges to the stationary distribution as the sample
//! count grows; individual runs are stochastic unless seeded.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

use super::transition::transition_into;
use super::{normalize, RankResult, DEFAULT_DAMPING, DEFAULT_SAMPLES};
use crate::error::{Error, Result};
use crate::graph::Corpus;

/// Random-surfer sampling estimator
#[derive(Debug, Clone)]
pub struct SamplingPageRank {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Number of samples; the walk takes `samples - 1` transitions
    pub samples: usize,
    /// Seed for reproducible runs; `None` draws from the thread RNG
    pub seed: Option<u64>,
    /// Number of independent chains sharing the sample budget
    pub chains: usize,
}

impl Default for SamplingPageRank {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            samples: DEFAULT_SAMPLES,
            seed: None,
            chains: 1,
        }
    }
}

impl SamplingPageRank {
    /// Create a new SamplingPageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the sample count
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Seed the walk for reproducible results
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Split the sample budget across `chains` parallel walks
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::parameter(
                "damping",
                format!("{} is outside [0, 1]", self.damping),
            ));
        }
        if self.samples < 2 {
            return Err(Error::parameter(
                "samples",
                format!("{} is too small; at least 2 are needed", self.samples),
            ));
        }
        if self.chains == 0 || self.chains > self.samples - 1 {
            return Err(Error::parameter(
                "chains",
                format!(
                    "{} chains cannot share {} transitions",
                    self.chains,
                    self.samples - 1
                ),
            ));
        }
        Ok(())
    }

    /// Run the sampler on a corpus
    ///
    /// Chains run in parallel. Chain `i` is seeded with `seed + i`, so a
    /// seeded run is reproducible for a fixed chain count.
    pub fn run(&self, corpus: &Corpus) -> Result<RankResult> {
        self.check()?;

        let steps = self.samples - 1;
        let base_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let per_chain = steps / self.chains;
        let remainder = steps % self.chains;

        let partials: Vec<(Vec<f64>, usize)> = (0..self.chains)
            .into_par_iter()
            .map(|chain| {
                let chain_steps = per_chain + usize::from(chain < remainder);
                let mut rng = XorShiftRng::seed_from_u64(base_seed.wrapping_add(chain as u64));
                walk(corpus, self.damping, chain_steps, &mut rng).map(|mean| (mean, chain_steps))
            })
            .collect::<Result<_>>()?;

        // Weight each chain's mean by its share of the transitions
        let mut scores = vec![0.0; corpus.num_pages()];
        for (mean, chain_steps) in &partials {
            let weight = *chain_steps as f64 / steps as f64;
            for (score, m) in scores.iter_mut().zip(mean) {
                *score += weight * m;
            }
        }
        normalize(&mut scores);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pages = corpus.num_pages(),
            samples = self.samples,
            chains = self.chains,
            "sampling estimate complete"
        );

        Ok(RankResult::new(scores, steps, 0.0, true))
    }

    /// Run a single chain with a caller-supplied RNG
    ///
    /// `chains` is ignored; the whole sample budget goes to one walk.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, corpus: &Corpus, rng: &mut R) -> Result<RankResult> {
        self.clone().with_chains(1).check()?;

        let steps = self.samples - 1;
        let mut scores = walk(corpus, self.damping, steps, rng)?;
        normalize(&mut scores);
        Ok(RankResult::new(scores, steps, 0.0, true))
    }
}

/// Walk `steps` transitions from a uniformly chosen page, returning the
/// cumulative mean of the transition distributions seen.
fn walk<R: Rng + ?Sized>(corpus: &Corpus, damping: f64, steps: usize, rng: &mut R) -> Result<Vec<f64>> {
    let n = corpus.num_pages();
    let mut running = vec![0.0; n];
    let mut next = vec![0.0; n];
    let mut current = rng.gen_range(0..n) as u32;

    for step in 1..=steps {
        transition_into(corpus, current, damping, &mut next);

        let count = step as f64;
        for (r, &t) in running.iter_mut().zip(&next) {
            *r += (t - *r) / count;
        }

        let chooser = WeightedIndex::new(&next)
            .map_err(|e| Error::parameter("damping", format!("degenerate transition: {e}")))?;
        current = chooser.sample(rng) as u32;
    }

    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutual_pair() -> Corpus {
        Corpus::from_links([("A", vec!["B"]), ("B", vec!["A"])]).unwrap()
    }

    fn build_star_corpus() -> Corpus {
        // Spokes all link to the hub, hub links back to one spoke
        Corpus::from_links([
            ("hub", vec!["s1"]),
            ("s1", vec!["hub"]),
            ("s2", vec!["hub"]),
            ("s3", vec!["hub"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_mutual_pair_is_balanced() {
        let corpus = mutual_pair();
        let result = SamplingPageRank::new()
            .with_samples(100_000)
            .with_seed(7)
            .run(&corpus)
            .unwrap();

        assert!((result.scores[0] - 0.5).abs() < 0.02);
        assert!((result.scores[1] - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let corpus = build_star_corpus();
        let result = SamplingPageRank::new().with_seed(1).run(&corpus).unwrap();

        assert!((result.sum() - 1.0).abs() < 1e-9);
        assert!(result.scores.iter().all(|&s| s >= 0.0));
        assert_eq!(result.iterations, DEFAULT_SAMPLES - 1);
    }

    #[test]
    fn test_hub_ranks_highest() {
        let corpus = build_star_corpus();
        let result = SamplingPageRank::new()
            .with_samples(20_000)
            .with_seed(3)
            .run(&corpus)
            .unwrap();

        let hub = corpus.page_id("hub").unwrap();
        assert_eq!(result.top_n(1)[0].0, hub);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let corpus = build_star_corpus();
        let sampler = SamplingPageRank::new().with_samples(2_000).with_seed(42);

        let first = sampler.run(&corpus).unwrap();
        let second = sampler.run(&corpus).unwrap();

        assert_eq!(first.scores, second.scores);
    }

    #[test]
    fn test_parallel_chains() {
        let corpus = mutual_pair();
        let result = SamplingPageRank::new()
            .with_samples(40_001)
            .with_chains(4)
            .with_seed(11)
            .run(&corpus)
            .unwrap();

        assert_eq!(result.iterations, 40_000);
        assert!((result.sum() - 1.0).abs() < 1e-9);
        assert!((result.scores[0] - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_two_samples_takes_one_transition() {
        // A single transition from either page of the pair is the same distribution
        let corpus = mutual_pair();
        let result = SamplingPageRank::new()
            .with_samples(2)
            .with_damping(0.0)
            .run(&corpus)
            .unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.scores, vec![0.5, 0.5]);
    }

    #[test]
    fn test_run_with_rng() {
        let corpus = build_star_corpus();
        let mut rng = XorShiftRng::seed_from_u64(5);

        let result = SamplingPageRank::new()
            .with_samples(500)
            .run_with_rng(&corpus, &mut rng)
            .unwrap();

        assert_eq!(result.scores.len(), 4);
        assert!((result.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let corpus = mutual_pair();

        let bad_damping = SamplingPageRank::new().with_damping(1.5).run(&corpus);
        assert!(matches!(
            bad_damping,
            Err(Error::InvalidParameter { name: "damping", .. })
        ));

        let too_few = SamplingPageRank::new().with_samples(1).run(&corpus);
        assert!(matches!(
            too_few,
            Err(Error::InvalidParameter { name: "samples", .. })
        ));

        let too_many_chains = SamplingPageRank::new()
            .with_samples(3)
            .with_chains(3)
            .run(&corpus);
        assert!(matches!(
            too_many_chains,
            Err(Error::InvalidParameter { name: "chains", .. })
        ));
    }
}
