//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! estimator logic. Use cases include timing stages and capturing the
//! per-estimator results as they are produced.

use std::time::{Duration, Instant};

use crate::pagerank::RankResult;

/// Corpus discovery (crawling a directory).
pub const STAGE_CORPUS: &str = "corpus";
/// Random-surfer sampling estimator.
pub const STAGE_SAMPLING: &str = "sampling";
/// Fixed-point iteration estimator.
pub const STAGE_ITERATION: &str = "iteration";

/// Wall-clock timer for one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    start: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Summary of a finished stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    pub elapsed: Duration,
    /// Pages in the corpus when the stage finished.
    pub pages: Option<usize>,
    /// Iterations (or transitions) an estimator performed.
    pub iterations: Option<usize>,
    /// Whether an estimator converged.
    pub converged: Option<bool>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn pages(mut self, pages: usize) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Record an estimator's iteration count and convergence.
    pub fn result(mut self, result: &RankResult) -> Self {
        self.iterations = Some(result.iterations);
        self.converged = Some(result.converged);
        self
    }
}

/// Callbacks fired by [`RankPipeline`](super::runner::RankPipeline).
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait RankObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    fn on_result(&mut self, _stage: &'static str, _result: &RankResult) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RankObserver for NoopObserver {}

/// Observer that records every finished stage, in order.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    pub stages: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time spent across recorded stages.
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|(_, r)| r.elapsed).sum()
    }
}

impl RankObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.stages.push((stage, report.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_report_records_result() {
        let result = RankResult::new(vec![0.5, 0.5], 12, 1e-4, true);
        let report = StageReport::new(Duration::from_millis(3))
            .pages(2)
            .result(&result);

        assert_eq!(report.pages, Some(2));
        assert_eq!(report.iterations, Some(12));
        assert_eq!(report.converged, Some(true));
    }

    #[test]
    fn test_timing_observer_accumulates() {
        let mut observer = StageTimingObserver::new();
        observer.on_stage_end(STAGE_SAMPLING, &StageReport::new(Duration::from_millis(2)));
        observer.on_stage_end(STAGE_ITERATION, &StageReport::new(Duration::from_millis(5)));

        assert_eq!(observer.stages.len(), 2);
        assert_eq!(observer.stages[0].0, STAGE_SAMPLING);
        assert_eq!(observer.total(), Duration::from_millis(7));
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = StageClock::start();
        let first = clock.elapsed();
        assert!(clock.elapsed() >= first);
    }
}
