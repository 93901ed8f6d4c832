//! Pipeline runner: orchestrates corpus discovery and the estimators.
//!
//! A [`RankPipeline`] holds a validated [`RankSpec`]. Calling
//! [`RankPipeline::run`] executes the selected estimators in order over one
//! shared, read-only [`Corpus`], notifying a [`RankObserver`] at each stage
//! boundary. Each estimator owns its working distribution; the corpus is
//! only ever borrowed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::crawl::crawl;
use crate::error::Result;
use crate::graph::Corpus;
use crate::pagerank::RankResult;
use crate::pipeline::observer::{
    RankObserver, StageClock, StageReport, STAGE_CORPUS, STAGE_ITERATION, STAGE_SAMPLING,
};
use crate::pipeline::spec::{EstimatorType, RankSpec};

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for a pipeline stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

/// Results of one pipeline run, one slot per estimator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankReport {
    pub sampling: Option<RankResult>,
    pub iteration: Option<RankResult>,
}

impl RankReport {
    /// Key every result by page name for presentation.
    pub fn to_named(&self, corpus: &Corpus) -> NamedRankReport {
        NamedRankReport {
            sampling: self.sampling.as_ref().map(|r| r.to_map(corpus)),
            iteration: self.iteration.as_ref().map(|r| r.to_map(corpus)),
        }
    }
}

/// [`RankReport`] keyed by page name, sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamedRankReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<BTreeMap<String, f64>>,
}

/// Runs the estimators a [`RankSpec`] selects.
#[derive(Debug, Clone, Default)]
pub struct RankPipeline {
    spec: RankSpec,
}

impl RankPipeline {
    /// Build a pipeline from a spec, rejecting it if validation reports
    /// any error.
    pub fn from_spec(spec: RankSpec) -> Result<Self> {
        Ok(Self {
            spec: spec.into_validated()?,
        })
    }

    pub fn spec(&self) -> &RankSpec {
        &self.spec
    }

    /// Run the selected estimators over `corpus`.
    ///
    /// Estimators run in the order the spec lists them; a repeated
    /// estimator runs once.
    pub fn run(&self, corpus: &Corpus, observer: &mut impl RankObserver) -> Result<RankReport> {
        let mut report = RankReport::default();

        for estimator in self.spec.estimators() {
            match estimator {
                EstimatorType::Sampling if report.sampling.is_none() => {
                    trace_stage!(STAGE_SAMPLING);
                    let result = self.stage(STAGE_SAMPLING, corpus, observer, |c| {
                        self.spec.sampler().run(c)
                    })?;
                    report.sampling = Some(result);
                }
                EstimatorType::Iteration if report.iteration.is_none() => {
                    trace_stage!(STAGE_ITERATION);
                    let result = self.stage(STAGE_ITERATION, corpus, observer, |c| {
                        self.spec.iterator().run(c)
                    })?;
                    report.iteration = Some(result);
                }
                _ => {}
            }
        }

        Ok(report)
    }

    /// Crawl `dir` into a corpus, then [`run`](Self::run) over it.
    pub fn run_dir(
        &self,
        dir: impl AsRef<Path>,
        observer: &mut impl RankObserver,
    ) -> Result<(Corpus, RankReport)> {
        let corpus = {
            trace_stage!(STAGE_CORPUS);
            observer.on_stage_start(STAGE_CORPUS);
            let clock = StageClock::start();
            let corpus = crawl(dir)?;
            let stage_report = StageReport::new(clock.elapsed()).pages(corpus.num_pages());
            observer.on_stage_end(STAGE_CORPUS, &stage_report);
            corpus
        };

        let report = self.run(&corpus, observer)?;
        Ok((corpus, report))
    }

    fn stage(
        &self,
        name: &'static str,
        corpus: &Corpus,
        observer: &mut impl RankObserver,
        estimate: impl FnOnce(&Corpus) -> Result<RankResult>,
    ) -> Result<RankResult> {
        observer.on_stage_start(name);
        let clock = StageClock::start();
        let result = estimate(corpus)?;
        let stage_report = StageReport::new(clock.elapsed())
            .pages(corpus.num_pages())
            .result(&result);
        observer.on_stage_end(name, &stage_report);
        observer.on_result(name, &result);
        Ok(result)
    }
}
