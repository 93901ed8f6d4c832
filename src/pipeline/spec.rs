//! Rank specification types.
//!
//! A [`RankSpec`] describes which estimators to run and how to tune them.
//! Every tuning field is optional and falls back to the library defaults.
//! These types are the input to the [`super::validation::ValidationEngine`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "damping": 0.85,
//!   "samples": 10000,
//!   "tolerance": 0.001,
//!   "seed": 42,
//!   "chains": 1,
//!   "estimators": ["sampling", "iteration"],
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::validation::ValidationEngine;
use crate::error::{Error, Result};
use crate::pagerank::iterative::IterativePageRank;
use crate::pagerank::sampling::SamplingPageRank;
use crate::pagerank::{DEFAULT_DAMPING, DEFAULT_SAMPLES, DEFAULT_TOLERANCE};

/// Current spec version.
pub const SPEC_VERSION: u32 = 1;

/// Top-level rank specification (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSpec {
    /// Spec version (currently `1`).
    pub v: u32,

    /// Probability of following a link rather than teleporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,

    /// Sample count for the sampling estimator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,

    /// Per-page convergence tolerance for the iterative estimator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    /// Optional iteration cap for the iterative estimator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,

    /// Seed for reproducible sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Number of parallel sampling chains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<usize>,

    /// Estimators to run, in order. Omitted means both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimators: Option<Vec<EstimatorType>>,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    /// Used by the strict-mode validation rule.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Estimator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorType {
    /// Random-surfer sampling.
    Sampling,
    /// Fixed-point iteration.
    Iteration,
}

impl EstimatorType {
    /// Returns the user-facing name used in JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sampling => "sampling",
            Self::Iteration => "iteration",
        }
    }
}

impl Default for RankSpec {
    fn default() -> Self {
        Self {
            v: SPEC_VERSION,
            damping: None,
            samples: None,
            tolerance: None,
            max_iterations: None,
            seed: None,
            chains: None,
            estimators: None,
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }
}

impl RankSpec {
    /// Parse a spec from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a spec from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Run the default validation rules, failing on any error-severity
    /// diagnostic. Warnings are logged and otherwise ignored.
    pub fn into_validated(self) -> Result<Self> {
        let report = ValidationEngine::with_defaults().validate(&self);
        if report.has_errors() {
            return Err(Error::InvalidConfig(report));
        }

        #[cfg(feature = "tracing")]
        for warning in report.warnings() {
            tracing::warn!(%warning, "rank spec warning");
        }

        Ok(self)
    }

    pub fn damping(&self) -> f64 {
        self.damping.unwrap_or(DEFAULT_DAMPING)
    }

    pub fn samples(&self) -> usize {
        self.samples.unwrap_or(DEFAULT_SAMPLES)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }

    pub fn chains(&self) -> usize {
        self.chains.unwrap_or(1)
    }

    /// Selected estimators, defaulting to sampling then iteration.
    pub fn estimators(&self) -> Vec<EstimatorType> {
        self.estimators
            .clone()
            .unwrap_or_else(|| vec![EstimatorType::Sampling, EstimatorType::Iteration])
    }

    /// Whether `estimator` is selected.
    pub fn runs(&self, estimator: EstimatorType) -> bool {
        self.estimators().contains(&estimator)
    }

    /// Sampling estimator configured from this spec.
    pub fn sampler(&self) -> SamplingPageRank {
        let sampler = SamplingPageRank::new()
            .with_damping(self.damping())
            .with_samples(self.samples())
            .with_chains(self.chains());
        match self.seed {
            Some(seed) => sampler.with_seed(seed),
            None => sampler,
        }
    }

    /// Iterative estimator configured from this spec.
    pub fn iterator(&self) -> IterativePageRank {
        let iterator = IterativePageRank::new()
            .with_damping(self.damping())
            .with_tolerance(self.tolerance());
        match self.max_iterations {
            Some(max) => iterator.with_max_iterations(max),
            None => iterator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_spec() {
        let spec = RankSpec::from_json(r#"{ "v": 1 }"#).unwrap();
        assert_eq!(spec.v, 1);
        assert_eq!(spec.damping(), 0.85);
        assert_eq!(spec.samples(), 10_000);
        assert_eq!(spec.tolerance(), 0.001);
        assert_eq!(
            spec.estimators(),
            vec![EstimatorType::Sampling, EstimatorType::Iteration]
        );
        assert!(!spec.strict);
    }

    #[test]
    fn test_deserialize_full_spec() {
        let json = r#"{
            "v": 1,
            "damping": 0.9,
            "samples": 500,
            "tolerance": 0.0001,
            "max_iterations": 50,
            "seed": 7,
            "chains": 2,
            "estimators": ["iteration"],
            "strict": true
        }"#;
        let spec = RankSpec::from_json(json).unwrap();
        assert_eq!(spec.damping(), 0.9);
        assert_eq!(spec.samples(), 500);
        assert_eq!(spec.max_iterations, Some(50));
        assert_eq!(spec.seed, Some(7));
        assert_eq!(spec.chains(), 2);
        assert!(spec.runs(EstimatorType::Iteration));
        assert!(!spec.runs(EstimatorType::Sampling));
        assert!(spec.strict);
    }

    #[test]
    fn test_integer_damping_accepted() {
        let spec = RankSpec::from_json(r#"{ "v": 1, "damping": 0 }"#).unwrap();
        assert_eq!(spec.damping(), 0.0);
    }

    #[test]
    fn test_unknown_fields_captured() {
        let spec = RankSpec::from_json(r#"{ "v": 1, "dampening": 0.5 }"#).unwrap();
        assert!(spec.unknown_fields.contains_key("dampening"));
        assert!(spec.damping.is_none());
    }

    #[test]
    fn test_estimators_built_from_spec() {
        let spec = RankSpec::from_json(
            r#"{ "v": 1, "damping": 0.5, "samples": 300, "seed": 9, "max_iterations": 20 }"#,
        )
        .unwrap();

        let sampler = spec.sampler();
        assert_eq!(sampler.damping, 0.5);
        assert_eq!(sampler.samples, 300);
        assert_eq!(sampler.seed, Some(9));

        let iterator = spec.iterator();
        assert_eq!(iterator.damping, 0.5);
        assert_eq!(iterator.max_iterations, Some(20));
    }

    #[test]
    fn test_into_validated_rejects_bad_damping() {
        let spec = RankSpec::from_json(r#"{ "v": 1, "damping": 2.0 }"#).unwrap();
        match spec.into_validated() {
            Err(Error::InvalidConfig(report)) => assert_eq!(report.errors().count(), 1),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = r#"{"v":1,"samples":42,"estimators":["sampling"]}"#;
        let spec = RankSpec::from_json(json).unwrap();
        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back["samples"], 42);
        assert_eq!(back["estimators"][0], "sampling");
        assert!(back.get("damping").is_none());
    }
}
