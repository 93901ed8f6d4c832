//! Validation engine for rank specifications.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`RankSpec`](super::spec::RankSpec) and collects every diagnostic
//! into a [`ValidationReport`]. It never short-circuits on the first error,
//! so users see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use link_rank::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&spec);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use std::collections::HashSet;

use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::RankSpecError;
use super::spec::*;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding: an error or warning attached to a
/// [`RankSpecError`] that carries the code, path, message, and hint.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: RankSpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: RankSpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: RankSpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &RankSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &RankSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`RankSpec`] and returns
/// zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"damping_range"`).
    fn name(&self) -> &str;

    /// Inspect `spec` and return any findings.
    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`RankSpec`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(VersionRule));
        engine.add_rule(Box::new(DampingRangeRule));
        engine.add_rule(Box::new(SampleCountRule));
        engine.add_rule(Box::new(ToleranceRule));
        engine.add_rule(Box::new(ChainCountRule));
        engine.add_rule(Box::new(EstimatorSelectionRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &RankSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(spec));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. Only spec version 1 exists ──────────────────────────────────────────

struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &str {
        "version"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        if spec.v == SPEC_VERSION {
            return vec![];
        }
        vec![ValidationDiagnostic::error(
            RankSpecError::new(
                ErrorCode::InvalidValue,
                "/v",
                format!("unsupported spec version {}", spec.v),
            )
            .with_hint(format!("Set v to {SPEC_VERSION}")),
        )]
    }
}

// ─── 2. Damping must be a probability ───────────────────────────────────────

struct DampingRangeRule;

impl ValidationRule for DampingRangeRule {
    fn name(&self) -> &str {
        "damping_range"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let Some(damping) = spec.damping else {
            return vec![];
        };

        if damping.is_nan() {
            return vec![ValidationDiagnostic::error(RankSpecError::new(
                ErrorCode::InvalidValue,
                "/damping",
                "damping must be a number",
            ))];
        }

        if !(0.0..=1.0).contains(&damping) {
            return vec![ValidationDiagnostic::error(
                RankSpecError::new(
                    ErrorCode::OutOfRange,
                    "/damping",
                    format!("damping {damping} is outside [0, 1]"),
                )
                .with_hint("Typical values are between 0.8 and 0.9"),
            )];
        }

        // Without teleportation the iteration may never settle
        if damping == 1.0 && spec.runs(EstimatorType::Iteration) && spec.max_iterations.is_none()
        {
            return vec![ValidationDiagnostic::error(
                RankSpecError::new(
                    ErrorCode::InvalidCombo,
                    "/damping",
                    "damping 1 with the iteration estimator requires max_iterations",
                )
                .with_hint("Lower damping below 1 or set max_iterations"),
            )];
        }

        vec![]
    }
}

// ─── 3. Sampling needs at least one transition ──────────────────────────────

struct SampleCountRule;

impl ValidationRule for SampleCountRule {
    fn name(&self) -> &str {
        "sample_count"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        match spec.samples {
            Some(samples) if samples < 2 => vec![ValidationDiagnostic::error(
                RankSpecError::new(
                    ErrorCode::OutOfRange,
                    "/samples",
                    format!("samples must be at least 2, got {samples}"),
                )
                .with_hint("Remove samples to use the default of 10000"),
            )],
            _ => vec![],
        }
    }
}

// ─── 4. Tolerance and iteration cap must be positive ────────────────────────

struct ToleranceRule;

impl ValidationRule for ToleranceRule {
    fn name(&self) -> &str {
        "tolerance_positive"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        if let Some(tolerance) = spec.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                out.push(ValidationDiagnostic::error(
                    RankSpecError::new(
                        ErrorCode::OutOfRange,
                        "/tolerance",
                        "tolerance must be a positive number",
                    )
                    .with_hint("Remove tolerance to use the default of 0.001"),
                ));
            } else if tolerance < f64::EPSILON
                && spec.runs(EstimatorType::Iteration)
                && spec.max_iterations.is_none()
            {
                // Rounding noise alone can keep the per-page change above it
                out.push(ValidationDiagnostic::error(
                    RankSpecError::new(
                        ErrorCode::InvalidCombo,
                        "/tolerance",
                        format!(
                            "tolerance {tolerance} is below f64 resolution and requires max_iterations"
                        ),
                    )
                    .with_hint("Raise tolerance to at least 2.2e-16 or set max_iterations"),
                ));
            }
        }

        if spec.max_iterations == Some(0) {
            out.push(ValidationDiagnostic::error(
                RankSpecError::new(
                    ErrorCode::OutOfRange,
                    "/max_iterations",
                    "max_iterations must be greater than 0",
                )
                .with_hint("Remove max_iterations to iterate until convergence"),
            ));
        }

        out
    }
}

// ─── 5. Chains must share the sample budget ─────────────────────────────────

struct ChainCountRule;

impl ValidationRule for ChainCountRule {
    fn name(&self) -> &str {
        "chain_count"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let Some(chains) = spec.chains else {
            return vec![];
        };

        if chains == 0 {
            return vec![ValidationDiagnostic::error(RankSpecError::new(
                ErrorCode::OutOfRange,
                "/chains",
                "chains must be greater than 0",
            ))];
        }

        let transitions = spec.samples().saturating_sub(1);
        if transitions >= 1 && chains > transitions {
            return vec![ValidationDiagnostic::error(
                RankSpecError::new(
                    ErrorCode::InvalidCombo,
                    "/chains",
                    format!("{chains} chains cannot share {transitions} transitions"),
                )
                .with_hint("Use fewer chains or more samples"),
            )];
        }

        vec![]
    }
}

// ─── 6. At least one estimator, none twice ──────────────────────────────────

struct EstimatorSelectionRule;

impl ValidationRule for EstimatorSelectionRule {
    fn name(&self) -> &str {
        "estimator_selection"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let Some(estimators) = &spec.estimators else {
            return vec![];
        };

        if estimators.is_empty() {
            return vec![ValidationDiagnostic::error(
                RankSpecError::new(
                    ErrorCode::InvalidValue,
                    "/estimators",
                    "no estimator selected",
                )
                .with_hint("Select \"sampling\", \"iteration\", or both"),
            )];
        }

        let mut seen = HashSet::new();
        estimators
            .iter()
            .enumerate()
            .filter(|(_, e)| !seen.insert(**e))
            .map(|(i, e)| {
                ValidationDiagnostic::warning(RankSpecError::new(
                    ErrorCode::InvalidValue,
                    format!("/estimators/{i}"),
                    format!("{} is selected more than once", e.as_str()),
                ))
            })
            .collect()
    }
}

// ─── 7. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<ValidationDiagnostic> {
        let diag_fn = if spec.strict {
            ValidationDiagnostic::error
        } else {
            ValidationDiagnostic::warning
        };

        let mut keys: Vec<_> = spec.unknown_fields.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                diag_fn(
                    RankSpecError::new(
                        ErrorCode::UnknownField,
                        format!("/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
