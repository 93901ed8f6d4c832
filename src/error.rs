//! Error types for link-rank.

use thiserror::Error;

use crate::pipeline::validation::ValidationReport;

/// Error type for corpus construction, estimator setup and configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The corpus cannot be ranked (currently: it has no pages).
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    /// A page links to something that is not a page of the corpus.
    #[error("page {page:?} links to {target:?}, which is not in the corpus")]
    UnknownLinkTarget { page: String, target: String },

    /// A page links to itself.
    #[error("page {0:?} links to itself")]
    SelfLink(String),

    /// An estimator parameter is outside its accepted range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A rank spec failed validation.
    #[error("invalid rank spec ({} error(s))", .0.errors().count())]
    InvalidConfig(ValidationReport),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for link-rank operations.
pub type Result<T> = std::result::Result<T, Error>;
