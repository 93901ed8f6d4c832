//! Corpus construction and representation
//!
//! This module provides incremental corpus building and the immutable
//! CSR storage the estimators read from.

pub mod builder;
pub mod csr;

pub use builder::CorpusBuilder;
pub use csr::Corpus;
