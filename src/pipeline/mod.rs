//! Rank pipeline: spec, validation, observers and the runner.

pub mod error_code;
pub mod errors;
pub mod observer;
pub mod runner;
pub mod spec;
pub mod validation;
