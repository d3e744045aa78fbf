//! Compute module - search engine, problems and constructive generators.

pub mod evolution;
pub mod generators;
pub mod problems;
