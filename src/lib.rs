//! PCG Elites - Quality-diversity search for procedural level generation.
//!
//! This crate implements MAP-Elites over a pluggable problem adapter and
//! ships a binary dungeon problem together with two constructive baseline
//! generators.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, descriptor space, measurements and snapshots
//! - `compute`: Search engine (`evolution`), problems and generators
//!
//! # Example
//!
//! ```rust,no_run
//! use pcg_elites::{
//!     compute::{evolution::MapElites, problems::BinaryProblem},
//!     schema::RunConfig,
//! };
//!
//! let config = RunConfig::default();
//! let problem = BinaryProblem::new(config.problem).unwrap();
//! let mut engine = MapElites::new(problem, config.search).unwrap();
//!
//! let summary = engine.run(config.iterations).unwrap();
//! println!(
//!     "Coverage after {} steps: {:.2}",
//!     summary.steps, summary.coverage
//! );
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{Chromosome, EliteGrid, MapElites, SearchError};
pub use compute::problems::{BinaryProblem, Problem};
pub use schema::{ArchiveSnapshot, DescriptorSpace, RunConfig, SearchConfig};
