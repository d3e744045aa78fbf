//! MAP-Elites quality-diversity search.
//!
//! # Overview
//!
//! The search keeps a square grid of elites indexed by two behavior
//! descriptors and improves it by mutating and recombining sampled elites:
//!
//! - **Random Source** (`rng`): Seedable generator threaded through every operator
//! - **Chromosomes** (`chromosome`): Content, control target and evaluation scores
//! - **Evaluator** (`evaluator`): Parallel batch scoring against a [`Problem`]
//! - **Elite Grid** (`archive`): Binning and the strict-improvement replacement rule
//! - **Generator** (`generator`): The initialize / step state machine
//! - **Snapshots** (`snapshot`): Per-iteration archive export
//!
//! # Example
//!
//! ```rust,no_run
//! use pcg_elites::compute::evolution::{JsonSnapshotWriter, MapElites};
//! use pcg_elites::compute::problems::BinaryProblem;
//! use pcg_elites::schema::{BinaryConfig, SearchConfig};
//!
//! let problem = BinaryProblem::new(BinaryConfig::default()).unwrap();
//! let config = SearchConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = MapElites::new(problem, config)
//!     .unwrap()
//!     .with_sink(JsonSnapshotWriter::new("./results"));
//! let summary = engine.run(10).unwrap();
//!
//! println!("Coverage: {:.2}", summary.coverage);
//! ```
//!
//! [`Problem`]: crate::compute::problems::Problem

mod archive;
mod chromosome;
mod error;
mod evaluator;
mod fitness;
mod generator;
mod rng;
mod snapshot;

#[cfg(test)]
pub(crate) mod fixtures;

pub use archive::EliteGrid;
pub use chromosome::{Chromosome, Evaluation};
pub use error::{SearchError, SnapshotError};
pub use evaluator::{BatchReport, evaluate_batch};
pub use generator::{MapElites, RunPhase, RunSummary, StepOutcome, StepReport};
pub use rng::SearchRng;
pub use snapshot::{JsonSnapshotWriter, MemorySink, NullSink, SnapshotSink};
