//! Constructive dungeon generators scored with the binary problem.
//!
//! These are one-shot generators rather than search: each call produces a
//! single level from its parameters and a random stream. They are useful as
//! baselines for the levels MAP-Elites discovers.

mod agent;
mod bsp;

pub use agent::{AGENT_SWEEP_INCREASES, AgentDigger, AgentParams, Heading};
pub use bsp::{BSP_SWEEP_DEPTHS, BspGenerator, BspNode, BspParams, BspTree, Rect};

use serde::{Deserialize, Serialize};

use crate::compute::problems::{BinaryProblem, Problem, TileGrid};
use crate::schema::Info;

/// A generated level together with its parameters and scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport<T> {
    /// Generator parameters used.
    pub params: T,
    /// Binary problem quality of the level.
    pub quality: f64,
    /// Binary problem measurements.
    pub info: Info,
    /// Tile values, `content[y][x]`.
    pub content: Vec<Vec<u8>>,
}

impl<T> GenerationReport<T> {
    /// Score `grid` against `problem`.
    pub fn score(problem: &BinaryProblem, params: T, grid: &TileGrid) -> Self {
        let info = problem.measure(grid);
        Self {
            params,
            quality: problem.quality(&info),
            info,
            content: grid.rows(),
        }
    }
}
