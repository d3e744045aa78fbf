//! Problem adapters: the capability interface the search is generic over.
//!
//! A [`Problem`] owns everything domain-specific: how content is sampled and
//! varied, how it is measured, and which measurements form the behavior
//! descriptor. The archive and the evolution loop never look inside content.

mod binary;

pub use binary::{BinaryControl, BinaryProblem, LevelStats, Tile, TileGrid};

use serde::Serialize;

use crate::compute::evolution::SearchRng;
use crate::schema::{DescriptorAxis, DescriptorSpace, Info};

/// A generation domain searched by MAP-Elites.
pub trait Problem: Send + Sync {
    /// Genome representation.
    type Content: Clone + Send + Sync;
    /// Control parameters a chromosome is asked to satisfy.
    type Control: Clone + Send + Sync + Serialize;

    /// Name used for snapshot directories and logs.
    fn name(&self) -> &str;

    /// Two-axis descriptor definition. Must be stable for the lifetime of a run.
    fn descriptor_space(&self) -> &DescriptorSpace;

    /// Project evaluated output onto the raw descriptor pair.
    fn behavior_descriptor(&self, info: &Info) -> Result<(f64, f64), ProblemError> {
        let space = self.descriptor_space();
        Ok((axis_value(info, &space.x)?, axis_value(info, &space.y)?))
    }

    /// Sample content from the valid content space.
    fn random_content(&self, rng: &mut SearchRng) -> Self::Content;

    /// Perturbed copy of `content`; `rate` is in `[0, 1]`.
    fn mutate_content(
        &self,
        content: &Self::Content,
        rate: f64,
        rng: &mut SearchRng,
    ) -> Self::Content;

    /// Recombine two contents.
    fn crossover_content(
        &self,
        a: &Self::Content,
        b: &Self::Content,
        rng: &mut SearchRng,
    ) -> Self::Content;

    /// Sample a control target.
    fn sample_control(&self, rng: &mut SearchRng) -> Self::Control;

    /// Perturbed copy of `control`; `rate` is in `[0, 1]`.
    fn mutate_control(
        &self,
        control: &Self::Control,
        _rate: f64,
        _rng: &mut SearchRng,
    ) -> Self::Control {
        control.clone()
    }

    /// Measure content. Must not touch any shared mutable state.
    fn info(&self, content: &Self::Content) -> Result<Info, ProblemError>;

    /// Quality scalar, higher is better.
    fn quality(&self, info: &Info) -> f64;

    /// How well `info` satisfies `control`.
    fn controllability(&self, info: &Info, control: &Self::Control) -> f64;

    /// Novelty of `info` relative to the rest of its evaluation batch.
    fn diversity(&self, _info: &Info, _others: &[&Info]) -> f64 {
        0.0
    }
}

fn axis_value(info: &Info, axis: &DescriptorAxis) -> Result<f64, ProblemError> {
    info.get(&axis.info_name)
        .ok_or_else(|| ProblemError::MissingField(axis.info_name.clone()))
}

/// Errors raised by problem adapters.
#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("Info is missing descriptor field '{0}'")]
    MissingField(String),
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// Piecewise-linear reward: 1 inside `[low, high]`, falling to 0 at `min` and `max`.
pub fn range_reward(value: f64, min: f64, low: f64, high: f64, max: f64) -> f64 {
    if (low..=high).contains(&value) {
        return 1.0;
    }
    if value <= min || value >= max {
        return 0.0;
    }
    if value < low {
        (value - min) / (low - min)
    } else {
        (max - value) / (max - high)
    }
}
