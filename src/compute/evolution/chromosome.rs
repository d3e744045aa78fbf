//! Candidate solutions and their genetic operators.

use crate::compute::problems::Problem;
use crate::schema::{EliteRecord, Info};

use super::rng::SearchRng;

/// Scores attached to a chromosome once it has been evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub info: Info,
    pub quality: f64,
    pub diversity: f64,
    pub controllability: f64,
}

/// A candidate solution: content, its control target and (once evaluated) its scores.
///
/// Operators never modify their receiver and always return an unevaluated chromosome.
pub struct Chromosome<P: Problem> {
    content: P::Content,
    control: P::Control,
    evaluation: Option<Evaluation>,
}

impl<P: Problem> Clone for Chromosome<P> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            control: self.control.clone(),
            evaluation: self.evaluation.clone(),
        }
    }
}

impl<P: Problem> Chromosome<P> {
    /// Unevaluated chromosome from explicit parts.
    pub fn new(content: P::Content, control: P::Control) -> Self {
        Self {
            content,
            control,
            evaluation: None,
        }
    }

    /// Sample content and control from the problem.
    pub fn random(problem: &P, rng: &mut SearchRng) -> Self {
        let content = problem.random_content(rng);
        let control = problem.sample_control(rng);
        Self::new(content, control)
    }

    /// Perturbed copy of this chromosome.
    pub fn mutate(&self, problem: &P, rate: f64, rng: &mut SearchRng) -> Self {
        let content = problem.mutate_content(&self.content, rate, rng);
        let control = problem.mutate_control(&self.control, rate, rng);
        Self::new(content, control)
    }

    /// Recombine with `other`. The control target is inherited from either parent.
    pub fn crossover(&self, other: &Self, problem: &P, rng: &mut SearchRng) -> Self {
        let content = problem.crossover_content(&self.content, &other.content, rng);
        let control = if rng.chance(0.5) {
            self.control.clone()
        } else {
            other.control.clone()
        };
        Self::new(content, control)
    }

    pub fn content(&self) -> &P::Content {
        &self.content
    }

    pub fn control(&self) -> &P::Control {
        &self.control
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    pub fn info(&self) -> Option<&Info> {
        self.evaluation.as_ref().map(|e| &e.info)
    }

    pub fn quality(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|e| e.quality)
    }

    pub(crate) fn set_evaluation(&mut self, evaluation: Option<Evaluation>) {
        self.evaluation = evaluation;
    }

    /// Snapshot record, `None` while unevaluated.
    pub fn to_record(&self) -> Option<EliteRecord<P::Control>> {
        self.evaluation.as_ref().map(|e| EliteRecord {
            control: self.control.clone(),
            info: e.info.clone(),
            quality: e.quality,
            diversity: e.diversity,
            controllability: e.controllability,
        })
    }
}
