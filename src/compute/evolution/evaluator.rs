//! Batch evaluation of chromosomes against a problem.

use rayon::prelude::*;

use crate::compute::problems::{Problem, ProblemError};
use crate::schema::Info;

use super::chromosome::{Chromosome, Evaluation};

/// Outcome counts of a batch evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub evaluated: usize,
    pub failed: usize,
}

/// Evaluate every chromosome in `batch` in parallel.
///
/// A chromosome whose evaluation fails is left unevaluated and logged; its
/// siblings are unaffected. Diversity is scored against the other successful
/// members of the same batch.
pub fn evaluate_batch<P: Problem>(problem: &P, batch: &mut [Chromosome<P>]) -> BatchReport {
    let outcomes: Vec<Result<(Info, f64, f64), ProblemError>> = batch
        .par_iter()
        .map(|chromosome| {
            let info = problem.info(chromosome.content())?;
            let quality = problem.quality(&info);
            let controllability = problem.controllability(&info, chromosome.control());
            Ok((info, quality, controllability))
        })
        .collect();

    let infos: Vec<(usize, &Info)> = outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, o)| o.as_ref().ok().map(|(info, _, _)| (i, info)))
        .collect();

    let mut others = Vec::with_capacity(infos.len().saturating_sub(1));
    let diversities: Vec<f64> = infos
        .iter()
        .map(|&(i, info)| {
            others.clear();
            others.extend(infos.iter().filter(|(j, _)| *j != i).map(|(_, o)| *o));
            problem.diversity(info, &others)
        })
        .collect();

    let mut report = BatchReport::default();
    let mut diversities = diversities.into_iter();
    for (index, (chromosome, outcome)) in batch.iter_mut().zip(outcomes).enumerate() {
        match outcome {
            Ok((info, quality, controllability)) => {
                let diversity = diversities.next().unwrap_or(0.0);
                chromosome.set_evaluation(Some(Evaluation {
                    info,
                    quality,
                    diversity,
                    controllability,
                }));
                report.evaluated += 1;
            }
            Err(err) => {
                log::warn!("Skipping batch member {index}: {err}");
                chromosome.set_evaluation(None);
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::fixtures::{Point, PointProblem};

    #[test]
    fn test_batch_populates_scores() {
        let problem = PointProblem::default();
        let mut batch = vec![
            Chromosome::<PointProblem>::new(Point::new(1.0, 1.0, 0.2), ()),
            Chromosome::new(Point::new(2.0, 2.0, 0.8), ()),
        ];
        let report = evaluate_batch(&problem, &mut batch);

        assert_eq!(
            report,
            BatchReport {
                evaluated: 2,
                failed: 0
            }
        );
        assert_eq!(batch[0].quality(), Some(0.2));
        assert_eq!(batch[1].quality(), Some(0.8));
        assert_eq!(batch[1].info().and_then(|i| i.get("y")), Some(2.0));
    }

    #[test]
    fn test_failure_is_isolated() {
        let problem = PointProblem::default();
        let mut batch = vec![
            Chromosome::<PointProblem>::new(Point::new(1.0, 1.0, 0.5), ()),
            Chromosome::new(Point::new(2.0, 2.0, -1.0), ()),
            Chromosome::new(Point::new(3.0, 3.0, 0.7), ()),
        ];
        let report = evaluate_batch(&problem, &mut batch);

        assert_eq!(report.evaluated, 2);
        assert_eq!(report.failed, 1);
        assert!(batch[0].is_evaluated());
        assert!(!batch[1].is_evaluated());
        assert_eq!(batch[2].quality(), Some(0.7));
    }

    #[test]
    fn test_empty_batch() {
        let problem = PointProblem::default();
        let mut batch: Vec<Chromosome<PointProblem>> = Vec::new();
        assert_eq!(evaluate_batch(&problem, &mut batch), BatchReport::default());
    }
}
