//! Deterministic toy problem used by the search tests.

use rand::Rng;
use rand_distr::StandardNormal;

use super::{Chromosome, SearchRng, evaluate_batch};
use crate::compute::problems::{Problem, ProblemError};
use crate::schema::{DescriptorAxis, DescriptorSpace, Info};

/// Content is the descriptor pair plus the quality itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Point {
    pub x: f64,
    pub y: f64,
    pub q: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, q: f64) -> Self {
        Self { x, y, q }
    }
}

/// Points in `[0, 10) x [0, 10)`; quality is `q`, negative `q` fails evaluation.
pub(crate) struct PointProblem {
    space: DescriptorSpace,
    /// Pin every sampled and mutated point to `(5, 5)`.
    pub collapse: bool,
    /// Omit the `y` field from info.
    pub drop_y: bool,
}

impl Default for PointProblem {
    fn default() -> Self {
        Self {
            space: DescriptorSpace {
                x: DescriptorAxis::new("x", 0.0, 10.0),
                y: DescriptorAxis::new("y", 0.0, 10.0),
            },
            collapse: false,
            drop_y: false,
        }
    }
}

impl PointProblem {
    pub fn collapsed() -> Self {
        Self {
            collapse: true,
            ..Default::default()
        }
    }

    pub fn without_y() -> Self {
        Self {
            drop_y: true,
            ..Default::default()
        }
    }

    fn nudge(value: f64, rate: f64, scale: f64, rng: &mut SearchRng) -> f64 {
        if rng.chance(rate) {
            let noise: f64 = rng.sample(StandardNormal);
            (value + noise * scale).clamp(0.0, 9.999)
        } else {
            value
        }
    }
}

impl Problem for PointProblem {
    type Content = Point;
    type Control = ();

    fn name(&self) -> &str {
        "points"
    }

    fn descriptor_space(&self) -> &DescriptorSpace {
        &self.space
    }

    fn random_content(&self, rng: &mut SearchRng) -> Point {
        let q = rng.gen_range(0.0..1.0);
        if self.collapse {
            Point::new(5.0, 5.0, q)
        } else {
            Point::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0), q)
        }
    }

    fn mutate_content(&self, content: &Point, rate: f64, rng: &mut SearchRng) -> Point {
        let q = Self::nudge(content.q, rate, 0.1, rng);
        if self.collapse {
            return Point::new(5.0, 5.0, q);
        }
        Point::new(
            Self::nudge(content.x, rate, 1.0, rng),
            Self::nudge(content.y, rate, 1.0, rng),
            q,
        )
    }

    fn crossover_content(&self, a: &Point, b: &Point, rng: &mut SearchRng) -> Point {
        Point::new(
            if rng.chance(0.5) { a.x } else { b.x },
            if rng.chance(0.5) { a.y } else { b.y },
            if rng.chance(0.5) { a.q } else { b.q },
        )
    }

    fn sample_control(&self, _rng: &mut SearchRng) {}

    fn info(&self, content: &Point) -> Result<Info, ProblemError> {
        if content.q < 0.0 {
            return Err(ProblemError::Evaluation("negative quality".into()));
        }
        let mut info = Info::new().with("x", content.x).with("q", content.q);
        if !self.drop_y {
            info.insert("y", content.y);
        }
        Ok(info)
    }

    fn quality(&self, info: &Info) -> f64 {
        info.get("q").unwrap_or(0.0)
    }

    fn controllability(&self, _info: &Info, _control: &()) -> f64 {
        0.0
    }
}

/// Evaluate a single point into a ready-to-place chromosome.
pub(crate) fn evaluated(problem: &PointProblem, point: Point) -> Chromosome<PointProblem> {
    let mut batch = vec![Chromosome::new(point, ())];
    evaluate_batch(problem, &mut batch);
    batch.remove(0)
}
