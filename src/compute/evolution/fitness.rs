//! Fitness rules used by the archive's replacement comparator.

use crate::schema::FitnessRule;

use super::chromosome::Evaluation;

impl FitnessRule {
    /// Score an evaluation. Each secondary term only counts once the
    /// preceding ones are saturated at 1.
    pub fn score(self, evaluation: &Evaluation) -> f64 {
        let quality = evaluation.quality;
        let control_open = quality >= 1.0;
        let control = if control_open {
            evaluation.controllability
        } else {
            0.0
        };

        match self {
            FitnessRule::Quality => quality,
            FitnessRule::QualityControl => (quality + control) / 2.0,
            FitnessRule::QualityControlDiversity => {
                let diversity = if control_open && evaluation.controllability >= 1.0 {
                    evaluation.diversity
                } else {
                    0.0
                };
                (quality + control + diversity) / 3.0
            }
        }
    }
}
