//! Behavior descriptor space definitions and binning.

use serde::{Deserialize, Serialize};

/// Offset subtracted from an axis maximum so that `value == max` stays in the last bin.
pub const BIN_EPSILON: f64 = 1e-9;

/// One axis of the descriptor space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorAxis {
    /// Name of the `Info` field supplying the raw value.
    pub info_name: String,
    /// Inclusive lower bound.
    #[serde(default)]
    pub min: f64,
    /// Exclusive upper bound.
    pub max: f64,
}

impl DescriptorAxis {
    pub fn new(info_name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            info_name: info_name.into(),
            min,
            max,
        }
    }

    /// Map a raw value on this axis to a bin in `[0, bins)`.
    #[inline]
    pub fn bin(&self, value: f64, bins: usize) -> usize {
        bin(value, self.min, self.max, bins)
    }
}

/// Two-axis behavior space used to index the elite grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSpace {
    pub x: DescriptorAxis,
    pub y: DescriptorAxis,
}

impl DescriptorSpace {
    /// Build a validated descriptor space.
    pub fn new(x: DescriptorAxis, y: DescriptorAxis) -> Result<Self, DescriptorError> {
        let space = Self { x, y };
        space.validate()?;
        Ok(space)
    }

    /// Check that both axes have `max > min` and finite bounds.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        for (name, axis) in [("X", &self.x), ("Y", &self.y)] {
            if !(axis.min.is_finite() && axis.max.is_finite() && axis.max > axis.min) {
                return Err(DescriptorError::InvalidRange {
                    axis: name,
                    min: axis.min,
                    max: axis.max,
                });
            }
        }
        Ok(())
    }

    /// Grid cell `(ix, iy)` for a raw descriptor pair.
    pub fn cell(&self, (x, y): (f64, f64), bins: usize) -> (usize, usize) {
        (self.x.bin(x, bins), self.y.bin(y, bins))
    }
}

/// Map `value` to a bin index in `[0, bins)`.
///
/// The value is clamped to `[min, max - BIN_EPSILON]` before linear binning, so
/// every input (including `max` itself, infinities and NaN) yields a valid index.
/// `bins` must be non-zero.
pub fn bin(value: f64, min: f64, max: f64, bins: usize) -> usize {
    debug_assert!(bins > 0, "bin count must be non-zero");
    let clamped = min.max(value.min(max - BIN_EPSILON));
    let index = ((clamped - min) / (max - min) * bins as f64) as usize;
    // Wide ranges can swallow the epsilon entirely.
    index.min(bins - 1)
}

/// Descriptor space validation errors.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Descriptor axis {axis} has invalid range [{min}, {max})")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bin_boundaries() {
        assert_eq!(bin(0.0, 0.0, 10.0, 10), 0);
        assert_eq!(bin(10.0, 0.0, 10.0, 10), 9);
        assert_eq!(bin(4.99, 0.0, 10.0, 10), 4);
        assert_eq!(bin(5.0, 0.0, 10.0, 10), 5);
    }

    #[test]
    fn test_bin_clamps_out_of_range() {
        assert_eq!(bin(-3.0, 0.0, 10.0, 10), 0);
        assert_eq!(bin(1e12, 0.0, 10.0, 10), 9);
        assert_eq!(bin(f64::INFINITY, 0.0, 10.0, 10), 9);
        assert_eq!(bin(f64::NEG_INFINITY, 0.0, 10.0, 10), 0);
    }

    #[test]
    fn test_bin_wide_range_stays_in_bounds() {
        assert_eq!(bin(1e12, 0.0, 1e12, 10), 9);
    }

    #[test]
    fn test_space_rejects_inverted_axis() {
        let result = DescriptorSpace::new(
            DescriptorAxis::new("a", 0.0, 1.0),
            DescriptorAxis::new("b", 5.0, 5.0),
        );
        assert!(matches!(
            result,
            Err(DescriptorError::InvalidRange { axis: "Y", .. })
        ));
    }

    #[test]
    fn test_space_cell() {
        let space = DescriptorSpace::new(
            DescriptorAxis::new("a", 0.0, 10.0),
            DescriptorAxis::new("b", -1.0, 1.0),
        )
        .unwrap();
        assert_eq!(space.cell((2.5, 0.0), 4), (1, 2));
    }

    proptest! {
        #[test]
        fn prop_bin_is_total(
            value in proptest::num::f64::ANY,
            min in -1e6f64..1e6,
            width in 1e-3f64..1e6,
            bins in 1usize..64,
        ) {
            let index = bin(value, min, min + width, bins);
            prop_assert!(index < bins);
        }

        #[test]
        fn prop_bin_is_monotonic(
            a in -100.0f64..100.0,
            b in -100.0f64..100.0,
            bins in 1usize..32,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(bin(lo, -50.0, 50.0, bins) <= bin(hi, -50.0, 50.0, bins));
        }
    }
}
