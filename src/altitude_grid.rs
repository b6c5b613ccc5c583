//! Checked altitude grids.
//!
//! An [`AltitudeGrid`] is validated once, on construction, to be strictly
//! monotonic. It may be stored bottom-up or top-down and need not be
//! uniformly spaced; [`AltitudeGrid::top_index`] finds the top of the
//! atmosphere either way.

use crate::constants::PhysicalConstants;
use crate::error::{IntegrationError, Result};
use crate::math_utils::linspace;
use rand::Rng;

/// Upper bound on the samples any grid builder will produce.
pub const MAX_GRID_SAMPLES: usize = 1 << 24;

/// Storage order of a grid, as seen from the first to the last sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridOrientation {
    /// Altitude grows with index; the top is the last sample.
    Increasing,
    /// Altitude falls with index; the top is the first sample.
    Decreasing,
    Single,
    Empty,
}

impl GridOrientation {
    /// Orientation from the two endpoints alone.
    ///
    /// This is all the integrator needs; interior monotonicity is checked
    /// separately by [`ensure_strictly_monotonic`].
    pub fn from_endpoints(altitude: &[f64]) -> Self {
        match altitude {
            [] => GridOrientation::Empty,
            [_] => GridOrientation::Single,
            [first, .., last] => {
                if first >= last {
                    GridOrientation::Decreasing
                } else {
                    GridOrientation::Increasing
                }
            }
        }
    }

    /// Index of the top-of-atmosphere sample for a grid of `len` samples.
    pub fn top_index(&self, len: usize) -> Option<usize> {
        match self {
            GridOrientation::Empty => None,
            GridOrientation::Single | GridOrientation::Decreasing => Some(0),
            GridOrientation::Increasing => Some(len - 1),
        }
    }
}

/// Fails with `NonMonotonic` at the first sample that breaks the ordering
/// set by the first pair. NaN altitudes always fail.
pub fn ensure_strictly_monotonic(altitude: &[f64]) -> Result<()> {
    if let [single] = altitude {
        if single.is_nan() {
            return Err(IntegrationError::NonMonotonic { index: 0 });
        }
    }
    let increasing = match altitude {
        [first, second, ..] => second > first,
        _ => return Ok(()),
    };
    for (i, pair) in altitude.windows(2).enumerate() {
        let ordered = if increasing { pair[1] > pair[0] } else { pair[1] < pair[0] };
        if !ordered {
            return Err(IntegrationError::NonMonotonic { index: i + 1 });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AltitudeGrid {
    values: Vec<f64>,
    orientation: GridOrientation,
}

impl AltitudeGrid {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        ensure_strictly_monotonic(&values)?;
        let orientation = GridOrientation::from_endpoints(&values);
        Ok(Self { values, orientation })
    }

    /// `count` evenly spaced altitudes from `first` to `last`, stored in that order.
    pub fn uniform(first: f64, last: f64, count: usize) -> Result<Self> {
        if count > 1 && first == last {
            return Err(IntegrationError::InvalidGrid(format!(
                "{count} samples cannot span a zero-length interval at {first}"
            )));
        }
        if count > MAX_GRID_SAMPLES {
            return Err(IntegrationError::InvalidGrid(format!(
                "{count} samples exceeds the limit of {MAX_GRID_SAMPLES}"
            )));
        }
        Self::new(linspace(first, last, count))
    }

    /// Bottom-up grid whose step starts at `first_step` and grows by `growth`
    /// each sample, ending exactly at `top`.
    ///
    /// The final step is shortened to land on `top`; a remainder smaller than
    /// a tenth of the previous step is merged into it instead. Fails with
    /// `InvalidGrid` if a step vanishes against `z` in floating point or the
    /// grid would need more than [`MAX_GRID_SAMPLES`] samples.
    pub fn stretched(bottom: f64, first_step: f64, growth: f64, top: f64) -> Result<Self> {
        let finite = bottom.is_finite() && top.is_finite() && first_step.is_finite() && growth.is_finite();
        if !finite || !(top > bottom) || !(first_step > 0.0) || !(growth >= 1.0) {
            return Err(IntegrationError::InvalidGrid(format!(
                "stretched grid needs finite top > bottom, step > 0 and growth >= 1 \
                 (bottom {bottom}, top {top}, step {first_step}, growth {growth})"
            )));
        }

        // steps needed from the geometric series
        let span = top - bottom;
        let estimate = if growth == 1.0 {
            span / first_step
        } else {
            (1.0 + span * (growth - 1.0) / first_step).ln() / growth.ln()
        };
        if !(estimate < MAX_GRID_SAMPLES as f64) {
            return Err(IntegrationError::InvalidGrid(format!(
                "stretched grid from {bottom} to {top} needs about {estimate:.0} samples, \
                 more than {MAX_GRID_SAMPLES}"
            )));
        }

        let mut values = vec![bottom];
        let mut step = first_step;
        let mut z = bottom;
        while z + step < top {
            let next = z + step;
            if next <= z {
                return Err(IntegrationError::InvalidGrid(format!(
                    "step {step} vanishes against altitude {z}"
                )));
            }
            if values.len() >= MAX_GRID_SAMPLES {
                return Err(IntegrationError::InvalidGrid(format!(
                    "stretched grid from {bottom} to {top} needs more than {MAX_GRID_SAMPLES} samples"
                )));
            }
            z = next;
            values.push(z);
            step *= growth;
        }
        if let Some(&last) = values.last() {
            if values.len() > 1 && top - last < 0.1 * step / growth {
                values.pop();
            }
        }
        values.push(top);
        Self::new(values)
    }

    /// Bottom-up grid of `count` samples with every interior point moved by a
    /// random fraction (up to `jitter`, below 0.5) of the uniform spacing.
    pub fn jittered<R: Rng + ?Sized>(
        bottom: f64,
        top: f64,
        count: usize,
        jitter: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(top > bottom) || count < 2 || count > MAX_GRID_SAMPLES || !(0.0..0.5).contains(&jitter) {
            return Err(IntegrationError::InvalidGrid(format!(
                "jittered grid needs top > bottom, 2 to {MAX_GRID_SAMPLES} samples and jitter in [0, 0.5) \
                 (bottom {bottom}, top {top}, count {count}, jitter {jitter})"
            )));
        }

        let spacing = (top - bottom) / (count - 1) as f64;
        let mut values = linspace(bottom, top, count);
        let interior = count - 1;
        for z in values.iter_mut().take(interior).skip(1) {
            if jitter > 0.0 {
                *z += rng.random_range(-jitter..jitter) * spacing;
            }
        }
        Self::new(values)
    }

    /// Same grid rescaled from kilometres to centimetres.
    ///
    /// The factor must be finite and positive so the top stays on the same
    /// sample; the scaled values are checked again like any new grid.
    pub fn to_centimetres_from_km(&self, constants: &PhysicalConstants) -> Result<Self> {
        let factor = constants.km_to_cm;
        if !(factor.is_finite() && factor > 0.0) {
            return Err(IntegrationError::InvalidGrid(format!(
                "km to cm factor must be finite and positive, got {factor}"
            )));
        }
        Self::new(self.values.iter().map(|z| z * factor).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn orientation(&self) -> GridOrientation {
        self.orientation
    }

    pub fn top_index(&self) -> Option<usize> {
        self.orientation.top_index(self.len())
    }

    pub fn bottom_index(&self) -> Option<usize> {
        match self.orientation {
            GridOrientation::Empty => None,
            GridOrientation::Single | GridOrientation::Increasing => Some(0),
            GridOrientation::Decreasing => Some(self.len() - 1),
        }
    }

    pub fn top(&self) -> Option<f64> {
        self.top_index().map(|i| self.values[i])
    }

    pub fn bottom(&self) -> Option<f64> {
        self.bottom_index().map(|i| self.values[i])
    }

    /// Distance between top and bottom; 0 for fewer than two samples.
    pub fn span(&self) -> f64 {
        match (self.top(), self.bottom()) {
            (Some(top), Some(bottom)) => top - bottom,
            _ => 0.0,
        }
    }

    /// True when every step matches the first within `tolerance` (relative).
    pub fn is_uniform(&self, tolerance: f64) -> bool {
        let steps: Vec<f64> = self.values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        match steps.first() {
            None => true,
            Some(&first) => steps.iter().all(|s| (s - first).abs() <= tolerance * first),
        }
    }
}
