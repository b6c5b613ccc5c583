//! Grid-refinement study of the integrator against an exponential profile.
//!
//! For `q(z) = A exp(-z/H)` the cumulative integral from the top `z_top` is
//! `A H (exp(-z/H) - exp(-z_top/H))`. On a uniform grid every trapezoid
//! carries the same relative error, `(h/2) coth(h/2) - 1` with `h = dz/H`,
//! so halving `dz` cuts the error by very nearly 4.

use crate::altitude_grid::{AltitudeGrid, MAX_GRID_SAMPLES};
use crate::cumulative_integration::integrate_grid_from_top;
use crate::error::{IntegrationError, Result};
use crate::math_utils::max_relative_error;

/// `A exp(-z/H)` sampled on `altitude`.
pub fn exponential_profile(altitude: &[f64], amplitude: f64, scale_height: f64) -> Vec<f64> {
    altitude
        .iter()
        .map(|z| amplitude * (-z / scale_height).exp())
        .collect()
}

/// Closed-form top-down integral of [`exponential_profile`].
pub fn exponential_from_top(grid: &AltitudeGrid, amplitude: f64, scale_height: f64) -> Vec<f64> {
    let Some(z_top) = grid.top() else {
        return Vec::new();
    };
    let top_term = (-z_top / scale_height).exp();
    grid.values()
        .iter()
        .map(|&z| {
            if z == z_top {
                0.0
            } else {
                amplitude * scale_height * ((-z / scale_height).exp() - top_term)
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceSample {
    pub step: f64,
    pub samples: usize,
    pub max_relative_error: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceStudy {
    pub samples: Vec<ConvergenceSample>,
}

impl ConvergenceStudy {
    /// Refine a uniform grid from `bottom` to `top`, starting at
    /// `coarse_step` and halving it `halvings` times.
    ///
    /// `top - bottom` must be a whole number of coarse steps.
    pub fn run(
        bottom: f64,
        top: f64,
        coarse_step: f64,
        halvings: usize,
        amplitude: f64,
        scale_height: f64,
    ) -> Result<Self> {
        let intervals = (top - bottom) / coarse_step;
        let whole = intervals.is_finite()
            && intervals >= 1.0
            && (intervals - intervals.round()).abs() <= 1e-9;
        if !(coarse_step.is_finite() && coarse_step > 0.0) || !whole {
            return Err(IntegrationError::InvalidGrid(format!(
                "span {} is not a whole number of {coarse_step} steps",
                top - bottom
            )));
        }
        let coarse_intervals = intervals.round() as usize;

        // sample count at the finest level must fit a grid
        let finest = Self::level_samples(coarse_intervals, halvings)
            .filter(|&count| count <= MAX_GRID_SAMPLES)
            .ok_or_else(|| {
                IntegrationError::InvalidGrid(format!(
                    "{halvings} halvings of {coarse_intervals} intervals exceed {MAX_GRID_SAMPLES} samples"
                ))
            })?;
        log::trace!("convergence study up to {finest} samples");

        let mut samples = Vec::with_capacity(halvings + 1);
        for level in 0..=halvings {
            let refinement = 1usize << level;
            let count = coarse_intervals * refinement + 1;
            let grid = AltitudeGrid::uniform(bottom, top, count)?;
            let rate = exponential_profile(grid.values(), amplitude, scale_height);
            let numerical = integrate_grid_from_top(&grid, &rate)?;
            let analytic = exponential_from_top(&grid, amplitude, scale_height);

            let sample = ConvergenceSample {
                step: coarse_step / refinement as f64,
                samples: count,
                max_relative_error: max_relative_error(&numerical, &analytic),
            };
            log::debug!(
                "dz = {:.4}: {} samples, max relative error {:.3e}",
                sample.step,
                sample.samples,
                sample.max_relative_error
            );
            samples.push(sample);
        }

        Ok(Self { samples })
    }

    /// `intervals * 2^level + 1`, or `None` on overflow.
    fn level_samples(intervals: usize, level: usize) -> Option<usize> {
        let level = u32::try_from(level).ok()?;
        let refinement = 1usize.checked_shl(level)?;
        intervals.checked_mul(refinement)?.checked_add(1)
    }

    /// error(dz) / error(dz/2) for each consecutive pair of levels.
    pub fn error_ratios(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .map(|w| w[0].max_relative_error / w[1].max_relative_error)
            .collect()
    }

    /// log2 of each error ratio; ~2 for a second-order method.
    pub fn observed_orders(&self) -> Vec<f64> {
        self.error_ratios().iter().map(|r| r.log2()).collect()
    }
}
