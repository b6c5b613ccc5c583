//! Top-down cumulative trapezoidal integration.
//!
//! Given an altitude grid and a rate sampled on it, produces the integral of
//! the rate from the top of the atmosphere down to every grid point. The
//! result is anchored at exactly zero on the top sample and grows in
//! magnitude away from it when the rate is non-negative, whichever way the
//! grid is stored.
//!
//! No sign convention is applied on top of that magnitude. Callers that want
//! a signed (e.g. downward flux) quantity negate it themselves.
//!
//! Data problems are not errors: negative rates are kept, and a NaN rate
//! poisons every cumulative value whose path from the top crosses a
//! trapezoid touching it, while values on the top side stay finite.

use crate::altitude_grid::{AltitudeGrid, GridOrientation, ensure_strictly_monotonic};
use crate::error::{IntegrationError, Result};
use rayon::prelude::*;

/// Area of one trapezoid, with `upper` the sample nearer the top.
///
/// Both storage orders call this with the same argument order, so a reversed
/// grid reproduces every value bit for bit.
#[inline]
fn trapezoid_area(z_upper: f64, z_lower: f64, rate_upper: f64, rate_lower: f64) -> f64 {
    0.5 * (rate_upper + rate_lower) * (z_upper - z_lower)
}

fn ensure_same_shape(altitude: &[f64], rate: &[f64]) -> Result<()> {
    if altitude.len() != rate.len() {
        return Err(IntegrationError::ShapeMismatch {
            altitude: altitude.len(),
            rate: rate.len(),
        });
    }
    Ok(())
}

/// Accumulate assuming shape and monotonicity were already checked.
fn accumulate(altitude: &[f64], rate: &[f64], orientation: GridOrientation) -> Vec<f64> {
    let n = altitude.len();
    let mut cumulative = vec![0.0; n];

    match orientation {
        GridOrientation::Empty | GridOrientation::Single => {}
        GridOrientation::Increasing => {
            // top is n-1, walk toward index 0
            for i in (0..n - 1).rev() {
                let area = trapezoid_area(altitude[i + 1], altitude[i], rate[i + 1], rate[i]);
                cumulative[i] = cumulative[i + 1] + area;
            }
        }
        GridOrientation::Decreasing => {
            for i in 1..n {
                let area = trapezoid_area(altitude[i - 1], altitude[i], rate[i - 1], rate[i]);
                cumulative[i] = cumulative[i - 1] + area;
            }
        }
    }

    cumulative
}

/// Cumulative integral of `rate` from the top of `altitude` to each sample.
///
/// The top is whichever endpoint has the larger altitude. Fails with
/// `ShapeMismatch` on unequal lengths and `NonMonotonic` if the grid is not
/// strictly monotonic. An empty input gives an empty output and a single
/// sample gives `[0.0]`.
///
/// # Examples
/// ```
/// use precip_ionization_rust::cumulative_integration::integrate_from_top;
///
/// let q_cum = integrate_from_top(&[0.0, 10.0, 20.0, 30.0], &[1.0, 1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(q_cum, vec![30.0, 20.0, 10.0, 0.0]);
/// ```
pub fn integrate_from_top(altitude: &[f64], rate: &[f64]) -> Result<Vec<f64>> {
    ensure_same_shape(altitude, rate)?;
    ensure_strictly_monotonic(altitude)?;
    let orientation = GridOrientation::from_endpoints(altitude);
    log::trace!("integrating {} samples, grid {:?}", altitude.len(), orientation);
    Ok(accumulate(altitude, rate, orientation))
}

/// [`integrate_from_top`] on a grid that was validated when it was built.
pub fn integrate_grid_from_top(grid: &AltitudeGrid, rate: &[f64]) -> Result<Vec<f64>> {
    ensure_same_shape(grid.values(), rate)?;
    Ok(accumulate(grid.values(), rate, grid.orientation()))
}

/// Integral over the whole column, i.e. the cumulative value at the bottom.
pub fn column_total(altitude: &[f64], rate: &[f64]) -> Result<f64> {
    let cumulative = integrate_from_top(altitude, rate)?;
    let bottom = GridOrientation::from_endpoints(altitude);
    Ok(match bottom {
        GridOrientation::Empty | GridOrientation::Single => 0.0,
        GridOrientation::Increasing => cumulative[0],
        GridOrientation::Decreasing => cumulative[cumulative.len() - 1],
    })
}

/// Integrate independent channels (energy bins, pitch angles, L-shells)
/// sharing one grid, in parallel. Output order follows `channels`.
pub fn integrate_channels_from_top(grid: &AltitudeGrid, channels: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    if let Some((channel, rate)) = channels.iter().enumerate().find(|(_, r)| r.len() != grid.len()) {
        return Err(IntegrationError::ChannelShape {
            channel,
            expected: grid.len(),
            found: rate.len(),
        });
    }

    channels
        .par_iter()
        .map(|rate| integrate_grid_from_top(grid, rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use more_asserts::assert_ge;

    #[test]
    fn test_increasing_constant_rate() {
        let result = integrate_from_top(&[0.0, 10.0, 20.0, 30.0], &[1.0; 4]).unwrap();
        assert_eq!(result, vec![30.0, 20.0, 10.0, 0.0]);
    }

    #[test]
    fn test_decreasing_grid_top_is_first() {
        let z = [300.0, 250.0, 200.0, 150.0, 100.0];
        let q = [0.1, 0.5, 1.5, 3.0, 5.0];
        let result = integrate_from_top(&z, &q).unwrap();

        let expected_total = 0.5 * (0.1 + 0.5) * 50.0
            + 0.5 * (0.5 + 1.5) * 50.0
            + 0.5 * (1.5 + 3.0) * 50.0
            + 0.5 * (3.0 + 5.0) * 50.0;

        assert_eq!(result[0], 0.0);
        assert_relative_eq!(result[4], expected_total, max_relative = 1e-14);
        for pair in result.windows(2) {
            assert_ge!(pair[1], pair[0]);
        }
    }

    #[test]
    fn test_non_uniform_constant_rate() {
        let result = integrate_from_top(&[0.0, 1.0, 2.0, 5.0, 10.0], &[10.0; 5]).unwrap();
        assert_eq!(result, vec![100.0, 90.0, 80.0, 50.0, 0.0]);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(integrate_from_top(&[], &[]).unwrap(), Vec::<f64>::new());
        assert_eq!(integrate_from_top(&[120.0], &[3.5]).unwrap(), vec![0.0]);
        assert_eq!(integrate_from_top(&[120.0], &[f64::NAN]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = integrate_from_top(&[0.0, 1.0, 2.0], &[1.0, 1.0]);
        assert!(matches!(
            result,
            Err(IntegrationError::ShapeMismatch { altitude: 3, rate: 2 })
        ));

        let grid = AltitudeGrid::new(vec![0.0, 1.0]).unwrap();
        assert!(integrate_grid_from_top(&grid, &[1.0]).is_err());
    }

    #[test]
    fn test_non_monotonic_rejected() {
        let result = integrate_from_top(&[0.0, 20.0, 10.0, 30.0], &[1.0; 4]);
        assert!(matches!(result, Err(IntegrationError::NonMonotonic { index: 2 })));
    }

    #[test]
    fn test_negative_rates_not_clamped() {
        let result = integrate_from_top(&[0.0, 10.0, 20.0], &[-1.0, -1.0, -1.0]).unwrap();
        assert_eq!(result, vec![-20.0, -10.0, 0.0]);
    }

    #[test]
    fn test_nan_spreads_away_from_top_only() {
        // top is index 4 (500 km)
        let z = [100.0, 200.0, 300.0, 400.0, 500.0];
        let q = [1e10, 1e9, f64::NAN, 1e8, 1e7];
        let result = integrate_from_top(&z, &q).unwrap();

        assert_eq!(result[4], 0.0);
        assert!(result[3].is_finite());
        assert!(result[2].is_nan());
        assert!(result[1].is_nan());
        assert!(result[0].is_nan());
    }

    #[test]
    fn test_nan_spreads_away_from_top_on_decreasing_grid() {
        // top is index 0 (500 km)
        let z = [500.0, 400.0, 300.0, 200.0, 150.0, 100.0];
        for k in 0..z.len() {
            let mut q = vec![1.0; z.len()];
            q[k] = f64::NAN;
            let result = integrate_from_top(&z, &q).unwrap();

            assert_eq!(result[0], 0.0, "k={k}");
            for (i, value) in result.iter().enumerate().skip(1) {
                // the path 0..=i touches k unless k lies below i
                if k <= i {
                    assert!(value.is_nan(), "k={k}: index {i} should be NaN, got {value}");
                } else {
                    assert!(value.is_finite(), "k={k}: index {i} should be finite, got {value}");
                }
            }
        }
    }

    #[test]
    fn test_nan_at_top_poisons_everything_below() {
        let result = integrate_from_top(&[300.0, 200.0, 100.0], &[f64::NAN, 1.0, 1.0]).unwrap();
        assert_eq!(result[0], 0.0);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
    }

    #[test]
    fn test_column_total() {
        assert_eq!(column_total(&[0.0, 1.0, 2.0, 5.0, 10.0], &[10.0; 5]).unwrap(), 100.0);
        assert_eq!(column_total(&[30.0, 20.0, 10.0, 0.0], &[1.0; 4]).unwrap(), 30.0);
        assert_eq!(column_total(&[5.0], &[1.0]).unwrap(), 0.0);
        assert_eq!(column_total(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_channels_match_individual_calls() {
        let grid = AltitudeGrid::uniform(500.0, 80.0, 43).unwrap();
        let channels: Vec<Vec<f64>> = (1..=6)
            .map(|k| grid.values().iter().map(|z| k as f64 * (-z / 60.0).exp()).collect())
            .collect();

        let parallel = integrate_channels_from_top(&grid, &channels).unwrap();
        assert_eq!(parallel.len(), channels.len());
        for (rate, result) in channels.iter().zip(&parallel) {
            assert_eq!(result, &integrate_from_top(grid.values(), rate).unwrap());
        }
    }

    #[test]
    fn test_channel_shape_error_names_channel() {
        let grid = AltitudeGrid::uniform(0.0, 10.0, 3).unwrap();
        let channels = vec![vec![1.0; 3], vec![1.0; 2]];
        let result = integrate_channels_from_top(&grid, &channels);
        assert!(matches!(
            result,
            Err(IntegrationError::ChannelShape { channel: 1, expected: 3, found: 2 })
        ));
    }
}
