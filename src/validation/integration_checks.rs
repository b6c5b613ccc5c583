//! Built-in battery of checks on the top-down integrator.

use super::{CheckOutcome, FnCheck, ValidationCheck, ValidationSuite};
use crate::altitude_grid::AltitudeGrid;
use crate::convergence::{ConvergenceStudy, exponential_from_top, exponential_profile};
use crate::cumulative_integration::{integrate_from_top, integrate_grid_from_top};
use crate::error::IntegrationError;
use crate::math_utils::max_relative_error;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationCheckParams {
    /// Amplitude of the exponential test profile
    pub amplitude: f64,
    /// Scale height of the exponential test profile, km
    pub scale_height_km: f64,
    /// Seed for the random non-uniform grids
    pub seed: u64,
    /// Relative tolerance standing in for "machine precision"
    pub exact_tolerance: f64,
}

impl Default for IntegrationCheckParams {
    fn default() -> Self {
        Self {
            amplitude: 1.0e10,
            scale_height_km: 50.0,
            seed: 2010,
            exact_tolerance: 1.0e-10,
        }
    }
}

fn failed_with(err: IntegrationError) -> CheckOutcome {
    CheckOutcome::fail(format!("unexpected error: {err}"))
}

fn scenario(altitude: &'static [f64], rate: &'static [f64], expected: &'static [f64]) -> CheckOutcome {
    match integrate_from_top(altitude, rate) {
        Ok(result) => CheckOutcome::check(result == expected, format!("{result:?} (expected {expected:?})")),
        Err(err) => failed_with(err),
    }
}

pub fn integration_checks(params: IntegrationCheckParams) -> Vec<Box<dyn ValidationCheck>> {
    let IntegrationCheckParams { amplitude, scale_height_km, seed, exact_tolerance } = params;

    vec![
        FnCheck::boxed("Zero at top (both storage orders)", || {
            let up = integrate_from_top(&[80.0, 200.0, 350.0, 500.0], &[4.0, 3.0, 2.0, 1.0]);
            let down = integrate_from_top(&[500.0, 350.0, 200.0, 80.0], &[1.0, 2.0, 3.0, 4.0]);
            match (up, down) {
                (Ok(up), Ok(down)) => CheckOutcome::check(
                    up[3] == 0.0 && down[0] == 0.0,
                    format!("top values {} and {}", up[3], down[0]),
                ),
                (Err(err), _) | (_, Err(err)) => failed_with(err),
            }
        }),
        FnCheck::boxed("Scenario: uniform increasing grid", || {
            scenario(&[0.0, 10.0, 20.0, 30.0], &[1.0, 1.0, 1.0, 1.0], &[30.0, 20.0, 10.0, 0.0])
        }),
        FnCheck::boxed("Scenario: non-uniform constant rate", || {
            scenario(&[0.0, 1.0, 2.0, 5.0, 10.0], &[10.0; 5], &[100.0, 90.0, 80.0, 50.0, 0.0])
        }),
        FnCheck::boxed("Scenario: decreasing grid full column", || {
            let z = [300.0, 250.0, 200.0, 150.0, 100.0];
            let q = [0.1, 0.5, 1.5, 3.0, 5.0];
            let total: f64 = z
                .windows(2)
                .zip(q.windows(2))
                .map(|(zw, qw)| 0.5 * (qw[0] + qw[1]) * (zw[0] - zw[1]))
                .sum();
            match integrate_from_top(&z, &q) {
                Ok(result) => CheckOutcome::check(
                    result[0] == 0.0 && (result[4] - total).abs() <= 1e-12 * total,
                    format!("bottom {} vs trapezoid sum {total}", result[4]),
                ),
                Err(err) => failed_with(err),
            }
        }),
        FnCheck::boxed("Constant profile exact on non-uniform grid", move || {
            let Ok(grid) = AltitudeGrid::stretched(0.0, 0.5, 2.0, 1000.0) else {
                return CheckOutcome::fail("could not build stretched grid");
            };
            let rate = vec![7.5; grid.len()];
            let top = grid.top().unwrap_or(0.0);
            let expected: Vec<f64> = grid.values().iter().map(|z| 7.5 * (top - z)).collect();
            match integrate_grid_from_top(&grid, &rate) {
                Ok(result) => {
                    let err = max_relative_error(&result, &expected);
                    CheckOutcome::check(err <= exact_tolerance, format!("max relative error {err:.2e}"))
                }
                Err(err) => failed_with(err),
            }
        }),
        FnCheck::boxed("Linear profile exact on random non-uniform grid", move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let Ok(grid) = AltitudeGrid::jittered(80.0, 500.0, 57, 0.4, &mut rng) else {
                return CheckOutcome::fail("could not build jittered grid");
            };
            let (m, b) = (-0.02, 12.0);
            let top = grid.top().unwrap_or(0.0);
            let rate: Vec<f64> = grid.values().iter().map(|z| m * z + b).collect();
            let expected: Vec<f64> = grid
                .values()
                .iter()
                .map(|z| 0.5 * m * (top * top - z * z) + b * (top - z))
                .collect();
            match integrate_grid_from_top(&grid, &rate) {
                Ok(result) => {
                    let err = max_relative_error(&result, &expected);
                    CheckOutcome::check(err <= exact_tolerance, format!("max relative error {err:.2e}"))
                }
                Err(err) => failed_with(err),
            }
        }),
        FnCheck::boxed("Exponential profile within 1% on fine grid", move || {
            let Ok(grid) = AltitudeGrid::uniform(500.0, 80.0, 421) else {
                return CheckOutcome::fail("could not build uniform grid");
            };
            let rate = exponential_profile(grid.values(), amplitude, scale_height_km);
            let analytic = exponential_from_top(&grid, amplitude, scale_height_km);
            match integrate_grid_from_top(&grid, &rate) {
                Ok(result) => {
                    let err = max_relative_error(&result, &analytic);
                    CheckOutcome::check(err < 0.01, format!("max relative error {:.4}%", err * 100.0))
                }
                Err(err) => failed_with(err),
            }
        }),
        FnCheck::boxed("Second-order convergence (3 halvings)", move || {
            match ConvergenceStudy::run(80.0, 500.0, 20.0, 3, amplitude, scale_height_km) {
                Ok(study) => {
                    let ratios = study.error_ratios();
                    CheckOutcome::check(
                        ratios.len() == 3 && ratios.iter().all(|r| (3.8..4.2).contains(r)),
                        format!("error ratios {ratios:.3?}"),
                    )
                }
                Err(err) => failed_with(err),
            }
        }),
        FnCheck::boxed("Storage order independence", move || {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
            let Ok(grid) = AltitudeGrid::jittered(80.0, 500.0, 40, 0.3, &mut rng) else {
                return CheckOutcome::fail("could not build jittered grid");
            };
            let z_up = grid.values().to_vec();
            let q_up = exponential_profile(&z_up, amplitude, scale_height_km);
            let z_down: Vec<f64> = z_up.iter().rev().copied().collect();
            let q_down: Vec<f64> = q_up.iter().rev().copied().collect();
            match (integrate_from_top(&z_up, &q_up), integrate_from_top(&z_down, &q_down)) {
                (Ok(up), Ok(mut down)) => {
                    down.reverse();
                    CheckOutcome::check(up == down, "reversed storage reproduces every value")
                }
                (Err(err), _) | (_, Err(err)) => failed_with(err),
            }
        }),
        FnCheck::boxed("NaN propagates away from top only", || {
            let z = [100.0, 200.0, 300.0, 400.0, 500.0];
            let q = [1e10, 1e9, f64::NAN, 1e8, 1e7];
            match integrate_from_top(&z, &q) {
                Ok(r) => CheckOutcome::check(
                    r[4] == 0.0 && r[3].is_finite() && r[..3].iter().all(|v| v.is_nan()),
                    format!("{r:?}"),
                ),
                Err(err) => failed_with(err),
            }
        }),
        FnCheck::boxed("Repeated calls are bit-identical", move || {
            let Ok(grid) = AltitudeGrid::stretched(80.0, 0.25, 1.3, 500.0) else {
                return CheckOutcome::fail("could not build stretched grid");
            };
            let rate = exponential_profile(grid.values(), amplitude, scale_height_km);
            match (integrate_grid_from_top(&grid, &rate), integrate_grid_from_top(&grid, &rate)) {
                (Ok(a), Ok(b)) => {
                    let identical = a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits());
                    CheckOutcome::check(identical, format!("{} samples compared", a.len()))
                }
                (Err(err), _) | (_, Err(err)) => failed_with(err),
            }
        }),
        FnCheck::boxed("Shape mismatch rejected", || match integrate_from_top(&[0.0, 1.0, 2.0], &[1.0]) {
            Err(IntegrationError::ShapeMismatch { altitude: 3, rate: 1 }) => {
                CheckOutcome::pass("ShapeMismatch { altitude: 3, rate: 1 }")
            }
            other => CheckOutcome::fail(format!("got {other:?}")),
        }),
    ]
}

/// Run every integration check and return the filled suite.
pub fn run_integration_checks(params: IntegrationCheckParams, verbose: bool) -> ValidationSuite {
    let mut suite = ValidationSuite::new("TOP-DOWN INTEGRATION VALIDATION").verbose(verbose);
    suite.run_all(&integration_checks(params));
    suite
}
