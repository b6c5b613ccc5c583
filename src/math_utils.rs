//! Numeric helpers shared by the integrator, the convergence study and the
//! validation checks.

/// Assert that the percentage deviation between two values is below a threshold
///
/// Wraps [`deviation`] so tests can state tolerances as percentages
/// ("within 1%").
#[macro_export]
macro_rules! assert_deviation {
    ($actual:expr, $expected:expr, $max_deviation:expr) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::deviation(actual_val, expected_val);

            if !(actual_deviation < max_dev) {
                panic!(
                    "assertion failed: deviation {:.4}% >= {:.4}%\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, actual_val, expected_val
                );
            }
        }
    };
    ($actual:expr, $expected:expr, $max_deviation:expr, $($arg:tt)+) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::deviation(actual_val, expected_val);

            if !(actual_deviation < max_dev) {
                panic!(
                    "assertion failed: deviation {:.4}% >= {:.4}%: {}\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, format_args!($($arg)+), actual_val, expected_val
                );
            }
        }
    };
}

/// Evenly spaced samples from `start` to `end` inclusive.
///
/// # Examples
/// ```
/// use precip_ionization_rust::math_utils::linspace;
///
/// assert_eq!(linspace(0.0, 30.0, 4), vec![0.0, 10.0, 20.0, 30.0]);
/// assert_eq!(linspace(500.0, 80.0, 2), vec![500.0, 80.0]);
/// ```
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Elementwise `max(value, 0)`. NaN stays NaN.
///
/// The integrator never clamps; callers that want physically
/// non-negative input apply this first.
pub fn clamp_non_negative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v < 0.0 { 0.0 } else { v })
        .collect()
}

/// |actual - expected| / |expected|, or `None` when `expected` is exactly zero.
pub fn relative_error(actual: f64, expected: f64) -> Option<f64> {
    if expected == 0.0 {
        None
    } else {
        Some((actual - expected).abs() / expected.abs())
    }
}

/// Largest relative error over paired samples, skipping exact-zero references.
///
/// Returns NaN if any compared sample is NaN, and 0 when nothing is comparable.
pub fn max_relative_error(actual: &[f64], expected: &[f64]) -> f64 {
    actual
        .iter()
        .zip(expected)
        .filter_map(|(&a, &e)| relative_error(a, e))
        .fold(0.0, |worst, err| if err.is_nan() || worst.is_nan() { f64::NAN } else { worst.max(err) })
}

/// Calculate the percentage deviation between two values
///
/// Uses the expected value as the base. Zero expected with zero actual is
/// 0%; zero expected with anything else is infinite.
///
/// # Examples
/// ```
/// use precip_ionization_rust::math_utils::deviation;
///
/// assert_eq!(deviation(105.0, 100.0), 5.0);
/// assert_eq!(deviation(95.0, 100.0), 5.0);
/// ```
pub fn deviation(actual: f64, expected: f64) -> f64 {
    if expected.abs() < f64::EPSILON {
        if actual.abs() < f64::EPSILON {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        ((actual - expected).abs() / expected.abs()) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 10.0, 0), Vec::<f64>::new());
        assert_eq!(linspace(3.0, 10.0, 1), vec![3.0]);
        assert_eq!(linspace(100.0, 300.0, 5), vec![100.0, 150.0, 200.0, 250.0, 300.0]);

        let descending = linspace(500.0, 80.0, 100);
        assert_eq!(descending.len(), 100);
        assert_eq!(descending[0], 500.0);
        assert_eq!(descending[99], 80.0);
    }

    #[test]
    fn test_clamp_non_negative() {
        let clamped = clamp_non_negative(&[-1e10, -5e9, -1e-15, 0.0, 1e-15, 1e10]);
        assert_eq!(clamped, vec![0.0, 0.0, 0.0, 0.0, 1e-15, 1e10]);

        let eps = f64::EPSILON;
        assert_eq!(clamp_non_negative(&[-eps, -2.0 * eps, eps]), vec![0.0, 0.0, eps]);

        let with_nan = clamp_non_negative(&[f64::NAN, -1.0]);
        assert!(with_nan[0].is_nan());
        assert_eq!(with_nan[1], 0.0);
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(105.0, 100.0), Some(0.05));
        assert_eq!(relative_error(1.0, 0.0), None);
        assert_eq!(relative_error(-2.0, -2.0), Some(0.0));
    }

    #[test]
    fn test_max_relative_error_skips_zero_reference() {
        let worst = max_relative_error(&[30.0, 21.0, 10.0, 0.0], &[30.0, 20.0, 10.0, 0.0]);
        assert!((worst - 0.05).abs() < 1e-12);
        assert_eq!(max_relative_error(&[0.0], &[0.0]), 0.0);
        assert!(max_relative_error(&[f64::NAN, 1.0], &[1.0, 1.0]).is_nan());
    }

    #[test]
    fn test_deviation() {
        assert_eq!(deviation(100.0, 100.0), 0.0);
        assert!((deviation(1530.0, 1500.0) - 2.0).abs() < 0.001);
        assert_eq!(deviation(0.0, 0.0), 0.0);
        assert_eq!(deviation(10.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_assert_deviation_macro() {
        assert_deviation!(105.0, 100.0, 10.0);
        assert_deviation!(2.0 * 52.5, 100.0, 10.0);
        assert_deviation!(0.0351, 0.035, 1.0, "ionization energy should be within 1%");
    }

    #[test]
    #[should_panic(expected = "assertion failed: deviation")]
    fn test_assert_deviation_macro_fails() {
        assert_deviation!(120.0, 100.0, 10.0);
    }

    #[test]
    #[should_panic(expected = "assertion failed: deviation")]
    fn test_assert_deviation_macro_fails_on_nan() {
        assert_deviation!(f64::NAN, 100.0, 10.0);
    }
}
