//! Floating point comparison helpers, thin wrappers around the `approx` crate. Used to check
//! population conservation and by the `assert_almost_eq!` macro.

use approx::AbsDiffEq;

/// Relative tolerance used when checking that compartments sum to the population.
pub const CONSERVATION_TOLERANCE: f64 = 1e-6;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Compares if two floats are close via `approx::relative_eq!` with the given maximum relative
/// difference.
#[must_use]
pub fn relative_almost_eq(a: f64, b: f64, max_relative: f64) -> bool {
    approx::relative_eq!(a, b, max_relative = max_relative)
}

/// Returns true if `total` matches `population` within [`CONSERVATION_TOLERANCE`].
#[must_use]
pub fn is_conserved(total: f64, population: f64) -> bool {
    relative_almost_eq(total, population, CONSERVATION_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    #[test]
    fn almost_eq_within_tolerance() {
        assert!(almost_eq(1.0, 1.0 + 0.5e-11, 1e-10));
    }

    #[test]
    fn almost_eq_outside_tolerance() {
        assert!(!almost_eq(1.0, 1.0 + 2e-10, 1e-10));
    }

    #[test]
    fn almost_eq_infinities() {
        assert!(almost_eq(f64::INFINITY, f64::INFINITY, 1e-10));
        assert!(!almost_eq(f64::INFINITY, f64::NEG_INFINITY, 1e-10));
    }

    #[test]
    fn conservation_is_relative() {
        // 5000 * 1e-6 = 5e-3 of slack
        assert!(is_conserved(5000.004, 5000.0));
        assert!(!is_conserved(5000.01, 5000.0));
        assert!(is_conserved(20.0, 20.0));
    }

    #[test]
    fn assert_almost_eq_macro_passes() {
        assert_almost_eq!(3.68, 3.84 - 0.16, 1e-12);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn assert_almost_eq_macro_panics() {
        assert_almost_eq!(1.0, 1.001, 1e-4);
    }
}
