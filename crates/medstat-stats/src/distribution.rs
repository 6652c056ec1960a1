//! Tail probabilities and quantiles used by the tests and confidence intervals.

use std::f64::consts::SQRT_2;

use statrs::function::{
    erf::{erf_inv, erfc},
    gamma::gamma_ur,
};

/// Upper tail `P(Z > z)` of the standard normal distribution.
#[must_use]
pub fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Two-sided p-value `P(|Z| > |z|)` for a standard normal statistic.
#[must_use]
pub fn normal_two_sided_p(z: f64) -> f64 {
    erfc(z.abs() / SQRT_2)
}

/// Quantile function of the standard normal distribution.
///
/// Returns infinities at the boundaries `p <= 0` and `p >= 1`.
#[must_use]
pub fn normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    SQRT_2 * erf_inv(2.0 * p - 1.0)
}

/// Upper tail `P(X > x)` of the chi-squared distribution with `df` degrees of freedom.
///
/// Non-positive statistics give 1.0, infinite ones give 0.0.
#[must_use]
pub fn chi_squared_sf(x: f64, df: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    if x.is_infinite() {
        return 0.0;
    }
    gamma_ur(df / 2.0, x / 2.0)
}
