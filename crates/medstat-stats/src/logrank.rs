//! Log-rank (Mantel-Cox) test between two groups of right-censored data.
//!
//! At every distinct event time the observed events of group A are compared
//! with the events expected if both groups shared one hazard. The summed
//! difference, scaled by its hypergeometric variance, follows a chi-squared
//! distribution with one degree of freedom under the null hypothesis.

use crate::{
    distribution::chi_squared_sf,
    survival::{SurvivalDataError, validate_right_censored},
};

/// Result of the two-group log-rank test.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LogRankResult {
    /// Chi-squared test statistic.
    pub chi_squared: f64,
    /// Degrees of freedom (always 1 for two groups).
    pub df: usize,
    /// Two-sided p-value, in `(0, 1]`.
    pub p_value: f64,
    /// Observed events in group A.
    pub observed_a: f64,
    /// Expected events in group A under the null hypothesis.
    pub expected_a: f64,
    /// Observed events in group B.
    pub observed_b: f64,
    /// Expected events in group B under the null hypothesis.
    pub expected_b: f64,
    /// Variance of `observed_a - expected_a`.
    pub variance: f64,
}

/// Performs the log-rank test comparing two groups.
///
/// Deterministic for identical input. Either group being empty is an error,
/// since the test is undefined then.
///
/// # Examples
///
/// ```
/// # use medstat_stats::logrank::log_rank_test;
/// let times = [1.0, 2.0, 3.0, 4.0];
/// let events = [true, false, true, true];
/// // Same data in both groups: no evidence of a difference
/// let result = log_rank_test(&times, &events, &times, &events).unwrap();
/// assert!((result.p_value - 1.0).abs() < 1e-12);
/// ```
pub fn log_rank_test(
    times_a: &[f64],
    events_a: &[bool],
    times_b: &[f64],
    events_b: &[bool],
) -> Result<LogRankResult, SurvivalDataError> {
    validate_right_censored(times_a, events_a)?;
    validate_right_censored(times_b, events_b)?;

    // (time, event, is_group_a)
    let mut data = times_a
        .iter()
        .zip(events_a)
        .map(|(&t, &e)| (t, e, true))
        .chain(times_b.iter().zip(events_b).map(|(&t, &e)| (t, e, false)))
        .collect::<Vec<_>>();
    data.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut at_risk_a = times_a.len();
    let mut at_risk_b = times_b.len();
    let mut observed_a = 0.0;
    let mut expected_a = 0.0;
    let mut observed_b = 0.0;
    let mut expected_b = 0.0;
    let mut variance = 0.0;

    let mut i = 0;
    while i < data.len() {
        let current_time = data[i].0;
        let mut d_a = 0_usize;
        let mut d_b = 0_usize;
        let mut leaving_a = 0_usize;
        let mut leaving_b = 0_usize;
        while i < data.len() && data[i].0 == current_time {
            let (_, event, in_a) = data[i];
            match (in_a, event) {
                (true, true) => d_a += 1,
                (false, true) => d_b += 1,
                _ => {}
            }
            if in_a {
                leaving_a += 1;
            } else {
                leaving_b += 1;
            }
            i += 1;
        }

        let d = d_a + d_b;
        if d > 0 {
            let (contrib_exp_a, contrib_exp_b, contrib_var) =
                risk_set_contribution(at_risk_a, at_risk_b, d);
            observed_a += count(d_a);
            observed_b += count(d_b);
            expected_a += contrib_exp_a;
            expected_b += contrib_exp_b;
            variance += contrib_var;
        }

        at_risk_a -= leaving_a;
        at_risk_b -= leaving_b;
    }

    let chi_squared = if variance > 0.0 {
        (observed_a - expected_a).powi(2) / variance
    } else {
        0.0
    };
    let p_value = chi_squared_sf(chi_squared, 1.0).clamp(f64::MIN_POSITIVE, 1.0);

    Ok(LogRankResult {
        chi_squared,
        df: 1,
        p_value,
        observed_a,
        expected_a,
        observed_b,
        expected_b,
        variance,
    })
}

#[expect(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

/// Expected events per group and hypergeometric variance at one event time.
fn risk_set_contribution(at_risk_a: usize, at_risk_b: usize, events: usize) -> (f64, f64, f64) {
    let n_a = count(at_risk_a);
    let n_b = count(at_risk_b);
    let n = n_a + n_b;
    let d = count(events);
    let var = if n > 1.0 {
        n_a * n_b * d * (n - d) / (n * n * (n - 1.0))
    } else {
        0.0
    };
    (d * n_a / n, d * n_b / n, var)
}
