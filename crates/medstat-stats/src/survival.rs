use crate::distribution::normal_quantile;

/// Confidence level of the pointwise intervals stored in a [`KaplanMeierCurve`].
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Invalid right-censored input.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SurvivalDataError {
    #[display("survival data is empty")]
    Empty,
    #[display("times and events have different lengths ({times} != {events})")]
    LengthMismatch { times: usize, events: usize },
    #[display("time at index {index} must be finite and non-negative, got {value}")]
    InvalidTime { index: usize, value: f64 },
}

pub(crate) fn validate_right_censored(
    times: &[f64],
    events: &[bool],
) -> Result<(), SurvivalDataError> {
    if times.len() != events.len() {
        return Err(SurvivalDataError::LengthMismatch {
            times: times.len(),
            events: events.len(),
        });
    }
    if times.is_empty() {
        return Err(SurvivalDataError::Empty);
    }
    if let Some((index, &value)) = times
        .iter()
        .enumerate()
        .find(|(_, t)| !t.is_finite() || **t < 0.0)
    {
        return Err(SurvivalDataError::InvalidTime { index, value });
    }
    Ok(())
}

/// Kaplan-Meier survival curve for survival analysis.
///
/// The Kaplan-Meier (product-limit) estimator is a non-parametric statistic used to
/// estimate the survival function from lifetime data. It accounts for censored data
/// (observations where the event of interest has not occurred by the end of the
/// study period).
///
/// # Fields
///
/// The curve stores parallel vectors with one entry per distinct observed time
/// (events and censorings), sorted ascending:
/// - Observation time
/// - Survival probability just after that time
/// - Number of subjects at risk just before that time
/// - Number of events and censorings at that time
/// - Greenwood variance and a pointwise confidence interval
#[derive(Debug, Clone, serde::Serialize)]
pub struct KaplanMeierCurve {
    /// Distinct observed times.
    pub times: Vec<f64>,
    /// Survival probability just after each corresponding time.
    /// Values range from 0.0 (no survival) to 1.0 (complete survival).
    pub survival_prob: Vec<f64>,
    /// Number of subjects still at risk just before each time point.
    pub at_risk: Vec<usize>,
    /// Number of events (non-censored observations) at each time point.
    pub events: Vec<usize>,
    /// Number of censored observations at each time point.
    pub censored: Vec<usize>,
    /// Greenwood variance of the survival estimate.
    pub variance: Vec<f64>,
    /// Lower bound of the log(-log) pointwise confidence interval.
    pub ci_lower: Vec<f64>,
    /// Upper bound of the log(-log) pointwise confidence interval.
    pub ci_upper: Vec<f64>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve from right-censored data.
    ///
    /// # Arguments
    ///
    /// * `times` - Time to event or censoring for each subject (finite, `>= 0`)
    /// * `events` - `true` if the event was observed, `false` if censored
    ///
    /// # Examples
    ///
    /// ```
    /// # use medstat_stats::survival::KaplanMeierCurve;
    /// let times = [10.0, 20.0, 30.0];
    /// let events = [true, false, true];
    /// let curve = KaplanMeierCurve::estimate(&times, &events).unwrap();
    /// assert_eq!(curve.times, vec![10.0, 20.0, 30.0]);
    /// assert_eq!(curve.survival_prob.last(), Some(&0.0));
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn estimate(times: &[f64], events: &[bool]) -> Result<Self, SurvivalDataError> {
        validate_right_censored(times, events)?;

        let mut data = times
            .iter()
            .copied()
            .zip(events.iter().copied())
            .collect::<Vec<_>>();
        data.sort_by(|a, b| a.0.total_cmp(&b.0));

        let z = normal_quantile(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0);

        let mut curve = Self {
            times: vec![],
            survival_prob: vec![],
            at_risk: vec![],
            events: vec![],
            censored: vec![],
            variance: vec![],
            ci_lower: vec![],
            ci_upper: vec![],
        };

        let mut current_survival = 1.0;
        let mut greenwood_sum = 0.0;
        let total = data.len();

        let mut i = 0;
        while i < data.len() {
            let current_time = data[i].0;
            let at_risk = total - i;

            let mut event_count = 0;
            let mut censored_count = 0;
            let mut j = i;
            while j < data.len() && data[j].0 == current_time {
                if data[j].1 {
                    event_count += 1;
                } else {
                    censored_count += 1;
                }
                j += 1;
            }

            if event_count > 0 {
                let n = at_risk as f64;
                let d = event_count as f64;
                current_survival *= 1.0 - d / n;
                if at_risk > event_count {
                    greenwood_sum += d / (n * (n - d));
                }
            }

            let (lower, upper) = log_log_interval(current_survival, greenwood_sum, z);
            curve.times.push(current_time);
            curve.survival_prob.push(current_survival);
            curve.at_risk.push(at_risk);
            curve.events.push(event_count);
            curve.censored.push(censored_count);
            curve
                .variance
                .push(current_survival * current_survival * greenwood_sum);
            curve.ci_lower.push(lower);
            curve.ci_upper.push(upper);

            i = j;
        }

        Ok(curve)
    }

    /// Total number of observations the curve was estimated from.
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.at_risk.first().copied().unwrap_or(0)
    }

    /// Total number of observed events.
    #[must_use]
    pub fn n_events(&self) -> usize {
        self.events.iter().sum()
    }

    /// Last observed time (event or censoring).
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Returns the median survival time.
    ///
    /// The median survival time is the smallest time at which the survival
    /// probability drops to or below 50%. If the survival probability never
    /// reaches 50%, this method returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use medstat_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::estimate(&[10.0, 20.0, 30.0], &[true; 3]).unwrap();
    /// assert_eq!(curve.median_survival(), Some(20.0));
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        self.survival_prob
            .iter()
            .position(|&s| s <= 0.5)
            .map(|i| self.times[i])
    }

    /// Returns the survival probability at a specific time.
    ///
    /// The survival probability remains constant between event times and
    /// decreases only when an event occurs. Returns `1.0` before the first
    /// event and the last estimate after the last observed time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use medstat_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::estimate(&[10.0, 20.0], &[true, true]).unwrap();
    ///
    /// assert_eq!(curve.survival_at(5.0), 1.0);  // Before first event
    /// assert!(curve.survival_at(15.0) < 1.0);   // After first event
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        let idx = self.times.partition_point(|&t| t <= time);
        if idx == 0 {
            1.0
        } else {
            self.survival_prob[idx - 1]
        }
    }

    /// Vertices of the drawable step function, from `(0, 1)` to the last observed time.
    ///
    /// Each drop contributes two vertices at the same time (before and after),
    /// so the path can be drawn with straight line segments.
    #[must_use]
    pub fn step_points(&self) -> Vec<(f64, f64)> {
        let mut points = vec![(0.0, 1.0)];
        let mut previous = 1.0;
        for (&t, &s) in self.times.iter().zip(&self.survival_prob) {
            if s < previous {
                points.push((t, previous));
                points.push((t, s));
                previous = s;
            }
        }
        let end = self.max_time();
        if points.last().is_none_or(|&(t, _)| t < end) {
            points.push((end, previous));
        }
        points
    }

    /// Step path of the confidence band as `(time, lower, upper)` vertices.
    #[must_use]
    pub fn confidence_band_steps(&self) -> Vec<(f64, f64, f64)> {
        let mut points = vec![(0.0, 1.0, 1.0)];
        let mut previous = (1.0, 1.0);
        for ((&t, &lo), &hi) in self.times.iter().zip(&self.ci_lower).zip(&self.ci_upper) {
            if (lo, hi) != previous {
                points.push((t, previous.0, previous.1));
                points.push((t, lo, hi));
                previous = (lo, hi);
            }
        }
        let end = self.max_time();
        if points.last().is_none_or(|&(t, _, _)| t < end) {
            points.push((end, previous.0, previous.1));
        }
        points
    }
}

fn log_log_interval(survival: f64, greenwood_sum: f64, z: f64) -> (f64, f64) {
    if survival <= 0.0 {
        return (0.0, 0.0);
    }
    if survival >= 1.0 {
        return (1.0, 1.0);
    }
    let log_h = (-survival.ln()).ln();
    let se = greenwood_sum.sqrt() / survival.ln().abs();
    let lower = (-(log_h + z * se).exp()).exp();
    let upper = (-(log_h - z * se).exp()).exp();
    (lower.clamp(0.0, 1.0), upper.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_product_limit_with_censoring() {
        // t=1 event (5 at risk), t=2 censored, t=3 event (3 at risk), t=4,5 events
        let times = [3.0, 1.0, 2.0, 5.0, 4.0];
        let events = [true, true, false, true, true];
        let curve = KaplanMeierCurve::estimate(&times, &events).unwrap();

        assert_eq!(curve.times, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(curve.at_risk, vec![5, 4, 3, 2, 1]);
        assert_eq!(curve.censored, vec![0, 1, 0, 0, 0]);
        assert_close(curve.survival_prob[0], 0.8);
        assert_close(curve.survival_prob[1], 0.8);
        assert_close(curve.survival_prob[2], 0.8 * 2.0 / 3.0);
        assert_close(curve.survival_prob[4], 0.0);
    }

    #[test]
    fn test_tied_event_times() {
        let curve = KaplanMeierCurve::estimate(&[2.0, 2.0, 2.0, 5.0], &[true, true, false, true])
            .unwrap();
        assert_eq!(curve.events[0], 2);
        assert_eq!(curve.censored[0], 1);
        assert_close(curve.survival_prob[0], 0.5);
    }

    #[test]
    fn test_no_events_stays_at_one() {
        let curve = KaplanMeierCurve::estimate(&[1.0, 4.0, 9.0], &[false; 3]).unwrap();
        assert!(curve.survival_prob.iter().all(|&s| s == 1.0));
        assert_eq!(curve.survival_at(100.0), 1.0);
        assert_eq!(curve.median_survival(), None);
        assert_eq!(curve.step_points(), vec![(0.0, 1.0), (9.0, 1.0)]);
    }

    #[test]
    fn test_single_observation() {
        let curve = KaplanMeierCurve::estimate(&[3.0], &[true]).unwrap();
        assert_eq!(curve.survival_prob, vec![0.0]);
        assert_eq!(curve.n_observations(), 1);
        assert_eq!(curve.n_events(), 1);
    }

    #[test]
    fn test_monotone_and_bounded() {
        let times = [5.0, 1.0, 8.0, 3.0, 3.0, 12.0, 7.0, 2.0, 9.0, 4.0];
        let events = [
            true, false, true, true, false, false, true, true, false, true,
        ];
        let curve = KaplanMeierCurve::estimate(&times, &events).unwrap();
        let points = curve.step_points();
        assert_eq!(points[0], (0.0, 1.0));
        for pair in points.windows(2) {
            assert!(pair[1].0 >= pair[0].0);
            assert!(pair[1].1 <= pair[0].1);
        }
        assert!(points.iter().all(|&(_, s)| (0.0..=1.0).contains(&s)));
        for ((&s, &lo), &hi) in curve
            .survival_prob
            .iter()
            .zip(&curve.ci_lower)
            .zip(&curve.ci_upper)
        {
            assert!(lo <= s + 1e-12 && s <= hi + 1e-12);
        }
    }

    #[test]
    fn test_step_points_end_at_last_censoring() {
        let curve = KaplanMeierCurve::estimate(&[1.0, 6.0], &[true, false]).unwrap();
        assert_eq!(
            curve.step_points(),
            vec![(0.0, 1.0), (1.0, 1.0), (1.0, 0.5), (6.0, 0.5)]
        );
    }

    #[test]
    fn test_greenwood_variance() {
        // S(1) = 0.75 with n=4, d=1: var = 0.75^2 * 1/(4*3)
        let curve = KaplanMeierCurve::estimate(&[1.0, 2.0, 3.0, 4.0], &[true, false, false, false])
            .unwrap();
        assert_close(curve.variance[0], 0.75 * 0.75 / 12.0);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            KaplanMeierCurve::estimate(&[], &[]).unwrap_err(),
            SurvivalDataError::Empty
        );
        assert_eq!(
            KaplanMeierCurve::estimate(&[1.0], &[true, false]).unwrap_err(),
            SurvivalDataError::LengthMismatch {
                times: 1,
                events: 2
            }
        );
        assert!(matches!(
            KaplanMeierCurve::estimate(&[1.0, -2.0], &[true, true]).unwrap_err(),
            SurvivalDataError::InvalidTime { index: 1, .. }
        ));
    }
}
