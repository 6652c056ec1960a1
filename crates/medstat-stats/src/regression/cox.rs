//! Cox proportional hazards regression.
//!
//! The partial likelihood uses Efron's approximation for tied event times,
//! and covariates are centered before fitting (this leaves the coefficients
//! unchanged but keeps `exp(x * beta)` in range).

use std::fmt;

use nalgebra::{DMatrix, DVector};

use super::{
    Coefficient, RegressionError, max_abs, newton_step, standard_errors, validate_design,
    validate_names,
};
use crate::{distribution::chi_squared_sf, survival::validate_right_censored};

const MAX_ITERATIONS: usize = 50;
const MAX_STEP_HALVINGS: usize = 30;
const TOLERANCE: f64 = 1e-9;

/// Fitted Cox model coefficient with its hazard ratio.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CoxCoefficient {
    #[serde(flatten)]
    pub coefficient: Coefficient,
    /// Hazard ratio `exp(coef)`.
    pub hazard_ratio: f64,
    pub hazard_ratio_lower: f64,
    pub hazard_ratio_upper: f64,
}

/// Summary of a fitted Cox proportional hazards model.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CoxSummary {
    pub coefficients: Vec<CoxCoefficient>,
    pub n_observations: usize,
    pub n_events: usize,
    /// Log partial likelihood at the estimate.
    pub log_likelihood: f64,
    /// Log partial likelihood with all coefficients at zero.
    pub null_log_likelihood: f64,
    pub likelihood_ratio: f64,
    pub likelihood_ratio_df: usize,
    pub likelihood_ratio_p_value: f64,
    /// Harrell's concordance index.
    pub concordance: f64,
    pub iterations: usize,
}

impl CoxSummary {
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&CoxCoefficient> {
        self.coefficients
            .iter()
            .find(|c| c.coefficient.name == name)
    }
}

/// Right-censored data with covariates, sorted by time and ready to fit.
#[derive(Debug, Clone)]
pub struct CoxPhModel {
    names: Vec<String>,
    /// Sorted ascending by time.
    times: Vec<f64>,
    events: Vec<bool>,
    /// Centered covariates, aligned with `times`.
    x: Vec<DVector<f64>>,
    /// Start index of each run of equal times.
    group_starts: Vec<usize>,
}

impl CoxPhModel {
    /// Prepares a model from `times`, `events`, row-wise covariates and their names.
    pub fn new(
        times: &[f64],
        events: &[bool],
        covariates: &[Vec<f64>],
        names: &[String],
    ) -> Result<Self, RegressionError> {
        validate_right_censored(times, events)?;
        let p = validate_design(covariates, times.len())?;
        if p == 0 {
            return Err(RegressionError::NoCovariates);
        }
        validate_names(names, p)?;
        if !events.iter().any(|&e| e) {
            return Err(RegressionError::NoEvents);
        }

        let means = column_means(covariates, p);
        let mut order = (0..times.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));

        let sorted_times = order.iter().map(|&i| times[i]).collect::<Vec<_>>();
        let sorted_events = order.iter().map(|&i| events[i]).collect();
        let x = order
            .iter()
            .map(|&i| DVector::from_iterator(p, covariates[i].iter().zip(&means).map(|(v, m)| v - m)))
            .collect();
        let mut group_starts = vec![0];
        group_starts.extend((1..sorted_times.len()).filter(|&i| sorted_times[i] != sorted_times[i - 1]));

        Ok(Self {
            names: names.to_vec(),
            times: sorted_times,
            events: sorted_events,
            x,
            group_starts,
        })
    }

    /// Fits the model and returns the summary table.
    ///
    /// # Examples
    ///
    /// ```
    /// use medstat_stats::regression::cox::CoxPhModel;
    ///
    /// let times = [5.0, 7.0, 3.0, 9.0, 2.0, 8.0, 4.0, 6.0];
    /// let events = [true, true, true, false, true, true, false, true];
    /// let x = vec![
    ///     vec![1.0], vec![0.0], vec![1.0], vec![0.0],
    ///     vec![1.0], vec![1.0], vec![0.0], vec![0.0],
    /// ];
    /// let model = CoxPhModel::new(&times, &events, &x, &["treated".to_string()]).unwrap();
    /// let summary = model.fit().unwrap();
    /// assert_eq!(summary.n_events, 6);
    /// ```
    pub fn fit(&self) -> Result<CoxSummary, RegressionError> {
        let p = self.names.len();
        let mut beta = DVector::zeros(p);
        let null = self.evaluate(&beta);
        let mut current = null.clone();
        let mut iterations = 0;

        loop {
            if iterations >= MAX_ITERATIONS {
                return Err(RegressionError::NotConverged { iterations });
            }
            iterations += 1;

            let mut step = newton_step(&current.information, &current.gradient)?;
            let mut candidate_beta = &beta + &step;
            let mut candidate = self.evaluate(&candidate_beta);
            let mut halvings = 0;
            while !(candidate.log_likelihood >= current.log_likelihood - TOLERANCE)
                && halvings < MAX_STEP_HALVINGS
            {
                step *= 0.5;
                candidate_beta = &beta + &step;
                candidate = self.evaluate(&candidate_beta);
                halvings += 1;
            }

            let improvement = (candidate.log_likelihood - current.log_likelihood).abs();
            beta = candidate_beta;
            current = candidate;
            if max_abs(&step) < TOLERANCE || improvement < TOLERANCE * TOLERANCE {
                break;
            }
        }

        let std_errs = standard_errors(&current.information)?;
        let coefficients = self
            .names
            .iter()
            .zip(beta.iter().zip(&std_errs))
            .map(|(name, (&coef, &se))| {
                let coefficient = Coefficient::wald(name.clone(), coef, se);
                CoxCoefficient {
                    hazard_ratio: coef.exp(),
                    hazard_ratio_lower: coefficient.ci_lower.exp(),
                    hazard_ratio_upper: coefficient.ci_upper.exp(),
                    coefficient,
                }
            })
            .collect();

        let likelihood_ratio = (2.0 * (current.log_likelihood - null.log_likelihood)).max(0.0);
        #[expect(clippy::cast_precision_loss)]
        let likelihood_ratio_p_value = chi_squared_sf(likelihood_ratio, p as f64);
        let risk = self.x.iter().map(|x| x.dot(&beta)).collect::<Vec<_>>();

        Ok(CoxSummary {
            coefficients,
            n_observations: self.times.len(),
            n_events: self.events.iter().filter(|&&e| e).count(),
            log_likelihood: current.log_likelihood,
            null_log_likelihood: null.log_likelihood,
            likelihood_ratio,
            likelihood_ratio_df: p,
            likelihood_ratio_p_value,
            concordance: concordance_index(&self.times, &self.events, &risk),
            iterations,
        })
    }

    /// Efron log partial likelihood, its gradient and the observed information.
    #[expect(clippy::cast_precision_loss)]
    fn evaluate(&self, beta: &DVector<f64>) -> PartialLikelihood {
        let p = beta.len();
        let weights = self.x.iter().map(|x| x.dot(beta).exp()).collect::<Vec<_>>();

        let mut log_likelihood = 0.0;
        let mut gradient = DVector::zeros(p);
        let mut information = DMatrix::zeros(p, p);

        // Risk-set sums, accumulated from the latest time backwards.
        let mut s0 = 0.0;
        let mut s1 = DVector::zeros(p);
        let mut s2 = DMatrix::zeros(p, p);

        let n = self.times.len();
        for (g, &start) in self.group_starts.iter().enumerate().rev() {
            let end = self.group_starts.get(g + 1).copied().unwrap_or(n);

            let mut t0 = 0.0;
            let mut t1 = DVector::zeros(p);
            let mut t2 = DMatrix::zeros(p, p);
            let mut d = 0_usize;
            for i in start..end {
                let w = weights[i];
                let x = &self.x[i];
                let xx = x * x.transpose();
                s0 += w;
                s1 += x * w;
                s2 += &xx * w;
                if self.events[i] {
                    d += 1;
                    t0 += w;
                    t1 += x * w;
                    t2 += &xx * w;
                    log_likelihood += x.dot(beta);
                    gradient += x;
                }
            }

            let d_f = d as f64;
            for l in 0..d {
                let frac = l as f64 / d_f;
                let phi0 = s0 - frac * t0;
                let phi1 = &s1 - &t1 * frac;
                let phi2 = &s2 - &t2 * frac;
                log_likelihood -= phi0.ln();
                gradient -= &phi1 / phi0;
                information += &phi2 / phi0 - (&phi1 * phi1.transpose()) / (phi0 * phi0);
            }
        }

        PartialLikelihood {
            log_likelihood,
            gradient,
            information,
        }
    }
}

#[derive(Debug, Clone)]
struct PartialLikelihood {
    log_likelihood: f64,
    gradient: DVector<f64>,
    information: DMatrix<f64>,
}

#[expect(clippy::cast_precision_loss)]
fn column_means(x: &[Vec<f64>], p: usize) -> Vec<f64> {
    let n = x.len() as f64;
    (0..p)
        .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n)
        .collect()
}

/// Harrell's C: share of comparable pairs where the earlier event has the higher risk.
fn concordance_index(times: &[f64], events: &[bool], risk: &[f64]) -> f64 {
    let mut concordant = 0.0;
    let mut comparable = 0.0;
    for i in 0..times.len() {
        if !events[i] {
            continue;
        }
        for j in 0..times.len() {
            if times[j] > times[i] {
                comparable += 1.0;
                if risk[i] > risk[j] {
                    concordant += 1.0;
                } else if risk[i] == risk[j] {
                    concordant += 0.5;
                }
            }
        }
    }
    if comparable == 0.0 {
        0.5
    } else {
        concordant / comparable
    }
}

impl fmt::Display for CoxSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cox proportional hazards model (Efron ties)")?;
        writeln!(
            f,
            "  observations = {}, events = {}",
            self.n_observations, self.n_events
        )?;
        writeln!(f, "  log-likelihood = {:.4}", self.log_likelihood)?;
        writeln!(f, "  concordance = {:.3}", self.concordance)?;
        writeln!(
            f,
            "  likelihood ratio test = {:.3} on {} df, p = {:.5}",
            self.likelihood_ratio, self.likelihood_ratio_df, self.likelihood_ratio_p_value
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<20} {:>10} {:>10} {:>10} {:>8} {:>10} {:>12} {:>12}",
            "covariate", "coef", "exp(coef)", "se(coef)", "z", "p", "exp lower95", "exp upper95"
        )?;
        for c in &self.coefficients {
            let coef = &c.coefficient;
            writeln!(
                f,
                "  {:<20} {:>10.4} {:>10.4} {:>10.4} {:>8.3} {:>10.5} {:>12.4} {:>12.4}",
                coef.name,
                coef.coef,
                c.hazard_ratio,
                coef.std_err,
                coef.z,
                coef.p_value,
                c.hazard_ratio_lower,
                c.hazard_ratio_upper
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_single_binary_covariate_without_ties() {
        // Without ties, Efron equals Breslow; higher-risk group dies first.
        let times = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let events = [true, true, true, false, true, true, true, false];
        let x = [1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]
            .iter()
            .map(|&v| vec![v])
            .collect::<Vec<_>>();
        let summary = CoxPhModel::new(&times, &events, &x, &names(&["group"]))
            .unwrap()
            .fit()
            .unwrap();

        let coef = &summary.coefficients[0];
        assert!(coef.coefficient.coef > 0.0);
        assert!((coef.hazard_ratio - coef.coefficient.coef.exp()).abs() < 1e-12);
        assert!(coef.coefficient.std_err > 0.0);
        assert!(summary.log_likelihood >= summary.null_log_likelihood);
        assert!(summary.concordance > 0.5);
        assert!(coef.hazard_ratio_lower < coef.hazard_ratio);
        assert!(coef.hazard_ratio < coef.hazard_ratio_upper);
    }

    #[test]
    fn test_gradient_vanishes_at_estimate() {
        let times = [2.0, 3.0, 3.0, 5.0, 6.0, 6.0, 8.0, 9.0, 11.0, 12.0];
        let events = [true, true, true, false, true, true, true, false, true, false];
        let x = vec![
            vec![0.5, 1.0],
            vec![1.5, 0.0],
            vec![0.2, 1.0],
            vec![-0.3, 0.0],
            vec![1.1, 1.0],
            vec![-1.0, 0.0],
            vec![0.0, 1.0],
            vec![-0.7, 1.0],
            vec![-1.2, 0.0],
            vec![0.4, 0.0],
        ];
        let model = CoxPhModel::new(&times, &events, &x, &names(&["age", "sex"])).unwrap();
        let summary = model.fit().unwrap();
        let beta = DVector::from_iterator(
            2,
            summary.coefficients.iter().map(|c| c.coefficient.coef),
        );
        let at_estimate = model.evaluate(&beta);
        assert!(max_abs(&at_estimate.gradient) < 1e-6);
        assert!((at_estimate.log_likelihood - summary.log_likelihood).abs() < 1e-9);
        assert_eq!(summary.likelihood_ratio_df, 2);
        assert!(summary.coefficient("sex").is_some());
    }

    #[test]
    fn test_null_log_likelihood_without_ties() {
        // with beta = 0 and no ties, log L = -sum(ln n_at_risk) over events
        let times = [1.0, 2.0, 3.0];
        let events = [true, true, true];
        let x = vec![vec![1.0], vec![0.0], vec![2.0]];
        let model = CoxPhModel::new(&times, &events, &x, &names(&["x"])).unwrap();
        let null = model.evaluate(&DVector::zeros(1));
        let expected = -(3.0_f64.ln() + 2.0_f64.ln() + 1.0_f64.ln());
        assert!((null.log_likelihood - expected).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_input() {
        let x = vec![vec![1.0], vec![2.0]];
        assert_eq!(
            CoxPhModel::new(&[1.0, 2.0], &[false, false], &x, &names(&["x"])).unwrap_err(),
            RegressionError::NoEvents
        );
        assert!(matches!(
            CoxPhModel::new(&[1.0, 2.0], &[true, true], &x, &names(&["x", "y"])).unwrap_err(),
            RegressionError::ShapeMismatch { .. }
        ));
        assert!(matches!(
            CoxPhModel::new(&[1.0], &[true], &x, &names(&["x"])).unwrap_err(),
            RegressionError::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_constant_covariate_is_singular() {
        let x = vec![vec![1.0]; 4];
        let model = CoxPhModel::new(
            &[1.0, 2.0, 3.0, 4.0],
            &[true, true, false, true],
            &x,
            &names(&["constant"]),
        )
        .unwrap();
        assert_eq!(model.fit().unwrap_err(), RegressionError::Singular);
    }
}
