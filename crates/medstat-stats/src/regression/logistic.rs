//! Logistic regression for binary outcomes.
//!
//! [`LogisticRegression::fit_logit`] is the inferential model (intercept named
//! `const`, no penalty, coefficient table with Wald tests).
//! [`LogisticRegression::fit_penalized`] is the classifier flavour: intercept
//! plus an L2 penalty of strength `1 / c` on the slopes.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use super::{
    Coefficient, RegressionError, max_abs, newton_step, standard_errors, validate_design,
    validate_names,
};
use crate::distribution::chi_squared_sf;

const MAX_ITERATIONS: usize = 100;
const MAX_STEP_HALVINGS: usize = 30;
const TOLERANCE: f64 = 1e-8;

/// Name of the intercept term in [`LogitSummary`].
pub const INTERCEPT_NAME: &str = "const";

/// Fitted logistic regression model.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LogisticRegression {
    /// Intercept.
    pub intercept: f64,
    /// Slope per covariate.
    pub coefficients: Vec<f64>,
}

/// Statistics of an unpenalized logistic fit.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LogitSummary {
    /// Intercept first, then one row per covariate.
    pub coefficients: Vec<Coefficient>,
    pub n_observations: usize,
    pub log_likelihood: f64,
    /// Log-likelihood of the intercept-only model.
    pub null_log_likelihood: f64,
    /// McFadden's pseudo R².
    pub pseudo_r_squared: f64,
    pub likelihood_ratio: f64,
    pub likelihood_ratio_p_value: f64,
    pub iterations: usize,
}

impl LogitSummary {
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone)]
struct FitOutcome {
    beta: DVector<f64>,
    log_likelihood: f64,
    information: DMatrix<f64>,
    iterations: usize,
}

impl LogisticRegression {
    /// Fits an L2-penalized classifier with inverse regularization strength `c`.
    ///
    /// The intercept is not penalized.
    ///
    /// # Examples
    ///
    /// ```
    /// use medstat_stats::regression::logistic::LogisticRegression;
    ///
    /// let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
    /// let y = [false, false, true, true];
    /// let model = LogisticRegression::fit_penalized(&x, &y, 1.0).unwrap();
    /// assert_eq!(model.predict(&x), vec![false, false, true, true]);
    /// ```
    pub fn fit_penalized(x: &[Vec<f64>], y: &[bool], c: f64) -> Result<Self, RegressionError> {
        let penalty = if c > 0.0 && c.is_finite() { 1.0 / c } else { 0.0 };
        let outcome = fit(x, y, penalty)?;
        Ok(Self::from_beta(&outcome.beta))
    }

    /// Fits the unpenalized model with a constant and returns its summary.
    pub fn fit_logit(
        x: &[Vec<f64>],
        y: &[bool],
        names: &[String],
    ) -> Result<(Self, LogitSummary), RegressionError> {
        let outcome = fit(x, y, 0.0)?;
        validate_names(names, outcome.beta.len() - 1)?;

        let std_errs = standard_errors(&outcome.information)?;
        let coefficients = std::iter::once(INTERCEPT_NAME.to_string())
            .chain(names.iter().cloned())
            .zip(outcome.beta.iter().zip(&std_errs))
            .map(|(name, (&coef, &se))| Coefficient::wald(name, coef, se))
            .collect();

        let null_log_likelihood = null_log_likelihood(y);
        let likelihood_ratio = (2.0 * (outcome.log_likelihood - null_log_likelihood)).max(0.0);
        #[expect(clippy::cast_precision_loss)]
        let likelihood_ratio_p_value = chi_squared_sf(likelihood_ratio, names.len() as f64);
        let pseudo_r_squared = if null_log_likelihood == 0.0 {
            0.0
        } else {
            1.0 - outcome.log_likelihood / null_log_likelihood
        };

        let summary = LogitSummary {
            coefficients,
            n_observations: y.len(),
            log_likelihood: outcome.log_likelihood,
            null_log_likelihood,
            pseudo_r_squared,
            likelihood_ratio,
            likelihood_ratio_p_value,
            iterations: outcome.iterations,
        };
        Ok((Self::from_beta(&outcome.beta), summary))
    }

    fn from_beta(beta: &DVector<f64>) -> Self {
        Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
        }
    }

    /// Linear predictor `intercept + x * coefficients` for one row.
    fn linear_predictor(&self, row: &[f64]) -> f64 {
        self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, b)| x * b)
                .sum::<f64>()
    }

    /// Probability of the positive class for each row.
    #[must_use]
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| sigmoid(self.linear_predictor(row)))
            .collect()
    }

    /// Predicted class for each row (probability threshold 0.5).
    #[must_use]
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<bool> {
        self.predict_proba(x).into_iter().map(|p| p > 0.5).collect()
    }
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + exp(eta))` without overflow.
fn log1p_exp(eta: f64) -> f64 {
    if eta > 0.0 {
        eta + (-eta).exp().ln_1p()
    } else {
        eta.exp().ln_1p()
    }
}

#[expect(clippy::cast_precision_loss)]
fn null_log_likelihood(y: &[bool]) -> f64 {
    let n = y.len() as f64;
    let positives = y.iter().filter(|&&v| v).count() as f64;
    let rate = positives / n;
    let term = |count: f64, prob: f64| if count > 0.0 { count * prob.ln() } else { 0.0 };
    term(positives, rate) + term(n - positives, 1.0 - rate)
}

fn design_rows(x: &[Vec<f64>], p: usize) -> Vec<DVector<f64>> {
    x.iter()
        .map(|row| DVector::from_iterator(p + 1, std::iter::once(1.0).chain(row.iter().copied())))
        .collect()
}

/// Penalized objective pieces: log-likelihood minus penalty, gradient, information.
fn evaluate(
    rows: &[DVector<f64>],
    y: &[bool],
    beta: &DVector<f64>,
    penalty: f64,
) -> (f64, DVector<f64>, DMatrix<f64>) {
    let k = beta.len();
    let mut objective = 0.0;
    let mut gradient = DVector::zeros(k);
    let mut information = DMatrix::zeros(k, k);

    for (row, &outcome) in rows.iter().zip(y) {
        let eta = row.dot(beta);
        let prob = sigmoid(eta);
        let target = if outcome { 1.0 } else { 0.0 };
        objective += target * eta - log1p_exp(eta);
        gradient += row * (target - prob);
        information += (row * row.transpose()) * (prob * (1.0 - prob));
    }

    if penalty > 0.0 {
        for j in 1..k {
            objective -= 0.5 * penalty * beta[j] * beta[j];
            gradient[j] -= penalty * beta[j];
            information[(j, j)] += penalty;
        }
    }

    (objective, gradient, information)
}

fn fit(x: &[Vec<f64>], y: &[bool], penalty: f64) -> Result<FitOutcome, RegressionError> {
    let p = validate_design(x, y.len())?;
    if y.iter().all(|&v| v) || y.iter().all(|&v| !v) {
        return Err(RegressionError::SingleClass);
    }

    let rows = design_rows(x, p);
    let mut beta = DVector::zeros(p + 1);
    let (mut objective, mut gradient, mut information) = evaluate(&rows, y, &beta, penalty);
    let mut iterations = 0;

    loop {
        if iterations >= MAX_ITERATIONS {
            return Err(RegressionError::NotConverged { iterations });
        }
        iterations += 1;

        let mut step = newton_step(&information, &gradient)?;
        let mut candidate = &beta + &step;
        let mut evaluated = evaluate(&rows, y, &candidate, penalty);
        let mut halvings = 0;
        while !(evaluated.0 >= objective - TOLERANCE) && halvings < MAX_STEP_HALVINGS {
            step *= 0.5;
            candidate = &beta + &step;
            evaluated = evaluate(&rows, y, &candidate, penalty);
            halvings += 1;
        }

        beta = candidate;
        (objective, gradient, information) = evaluated;
        if max_abs(&step) < TOLERANCE {
            break;
        }
    }

    // The reported log-likelihood excludes the penalty term.
    let (log_likelihood, _, _) = evaluate(&rows, y, &beta, 0.0);
    Ok(FitOutcome {
        beta,
        log_likelihood,
        information,
        iterations,
    })
}

impl fmt::Display for LogitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Logit regression results")?;
        writeln!(f, "  observations = {}", self.n_observations)?;
        writeln!(
            f,
            "  log-likelihood = {:.4}, null = {:.4}, pseudo R2 = {:.4}",
            self.log_likelihood, self.null_log_likelihood, self.pseudo_r_squared
        )?;
        writeln!(f, "  LLR p-value = {:.5}", self.likelihood_ratio_p_value)?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<20} {:>10} {:>10} {:>8} {:>10} {:>10} {:>10}",
            "", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"
        )?;
        for c in &self.coefficients {
            writeln!(
                f,
                "  {:<20} {:>10.4} {:>10.4} {:>8.3} {:>10.5} {:>10.4} {:>10.4}",
                c.name, c.coef, c.std_err, c.z, c.p_value, c.ci_lower, c.ci_upper
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_data() -> (Vec<Vec<f64>>, Vec<bool>) {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
            .iter()
            .map(|&v| vec![v])
            .collect();
        let y = vec![
            false, false, true, false, false, true, false, true, true, true,
        ];
        (x, y)
    }

    #[test]
    fn test_logit_score_equations_hold() {
        let (x, y) = overlapping_data();
        let (model, summary) =
            LogisticRegression::fit_logit(&x, &y, &["dose".to_string()]).unwrap();

        // At the MLE, sum(y - p) = 0 and sum(x * (y - p)) = 0
        let probs = model.predict_proba(&x);
        let residuals = y
            .iter()
            .zip(&probs)
            .map(|(&t, p)| if t { 1.0 } else { 0.0 } - p)
            .collect::<Vec<_>>();
        assert!(residuals.iter().sum::<f64>().abs() < 1e-6);
        let weighted = x
            .iter()
            .zip(&residuals)
            .map(|(row, r)| row[0] * r)
            .sum::<f64>();
        assert!(weighted.abs() < 1e-6);

        assert_eq!(summary.coefficients[0].name, INTERCEPT_NAME);
        let dose = summary.coefficient("dose").unwrap();
        assert!(dose.coef > 0.0);
        assert!(dose.ci_lower < dose.coef && dose.coef < dose.ci_upper);
        assert!(summary.log_likelihood > summary.null_log_likelihood);
        assert!(summary.pseudo_r_squared > 0.0 && summary.pseudo_r_squared < 1.0);
    }

    #[test]
    fn test_null_log_likelihood() {
        let y = [true, false, false, true];
        assert!((null_log_likelihood(&y) - 4.0 * 0.5_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_penalty_shrinks_slope() {
        let (x, y) = overlapping_data();
        let (unpenalized, _) =
            LogisticRegression::fit_logit(&x, &y, &["dose".to_string()]).unwrap();
        let strong = LogisticRegression::fit_penalized(&x, &y, 0.01).unwrap();
        assert!(strong.coefficients[0].abs() < unpenalized.coefficients[0].abs());
    }

    #[test]
    fn test_penalized_fit_handles_separation() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = [false, false, true, true];
        let model = LogisticRegression::fit_penalized(&x, &y, 1.0).unwrap();
        assert!(model.coefficients[0] > 0.0);
        assert!(model.coefficients[0].is_finite());
    }

    #[test]
    fn test_single_class_is_error() {
        let x = vec![vec![0.0], vec![1.0]];
        assert_eq!(
            LogisticRegression::fit_penalized(&x, &[true, true], 1.0).unwrap_err(),
            RegressionError::SingleClass
        );
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!((log1p_exp(1000.0) - 1000.0).abs() < 1e-9);
    }
}
