//! Regression models used for risk-factor analysis.
//!
//! - [`cox`]: Cox proportional hazards model (Efron ties) for time-to-event outcomes
//! - [`logistic`]: Logistic regression for binary outcomes, both as an
//!   inferential model with a summary table and as an L2-penalized classifier
//! - [`metrics`]: Accuracy and ROC AUC for classifier evaluation
//!
//! Both models are fitted by Newton-Raphson with step halving and report
//! Wald standard errors from the inverse information matrix.

use nalgebra::{DMatrix, DVector};

use crate::{
    distribution::{normal_quantile, normal_two_sided_p},
    survival::SurvivalDataError,
};

pub mod cox;
pub mod logistic;
pub mod metrics;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RegressionError {
    #[display("no observations")]
    Empty,
    #[display("model needs at least one covariate")]
    NoCovariates,
    #[display("{what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("row {row} has {actual} covariates, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("non-finite covariate at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },
    #[display("non-finite score at row {row}")]
    NonFiniteScore { row: usize },
    #[display("no events observed")]
    NoEvents,
    #[display("outcome has a single class")]
    SingleClass,
    #[display("information matrix is singular")]
    Singular,
    #[display("fit did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
    #[display("{source}")]
    Survival { source: SurvivalDataError },
}

impl From<SurvivalDataError> for RegressionError {
    fn from(source: SurvivalDataError) -> Self {
        Self::Survival { source }
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Coefficient {
    pub name: String,
    pub coef: f64,
    pub std_err: f64,
    pub z: f64,
    pub p_value: f64,
    /// Lower bound of the 95% Wald interval.
    pub ci_lower: f64,
    /// Upper bound of the 95% Wald interval.
    pub ci_upper: f64,
}

impl Coefficient {
    fn wald(name: String, coef: f64, std_err: f64) -> Self {
        let z = coef / std_err;
        let q = normal_quantile(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0);
        Self {
            name,
            coef,
            std_err,
            z,
            p_value: normal_two_sided_p(z),
            ci_lower: coef - q * std_err,
            ci_upper: coef + q * std_err,
        }
    }
}

/// Checks that `x` is a non-empty rectangular matrix of finite values with `n` rows.
fn validate_design(x: &[Vec<f64>], n: usize) -> Result<usize, RegressionError> {
    if n == 0 {
        return Err(RegressionError::Empty);
    }
    if x.len() != n {
        return Err(RegressionError::ShapeMismatch {
            what: "covariate matrix",
            expected: n,
            actual: x.len(),
        });
    }
    let p = x[0].len();
    for (row, values) in x.iter().enumerate() {
        if values.len() != p {
            return Err(RegressionError::RaggedRow {
                row,
                expected: p,
                actual: values.len(),
            });
        }
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(RegressionError::NonFinite { row, column });
        }
    }
    Ok(p)
}

fn validate_names(names: &[String], p: usize) -> Result<(), RegressionError> {
    if names.len() != p {
        return Err(RegressionError::ShapeMismatch {
            what: "covariate names",
            expected: p,
            actual: names.len(),
        });
    }
    Ok(())
}

/// Solves `information * step = gradient` for a symmetric positive definite matrix.
fn newton_step(
    information: &DMatrix<f64>,
    gradient: &DVector<f64>,
) -> Result<DVector<f64>, RegressionError> {
    let chol = information
        .clone()
        .cholesky()
        .ok_or(RegressionError::Singular)?;
    Ok(chol.solve(gradient))
}

/// Standard errors from the diagonal of the inverse information matrix.
fn standard_errors(information: &DMatrix<f64>) -> Result<Vec<f64>, RegressionError> {
    let chol = information
        .clone()
        .cholesky()
        .ok_or(RegressionError::Singular)?;
    let covariance = chol.inverse();
    Ok(covariance.diagonal().iter().map(|v| v.sqrt()).collect())
}

fn max_abs(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
