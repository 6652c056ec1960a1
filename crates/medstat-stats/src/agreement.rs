//! Bland-Altman agreement between two measurement methods.

use statrs::distribution::{ContinuousCDF as _, StudentsT};

use crate::descriptive::DescriptiveStats;

/// Multiplier of the standard deviation for the 95% limits of agreement.
pub const LIMITS_OF_AGREEMENT_Z: f64 = 1.96;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AgreementError {
    #[display("no paired measurements")]
    Empty,
    #[display("measurement arrays have different lengths ({reference} != {compared})")]
    LengthMismatch { reference: usize, compared: usize },
    #[display("non-finite measurement in pair {index}")]
    NonFinite { index: usize },
    #[display("paired t-test needs at least two pairs, got {count}")]
    TooFewPairs { count: usize },
    #[display("paired differences have no variation")]
    NoVariation,
}

/// Paired two-sided t-test of `reference - compared` against zero.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PairedTTest {
    pub t_statistic: f64,
    /// `n - 1`
    pub df: usize,
    pub p_value: f64,
}

/// Paired t-test on two measurement arrays.
///
/// The statistic is `mean(d) / (s_d / sqrt(n))` with the sample standard
/// deviation `s_d` of the differences.
///
/// # Examples
///
/// ```
/// use medstat_stats::agreement::paired_t_test;
///
/// // differences [1, 3]: mean 2, standard error 1
/// let test = paired_t_test(&[2.0, 4.0], &[1.0, 1.0]).unwrap();
/// assert!((test.t_statistic - 2.0).abs() < 1e-12);
/// assert_eq!(test.df, 1);
/// ```
pub fn paired_t_test(
    reference: &[f64],
    compared: &[f64],
) -> Result<PairedTTest, AgreementError> {
    let differences = paired_differences(reference, compared)?;
    t_test_of_differences(&differences)
}

fn paired_differences(reference: &[f64], compared: &[f64]) -> Result<Vec<f64>, AgreementError> {
    if reference.len() != compared.len() {
        return Err(AgreementError::LengthMismatch {
            reference: reference.len(),
            compared: compared.len(),
        });
    }
    if reference.is_empty() {
        return Err(AgreementError::Empty);
    }
    if let Some(index) = reference
        .iter()
        .zip(compared)
        .position(|(a, b)| !a.is_finite() || !b.is_finite())
    {
        return Err(AgreementError::NonFinite { index });
    }
    Ok(reference.iter().zip(compared).map(|(a, b)| a - b).collect())
}

#[expect(clippy::cast_precision_loss)]
fn t_test_of_differences(differences: &[f64]) -> Result<PairedTTest, AgreementError> {
    let count = differences.len();
    if count < 2 {
        return Err(AgreementError::TooFewPairs { count });
    }
    let n = count as f64;
    let mean = differences.iter().sum::<f64>() / n;
    let sample_variance = differences
        .iter()
        .map(|d| (d - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    if sample_variance <= 0.0 {
        return Err(AgreementError::NoVariation);
    }

    let df = count - 1;
    let t_statistic = mean / (sample_variance / n).sqrt();
    let p_value = StudentsT::new(0.0, 1.0, df as f64)
        .map(|dist| (2.0 * dist.sf(t_statistic.abs())).min(1.0))
        .map_err(|_| AgreementError::TooFewPairs { count })?;
    Ok(PairedTTest {
        t_statistic,
        df,
        p_value,
    })
}

/// Bland-Altman statistics for paired measurements.
///
/// Differences are `reference - compared`. The standard deviation is the
/// population one.
///
/// # Examples
///
/// ```
/// use medstat_stats::agreement::BlandAltmanStats;
///
/// let stats = BlandAltmanStats::new(&[1.0, 2.0, 3.0], &[0.0, 2.0, 4.0]).unwrap();
/// assert_eq!(stats.means, vec![0.5, 2.0, 3.5]);
/// assert_eq!(stats.differences, vec![1.0, 0.0, -1.0]);
/// assert!(stats.upper_limit > stats.mean_difference);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BlandAltmanStats {
    /// Mean of each pair.
    pub means: Vec<f64>,
    /// Difference of each pair.
    pub differences: Vec<f64>,
    /// Mean of the differences (bias).
    pub mean_difference: f64,
    /// Standard deviation of the differences.
    pub std_dev_difference: f64,
    /// `mean_difference + 1.96 * std_dev_difference`
    pub upper_limit: f64,
    /// `mean_difference - 1.96 * std_dev_difference`
    pub lower_limit: f64,
    /// Paired t-test of the bias; `None` with fewer than two pairs or
    /// constant differences.
    pub t_test: Option<PairedTTest>,
}

impl BlandAltmanStats {
    pub fn new(reference: &[f64], compared: &[f64]) -> Result<Self, AgreementError> {
        let differences = paired_differences(reference, compared)?;
        let means = reference
            .iter()
            .zip(compared)
            .map(|(&a, &b)| f64::midpoint(a, b))
            .collect::<Vec<_>>();
        let stats =
            DescriptiveStats::new(differences.iter().copied()).ok_or(AgreementError::Empty)?;
        let spread = LIMITS_OF_AGREEMENT_Z * stats.std_dev;
        let t_test = t_test_of_differences(&differences).ok();

        Ok(Self {
            means,
            differences,
            mean_difference: stats.mean,
            std_dev_difference: stats.std_dev,
            upper_limit: stats.mean + spread,
            lower_limit: stats.mean - spread,
            t_test,
        })
    }
}
