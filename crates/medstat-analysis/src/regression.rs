//! Regression models fitted on dataset columns.
//!
//! Every function selects the columns it needs and drops rows with a missing
//! value in any of them before fitting.

use medstat_stats::regression::{
    RegressionError,
    cox::{CoxPhModel, CoxSummary},
    logistic::{LogisticRegression, LogitSummary},
    metrics::{accuracy_score, roc_auc_score},
};
use rand::seq::SliceRandom as _;
use rand_pcg::Pcg32;

use crate::{
    dataset::Dataset,
    error::AnalysisError,
    reproducibility::{DEFAULT_SEED, seed_everything},
};

/// Train/test split and classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogisticOptions {
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    /// Inverse L2 regularization strength.
    pub c: f64,
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self {
            test_size: 0.3,
            seed: DEFAULT_SEED,
            c: 1.0,
        }
    }
}

/// Held-out performance of a classifier.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassificationReport {
    pub features: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub accuracy: f64,
    /// `None` when the test rows contain a single class.
    pub roc_auc: Option<f64>,
    pub model: LogisticRegression,
}

fn unique_columns<'a>(groups: &[&[&'a str]]) -> Vec<&'a str> {
    let mut columns = Vec::new();
    for name in groups.iter().flat_map(|g| g.iter()) {
        if !columns.contains(name) {
            columns.push(*name);
        }
    }
    columns
}

fn owned_names(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// Cox proportional hazards model of `duration`/`event` on all `features` at once.
pub fn multivariate_cox_regression(
    dataset: &Dataset,
    duration: &str,
    event: &str,
    features: &[&str],
) -> Result<CoxSummary, AnalysisError> {
    if features.is_empty() {
        return Err(RegressionError::NoCovariates.into());
    }
    let data = dataset.select_complete(&unique_columns(&[&[duration, event], features]))?;
    let times = data.times(duration)?;
    let events = data.binary(event)?;
    let covariates = data.numeric_rows(features)?;
    let model = CoxPhModel::new(&times, &events, &covariates, &owned_names(features))?;
    Ok(model.fit()?)
}

/// One single-covariate Cox model per feature.
pub fn univariate_cox_regression(
    dataset: &Dataset,
    duration: &str,
    event: &str,
    features: &[&str],
) -> Result<Vec<CoxSummary>, AnalysisError> {
    features
        .iter()
        .map(|feature| multivariate_cox_regression(dataset, duration, event, &[*feature]))
        .collect()
}

/// Shuffled `(train, test)` row indices, with `ceil(test_size * n)` test rows.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn train_test_split(
    n: usize,
    test_size: f64,
    rng: &mut Pcg32,
) -> Result<(Vec<usize>, Vec<usize>), AnalysisError> {
    let n_test = (test_size * n as f64).ceil().max(0.0) as usize;
    if n_test == 0 {
        return Err(AnalysisError::InsufficientData {
            cohort: "test".to_string(),
        });
    }
    if n_test >= n {
        return Err(AnalysisError::InsufficientData {
            cohort: "train".to_string(),
        });
    }
    let mut order = (0..n).collect::<Vec<_>>();
    order.shuffle(rng);
    let train = order.split_off(n_test);
    Ok((train, order))
}

/// Penalized logistic classifier on all `features`, evaluated on a held-out split.
///
/// # Examples
///
/// ```
/// use medstat_analysis::{
///     dataset::{Column, Dataset},
///     regression::{LogisticOptions, multivariate_logistic_regression},
/// };
///
/// let x = (0..20).map(f64::from).collect::<Vec<_>>();
/// let y = (0..20).map(|i| i32::from(i >= 10)).collect::<Vec<_>>();
/// let dataset =
///     Dataset::from_columns(vec![Column::new("dose", x), Column::new("response", y)]).unwrap();
/// let report = multivariate_logistic_regression(
///     &dataset,
///     "response",
///     &["dose"],
///     &LogisticOptions::default(),
/// )
/// .unwrap();
/// assert_eq!((report.n_train, report.n_test), (14, 6));
/// assert!((0.0..=1.0).contains(&report.accuracy));
/// ```
pub fn multivariate_logistic_regression(
    dataset: &Dataset,
    target: &str,
    features: &[&str],
    options: &LogisticOptions,
) -> Result<ClassificationReport, AnalysisError> {
    if features.is_empty() {
        return Err(RegressionError::NoCovariates.into());
    }
    let data = dataset.select_complete(&unique_columns(&[features, &[target]]))?;
    let x = data.numeric_rows(features)?;
    let y = data.binary(target)?;

    let mut rng = seed_everything(options.seed);
    let (train, test) = train_test_split(y.len(), options.test_size, &mut rng)?;
    let pick_x = |rows: &[usize]| rows.iter().map(|&i| x[i].clone()).collect::<Vec<_>>();
    let pick_y = |rows: &[usize]| rows.iter().map(|&i| y[i]).collect::<Vec<_>>();
    let (x_train, y_train) = (pick_x(&train), pick_y(&train));
    let (x_test, y_test) = (pick_x(&test), pick_y(&test));

    let model = LogisticRegression::fit_penalized(&x_train, &y_train, options.c)?;
    let accuracy = accuracy_score(&y_test, &model.predict(&x_test))?;
    let roc_auc = match roc_auc_score(&y_test, &model.predict_proba(&x_test)) {
        Ok(auc) => Some(auc),
        Err(RegressionError::SingleClass) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(ClassificationReport {
        features: owned_names(features),
        n_train: train.len(),
        n_test: test.len(),
        accuracy,
        roc_auc,
        model,
    })
}

/// One single-feature classifier per feature.
pub fn univariate_logistic_regression(
    dataset: &Dataset,
    target: &str,
    features: &[&str],
    options: &LogisticOptions,
) -> Result<Vec<ClassificationReport>, AnalysisError> {
    features
        .iter()
        .map(|feature| multivariate_logistic_regression(dataset, target, &[*feature], options))
        .collect()
}

/// Unpenalized logit of `dependent` on `independent` plus `adjustment` covariates.
///
/// Fitted on all complete rows with a constant term. A name present in both
/// lists enters the model once.
pub fn multivariate_logistic_regression_adjusted(
    dataset: &Dataset,
    dependent: &str,
    independent: &[&str],
    adjustment: &[&str],
) -> Result<LogitSummary, AnalysisError> {
    let covariates = unique_columns(&[independent, adjustment]);
    if covariates.is_empty() {
        return Err(RegressionError::NoCovariates.into());
    }
    let data = dataset.select_complete(&unique_columns(&[&[dependent], covariates.as_slice()]))?;
    let x = data.numeric_rows(&covariates)?;
    let y = data.binary(dependent)?;
    let (_, summary) = LogisticRegression::fit_logit(&x, &y, &owned_names(&covariates))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    fn survival_data() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("time", [5.0, 7.0, 3.0, 9.0, 2.0, 8.0, 4.0, 6.0, 10.0, 1.0]),
            Column::new("event", [1, 1, 1, 0, 1, 1, 0, 1, 0, 1]),
            Column::new("treated", [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
            Column::new(
                "age",
                [
                    Some(61.0),
                    Some(50.0),
                    Some(72.0),
                    Some(45.0),
                    Some(68.0),
                    Some(55.0),
                    Some(49.0),
                    Some(66.0),
                    Some(40.0),
                    None,
                ],
            ),
        ])
        .unwrap()
    }

    fn classification_data() -> Dataset {
        // overlapping classes so the unpenalized fit stays finite
        let x = [
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
            17.0, 18.0, 19.0, 20.0,
        ];
        let y = [0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 1];
        let z = [
            0.5, 1.5, 0.2, 0.9, 1.1, 0.3, 0.8, 1.7, 0.4, 1.2, 0.6, 1.9, 0.1, 1.4, 0.7, 1.0, 1.3,
            0.2, 1.6, 0.9,
        ];
        Dataset::from_columns(vec![
            Column::new("x", x),
            Column::new("y", y),
            Column::new("z", z),
        ])
        .unwrap()
    }

    #[test]
    fn test_multivariate_cox_drops_incomplete_rows() {
        let summary =
            multivariate_cox_regression(&survival_data(), "time", "event", &["treated", "age"])
                .unwrap();
        assert_eq!(summary.n_observations, 9);
        assert!(summary.coefficient("treated").is_some());
        assert!(summary.coefficient("age").is_some());
    }

    #[test]
    fn test_univariate_cox_fits_each_feature_alone() {
        let summaries =
            univariate_cox_regression(&survival_data(), "time", "event", &["treated", "age"])
                .unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].n_observations, 10);
        assert_eq!(summaries[0].coefficients.len(), 1);
        assert_eq!(summaries[1].n_observations, 9);
    }

    #[test]
    fn test_cox_missing_column() {
        assert!(matches!(
            multivariate_cox_regression(&survival_data(), "time", "event", &["bmi"]),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_train_test_split_sizes_and_determinism() {
        let (train, test) = train_test_split(10, 0.3, &mut seed_everything(42)).unwrap();
        assert_eq!((train.len(), test.len()), (7, 3));
        let mut all = train.iter().chain(&test).copied().collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        let again = train_test_split(10, 0.3, &mut seed_everything(42)).unwrap();
        assert_eq!(again, (train, test));

        assert_eq!(
            train_test_split(1, 0.3, &mut seed_everything(42)).unwrap_err(),
            AnalysisError::InsufficientData {
                cohort: "train".to_string()
            }
        );
    }

    #[test]
    fn test_logistic_reports_are_reproducible() {
        let options = LogisticOptions::default();
        let a = multivariate_logistic_regression(&classification_data(), "y", &["x", "z"], &options)
            .unwrap();
        let b = multivariate_logistic_regression(&classification_data(), "y", &["x", "z"], &options)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_test, 6);
        assert!(a.roc_auc.is_none_or(|auc| (0.0..=1.0).contains(&auc)));
    }

    #[test]
    fn test_univariate_logistic() {
        let reports = univariate_logistic_regression(
            &classification_data(),
            "y",
            &["x", "z"],
            &LogisticOptions::default(),
        )
        .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].features, vec!["z".to_string()]);
        assert_eq!(reports[1].model.coefficients.len(), 1);
    }

    #[test]
    fn test_adjusted_logit_appends_adjustment_once() {
        let summary =
            multivariate_logistic_regression_adjusted(&classification_data(), "y", &["x"], &["z", "x"])
                .unwrap();
        let names = summary
            .coefficients
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["const", "x", "z"]);
        assert_eq!(summary.n_observations, 20);
        assert!(summary.coefficient("x").unwrap().coef > 0.0);
    }

    #[test]
    fn test_non_binary_target() {
        let dataset = Dataset::from_columns(vec![
            Column::new("x", [1.0, 2.0, 3.0]),
            Column { name: "y".to_string(), values: vec![Value::from(2.0); 3] },
        ])
        .unwrap();
        assert!(matches!(
            multivariate_logistic_regression_adjusted(&dataset, "y", &["x"], &[]),
            Err(AnalysisError::InvalidBinaryValue { .. })
        ));
    }
}
