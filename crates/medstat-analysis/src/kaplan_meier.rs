//! Kaplan-Meier comparison of two cohorts.
//!
//! [`KaplanMeierComparison::compute`] runs the whole numeric part of the
//! workflow: drop incomplete rows, split into two cohorts, estimate one
//! survival curve per cohort and optionally compare them with a log-rank
//! test. Rendering lives in `medstat-plot`.

use std::fmt::Write as _;

use medstat_stats::{logrank::LogRankResult, survival::KaplanMeierCurve};

use crate::{
    cohort::{Cohort, split_cohorts},
    dataset::Dataset,
    error::AnalysisError,
};

/// Column names and grouping rule of a comparison.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KaplanMeierParams {
    pub time_column: String,
    pub event_column: String,
    pub group_column: String,
    /// Split at this value; `None` requires a column with two distinct values.
    pub threshold: Option<f64>,
}

impl KaplanMeierParams {
    pub fn new(
        time_column: impl Into<String>,
        event_column: impl Into<String>,
        group_column: impl Into<String>,
    ) -> Self {
        Self {
            time_column: time_column.into(),
            event_column: event_column.into(),
            group_column: group_column.into(),
            threshold: None,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// A survival curve with the label of its cohort.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LabeledCurve {
    pub label: String,
    pub curve: KaplanMeierCurve,
}

/// Result of [`KaplanMeierComparison::compute`].
#[derive(Debug, Clone)]
pub struct KaplanMeierComparison {
    pub group_column: String,
    pub cohorts: [Cohort; 2],
    /// One curve per cohort, in cohort order.
    pub curves: [LabeledCurve; 2],
    /// `None` when the test was not requested.
    pub log_rank: Option<LogRankResult>,
}

impl KaplanMeierComparison {
    /// # Examples
    ///
    /// ```
    /// use medstat_analysis::{
    ///     dataset::{Column, Dataset},
    ///     kaplan_meier::{KaplanMeierComparison, KaplanMeierParams},
    /// };
    ///
    /// let dataset = Dataset::from_columns(vec![
    ///     Column::new("time", [2.0, 4.0, 6.0, 8.0]),
    ///     Column::new("event", [1, 1, 0, 1]),
    ///     Column::new("arm", ["A", "B", "A", "B"]),
    /// ])
    /// .unwrap();
    /// let params = KaplanMeierParams::new("time", "event", "arm");
    /// let comparison = KaplanMeierComparison::compute(&dataset, &params, true).unwrap();
    /// assert_eq!(comparison.curves[0].label, "A");
    /// let p = comparison.p_value().unwrap();
    /// assert!(p > 0.0 && p <= 1.0);
    /// ```
    pub fn compute(
        dataset: &Dataset,
        params: &KaplanMeierParams,
        include_test: bool,
    ) -> Result<Self, AnalysisError> {
        let pair = split_cohorts(dataset, params)?;
        let estimate = |cohort: &Cohort| -> Result<LabeledCurve, AnalysisError> {
            Ok(LabeledCurve {
                label: cohort.label.clone(),
                curve: KaplanMeierCurve::estimate(&cohort.times, &cohort.events)?,
            })
        };
        let curves = [estimate(&pair.first)?, estimate(&pair.second)?];

        let log_rank = if include_test {
            Some(medstat_stats::logrank::log_rank_test(
                &pair.first.times,
                &pair.first.events,
                &pair.second.times,
                &pair.second.events,
            )?)
        } else {
            None
        };

        Ok(Self {
            group_column: params.group_column.clone(),
            cohorts: [pair.first, pair.second],
            curves,
            log_rank,
        })
    }

    #[must_use]
    pub fn p_value(&self) -> Option<f64> {
        self.log_rank.as_ref().map(|r| r.p_value)
    }

    /// Both curves as CSV with a header row.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("label,time,survival_prob,at_risk,events,censored\n");
        for LabeledCurve { label, curve } in &self.curves {
            for i in 0..curve.times.len() {
                writeln!(
                    csv,
                    "{},{},{},{},{},{}",
                    csv_field(label),
                    curve.times[i],
                    curve.survival_prob[i],
                    curve.at_risk[i],
                    curve.events[i],
                    curve.censored[i],
                )
                .unwrap_or(());
            }
        }
        csv
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
