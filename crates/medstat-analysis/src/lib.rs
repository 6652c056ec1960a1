//! Dataset-level analyses for clinical research
//!
//! This crate turns named columns of a [`dataset::Dataset`] into the slices
//! `medstat-stats` works on, and runs the analyses that are usually written
//! as a handful of notebook cells.
//!
//! # Overview
//!
//! ## Kaplan-Meier Comparison Workflow
//!
//! 1. **Filter** ([`dataset::Dataset::select_complete`]): Drop rows missing the
//!    time, event or grouping value
//! 2. **Split** ([`cohort::split_cohorts`]): Partition the rows into two cohorts,
//!    by threshold or by the two values of a binary column
//! 3. **Estimate** ([`kaplan_meier::KaplanMeierComparison`]): One survival curve
//!    per cohort
//! 4. **Test**: Log-rank p-value comparing the two cohorts
//!
//! Drawing the result is done by `medstat-plot`.
//!
//! ## Risk-Factor Workflows
//!
//! - [`regression`]: Univariate and multivariate Cox regression, logistic
//!   classifiers evaluated on a held-out split, and the adjusted logit model
//! - [`value_counts`]: Frequency tables of categorical covariates
//!
//! # Errors
//!
//! Every failure is an [`error::AnalysisError`] variant. A grouping column that
//! cannot be split, an empty cohort and an unknown column are distinct kinds so
//! that scripts looping over many covariates can skip the ones that do not apply.
//!
//! # Examples
//!
//! ```
//! use medstat_analysis::{
//!     dataset::{Column, Dataset},
//!     kaplan_meier::{KaplanMeierComparison, KaplanMeierParams},
//! };
//!
//! let dataset = Dataset::from_columns(vec![
//!     Column::new("time", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
//!     Column::new("event", [1, 1, 0, 1, 1, 0, 1, 1, 1, 0]),
//!     Column::new("covariate", [1, 1, 1, 1, 1, 6, 6, 6, 6, 6]),
//! ])
//! .unwrap();
//! let params = KaplanMeierParams::new("time", "event", "covariate").with_threshold(5.0);
//! let comparison = KaplanMeierComparison::compute(&dataset, &params, true).unwrap();
//!
//! assert_eq!(comparison.curves[0].label, "covariate <= 5");
//! assert_eq!(comparison.curves[1].label, "covariate > 5");
//! println!("p-value: {:.5}", comparison.p_value().unwrap());
//! ```

pub mod cohort;
pub mod dataset;
pub mod error;
pub mod kaplan_meier;
pub mod regression;
pub mod reproducibility;
pub mod value_counts;
