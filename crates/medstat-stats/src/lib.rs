//! Statistical building blocks for clinical research analyses.
//!
//! This crate works on plain slices of numbers and knows nothing about
//! tables or plots. It provides:
//!
//! - **Descriptive statistics**: mean, median, population variance and standard deviation
//! - **Survival analysis**: Kaplan-Meier estimator with Greenwood confidence intervals
//! - **Log-rank test**: two-group comparison of survival distributions
//! - **Agreement**: Bland-Altman mean difference and limits of agreement
//! - **Regression**: Cox proportional hazards and logistic regression, plus
//!   classification metrics
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`survival`]: Kaplan-Meier survival curves for time-to-event data
//! - [`logrank`]: Log-rank (Mantel-Cox) test between two groups
//! - [`agreement`]: Bland-Altman agreement between two measurement methods
//! - [`regression`]: Cox PH and logistic regression fits with summaries
//! - [`distribution`]: Normal and chi-squared tail probabilities
//!
//! # Examples
//!
//! ## Estimating a survival curve
//!
//! ```
//! use medstat_stats::survival::KaplanMeierCurve;
//!
//! let times = [10.0, 20.0, 30.0];
//! let events = [true, false, true];
//! let curve = KaplanMeierCurve::estimate(&times, &events).unwrap();
//! assert_eq!(curve.survival_at(0.0), 1.0);
//! assert!((curve.survival_at(10.0) - 2.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! ## Comparing two groups
//!
//! ```
//! use medstat_stats::logrank::log_rank_test;
//!
//! let result = log_rank_test(
//!     &[1.0, 2.0, 3.0],
//!     &[true, true, true],
//!     &[4.0, 5.0, 6.0],
//!     &[true, true, false],
//! )
//! .unwrap();
//! assert!(result.p_value > 0.0 && result.p_value <= 1.0);
//! ```
//!
//! ## Bland-Altman agreement
//!
//! ```
//! use medstat_stats::agreement::BlandAltmanStats;
//!
//! let stats = BlandAltmanStats::new(&[10.0, 12.0, 14.0], &[9.0, 12.0, 15.0]).unwrap();
//! assert!(stats.mean_difference.abs() < 1e-12);
//! ```

pub mod agreement;
pub mod descriptive;
pub mod distribution;
pub mod logrank;
pub mod regression;
pub mod survival;
