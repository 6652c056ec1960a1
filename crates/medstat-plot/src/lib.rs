//! Figures for clinical research analyses
//!
//! Plots are assembled on a retained-mode [`axes::Axes`] and written as SVG
//! through `plotters`. Every label is kept as a text element so figures stay
//! editable in vector-graphics tools.
//!
//! # Modules
//!
//! - [`settings`]: Process-wide fonts and canvas size, installed once with
//!   [`settings::init_plot_settings`]
//! - [`axes`]: Series, reference lines, bands, annotations and legend of one panel
//! - [`figure`]: Single panels and grids, rendered to SVG strings or files
//! - [`kaplan_meier`]: Two-cohort Kaplan-Meier plot with log-rank p-value
//! - [`bland_altman`]: Bland-Altman agreement plot
//!
//! # Examples
//!
//! ```
//! use medstat_analysis::{
//!     dataset::{Column, Dataset},
//!     kaplan_meier::KaplanMeierParams,
//! };
//! use medstat_plot::{
//!     figure::Figure,
//!     kaplan_meier::{KaplanMeierPlotConfig, kaplan_meier_plot},
//!     settings::init_plot_settings,
//! };
//!
//! init_plot_settings();
//!
//! let dataset = Dataset::from_columns(vec![
//!     Column::new("time", [3.0, 6.0, 9.0, 12.0]),
//!     Column::new("event", [1, 0, 1, 1]),
//!     Column::new("arm", ["control", "treated", "control", "treated"]),
//! ])
//! .unwrap();
//! let params = KaplanMeierParams::new("time", "event", "arm");
//! let config = KaplanMeierPlotConfig {
//!     output_path: None,
//!     ..KaplanMeierPlotConfig::default()
//! };
//! let plot = kaplan_meier_plot(&dataset, &params, &config).unwrap();
//!
//! let svg = Figure::single(plot.axes).to_svg().unwrap();
//! assert!(svg.contains("Kaplan-Meier Plot by arm"));
//! ```

pub mod axes;
pub mod bland_altman;
pub mod error;
pub mod figure;
pub mod kaplan_meier;
pub mod settings;
