//! Kaplan-Meier plot of two cohorts.
//!
//! ```no_run
//! use medstat_analysis::{dataset::Dataset, kaplan_meier::KaplanMeierParams};
//! use medstat_plot::{
//!     kaplan_meier::{KaplanMeierPlotConfig, kaplan_meier_plot},
//!     settings::init_plot_settings,
//! };
//!
//! # fn load() -> Dataset { unimplemented!() }
//! init_plot_settings();
//! let dataset = load();
//! let params = KaplanMeierParams::new("os_months", "death", "age").with_threshold(65.0);
//! let plot = kaplan_meier_plot(&dataset, &params, &KaplanMeierPlotConfig::default())?;
//! println!("p = {:?}", plot.p_value());
//! # Ok::<(), medstat_plot::error::PlotError>(())
//! ```

use std::path::PathBuf;

use medstat_analysis::{
    dataset::Dataset,
    kaplan_meier::{KaplanMeierComparison, KaplanMeierParams},
};

use crate::{
    axes::{Axes, LegendPosition, LineStyle, TAB_BLUE, TAB_ORANGE},
    error::PlotError,
    figure::Figure,
};

pub const DEFAULT_OUTPUT_PATH: &str = "./output.svg";

/// Axes-fraction position of the p-value text, just above the legend.
const P_VALUE_POSITION: (f64, f64) = (0.025, 0.2);

/// Optional behaviors of [`kaplan_meier_plot`].
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierPlotConfig {
    /// Run the log-rank test and print its p-value on the plot.
    pub include_significance_test: bool,
    /// Where to write the SVG; `None` skips writing.
    pub output_path: Option<PathBuf>,
    /// Replaces the title derived from the grouping column.
    pub title: Option<String>,
}

impl Default for KaplanMeierPlotConfig {
    fn default() -> Self {
        Self {
            include_significance_test: true,
            output_path: Some(PathBuf::from(DEFAULT_OUTPUT_PATH)),
            title: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KaplanMeierPlot {
    pub axes: Axes,
    pub comparison: KaplanMeierComparison,
    /// Path the figure was written to.
    pub output_path: Option<PathBuf>,
}

impl KaplanMeierPlot {
    #[must_use]
    pub fn p_value(&self) -> Option<f64> {
        self.comparison.p_value()
    }
}

#[must_use]
pub fn kaplan_meier_title(group_column: &str) -> String {
    format!("Kaplan-Meier Plot by {group_column}")
}

/// Splits `dataset`, estimates both curves, draws them and optionally saves the figure.
pub fn kaplan_meier_plot(
    dataset: &Dataset,
    params: &KaplanMeierParams,
    config: &KaplanMeierPlotConfig,
) -> Result<KaplanMeierPlot, PlotError> {
    let comparison =
        KaplanMeierComparison::compute(dataset, params, config.include_significance_test)?;

    let title = config
        .title
        .clone()
        .unwrap_or_else(|| kaplan_meier_title(&comparison.group_column));
    let mut axes = Axes::new();
    draw_kaplan_meier(&mut axes, &comparison, &title);

    if let Some(path) = &config.output_path {
        Figure::single(axes.clone()).save(path)?;
    }

    Ok(KaplanMeierPlot {
        axes,
        comparison,
        output_path: config.output_path.clone(),
    })
}

/// Draws both survival curves with their confidence bands onto `axes`.
pub fn draw_kaplan_meier(axes: &mut Axes, comparison: &KaplanMeierComparison, title: &str) {
    let max_time = comparison
        .curves
        .iter()
        .map(|c| c.curve.max_time())
        .fold(0.0, f64::max);
    let x_max = if max_time > 0.0 { max_time * 1.05 } else { 1.0 };

    axes.set_title(title)
        .set_x_label("Time")
        .set_y_label("Survival Probability")
        .set_x_limits(0.0, x_max)
        .set_y_limits(0.0, 1.05)
        .set_legend(LegendPosition::LowerLeft);

    for (labeled, color) in comparison.curves.iter().zip([TAB_BLUE, TAB_ORANGE]) {
        axes.band(labeled.curve.confidence_band_steps(), color);
        axes.line(
            labeled.curve.step_points(),
            color,
            LineStyle::Solid,
            Some(labeled.label.clone()),
        );
    }

    if let Some(p) = comparison.p_value() {
        let (x, y) = P_VALUE_POSITION;
        axes.annotate(format!("p-value: {p:.5}"), x, y);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use medstat_analysis::{dataset::Column, error::AnalysisError};

    use super::*;

    fn ten_rows() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("time", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
            Column::new("event", [1, 1, 0, 1, 1, 0, 1, 1, 1, 0]),
            Column::new("covariate", [1, 1, 1, 1, 1, 6, 6, 6, 6, 6]),
        ])
        .unwrap()
    }

    fn params() -> KaplanMeierParams {
        KaplanMeierParams::new("time", "event", "covariate").with_threshold(5.0)
    }

    #[test]
    fn test_plot_is_written_and_labelled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("km.svg");
        let config = KaplanMeierPlotConfig {
            output_path: Some(path.clone()),
            ..KaplanMeierPlotConfig::default()
        };
        let plot = kaplan_meier_plot(&ten_rows(), &params(), &config).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(!svg.is_empty());
        assert!(svg.contains("Kaplan-Meier Plot by covariate"));
        assert!(svg.contains("covariate &lt;= 5") || svg.contains("covariate <= 5"));
        assert!(svg.contains("p-value: "));

        let p = plot.p_value().unwrap();
        assert!(p > 0.0 && p <= 1.0);
        assert_eq!(plot.output_path, Some(path));
        assert_eq!(
            plot.axes.annotations[0].text,
            format!("p-value: {p:.5}")
        );
    }

    #[test]
    fn test_axes_handle_accepts_overlays() {
        let config = KaplanMeierPlotConfig {
            output_path: None,
            ..KaplanMeierPlotConfig::default()
        };
        let mut plot = kaplan_meier_plot(&ten_rows(), &params(), &config).unwrap();
        assert_eq!(plot.axes.series.len(), 2);
        assert_eq!(plot.axes.legend, Some(LegendPosition::LowerLeft));
        assert_eq!(plot.axes.x_label.as_deref(), Some("Time"));
        assert_eq!(plot.axes.y_label.as_deref(), Some("Survival Probability"));

        plot.axes
            .horizontal_line(0.5, plotters::style::BLACK, LineStyle::Dashed, None);
        let svg = Figure::single(plot.axes).to_svg().unwrap();
        assert!(svg.contains("<text"));
    }

    #[test]
    fn test_custom_title_and_no_test() {
        let config = KaplanMeierPlotConfig {
            include_significance_test: false,
            output_path: None,
            title: Some("Overall survival".to_string()),
        };
        let plot = kaplan_meier_plot(&ten_rows(), &params(), &config).unwrap();
        assert_eq!(plot.axes.title.as_deref(), Some("Overall survival"));
        assert!(plot.axes.annotations.is_empty());
        assert_eq!(plot.p_value(), None);
    }

    #[test]
    fn test_invalid_grouping_surfaces() {
        let dataset = Dataset::from_columns(vec![
            Column::new("time", [1.0, 2.0, 3.0]),
            Column::new("event", [1, 1, 1]),
            Column::new("stage", ["I", "II", "III"]),
        ])
        .unwrap();
        let params = KaplanMeierParams::new("time", "event", "stage");
        let config = KaplanMeierPlotConfig {
            output_path: None,
            ..KaplanMeierPlotConfig::default()
        };
        assert!(matches!(
            kaplan_meier_plot(&dataset, &params, &config),
            Err(PlotError::Analysis {
                source: AnalysisError::InvalidGrouping { .. }
            })
        ));
    }
}
