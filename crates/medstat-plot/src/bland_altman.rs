use medstat_analysis::dataset::Dataset;
use medstat_stats::agreement::BlandAltmanStats;
use plotters::style::{BLACK, BLUE, RED};

use crate::{
    axes::{Axes, LegendPosition, LineStyle, TextAnchor},
    error::PlotError,
};

pub const DEFAULT_TITLE: &str = "Bland-Altman plot";

const POINT_RADIUS: u32 = 2;
const P_VALUE_POSITION: (f64, f64) = (0.05, 0.95);

/// Scatter of pairwise means against differences with the limits of agreement.
///
/// Differences are `y_true - y_pred`. The paired t-test p-value is written
/// in the upper-left corner when the test is defined.
///
/// # Examples
///
/// ```
/// use medstat_plot::bland_altman::bland_altman_plot;
///
/// let (axes, stats) =
///     bland_altman_plot(&[10.0, 12.5, 9.0, 11.0], &[9.5, 12.0, 9.5, 10.0], None).unwrap();
/// assert_eq!(axes.title.as_deref(), Some("Bland-Altman plot"));
/// assert!(stats.upper_limit > stats.mean_difference);
/// ```
pub fn bland_altman_plot(
    y_true: &[f64],
    y_pred: &[f64],
    title: Option<&str>,
) -> Result<(Axes, BlandAltmanStats), PlotError> {
    let stats = BlandAltmanStats::new(y_true, y_pred)?;
    let axes = draw_bland_altman(
        &stats,
        "Mean of True and Predicted Measurements",
        "Difference between True and Predicted Measurements",
        title,
    );
    Ok((axes, stats))
}

/// [`bland_altman_plot`] on two dataset columns, skipping rows missing either value.
///
/// Axis labels name the columns: `Mean of {true} and {pred}` and `{true} - {pred}`.
pub fn bland_altman_plot_columns(
    dataset: &Dataset,
    true_column: &str,
    pred_column: &str,
    title: Option<&str>,
) -> Result<(Axes, BlandAltmanStats), PlotError> {
    let data = dataset.select_complete(&[true_column, pred_column])?;
    let y_true = data.numeric(true_column)?;
    let y_pred = data.numeric(pred_column)?;
    let stats = BlandAltmanStats::new(&y_true, &y_pred)?;
    let axes = draw_bland_altman(
        &stats,
        &format!("Mean of {true_column} and {pred_column}"),
        &format!("{true_column} - {pred_column}"),
        title,
    );
    Ok((axes, stats))
}

fn draw_bland_altman(
    stats: &BlandAltmanStats,
    x_label: &str,
    y_label: &str,
    title: Option<&str>,
) -> Axes {
    let mut axes = Axes::new();
    axes.set_title(title.unwrap_or(DEFAULT_TITLE))
        .set_x_label(x_label)
        .set_y_label(y_label)
        .set_legend(LegendPosition::UpperRight)
        .scatter(
            stats
                .means
                .iter()
                .copied()
                .zip(stats.differences.iter().copied())
                .collect(),
            BLACK,
            POINT_RADIUS,
            None,
        )
        .horizontal_line(
            stats.mean_difference,
            RED,
            LineStyle::Dashed,
            Some(format!("Mean Difference: {:.2}", stats.mean_difference)),
        )
        .horizontal_line(
            stats.upper_limit,
            BLUE,
            LineStyle::Dashed,
            Some(format!("Upper LoA: {:.2}", stats.upper_limit)),
        )
        .horizontal_line(
            stats.lower_limit,
            BLUE,
            LineStyle::Dashed,
            Some(format!("Lower LoA: {:.2}", stats.lower_limit)),
        );

    if let Some(test) = &stats.t_test {
        let (x, y) = P_VALUE_POSITION;
        axes.annotate_anchored(
            format!("p-value: {:.6}", test.p_value),
            x,
            y,
            TextAnchor::Top,
        );
    }
    axes
}

#[cfg(test)]
mod tests {
    use medstat_analysis::{dataset::Column, error::AnalysisError};

    use super::*;
    use crate::{axes::Mark, figure::Figure};

    #[test]
    fn test_reference_lines_and_labels() {
        let (axes, stats) =
            bland_altman_plot(&[1.0, 2.0, 3.0, 4.0], &[1.5, 1.5, 3.5, 3.5], Some("Agreement"))
                .unwrap();
        assert_eq!(axes.title.as_deref(), Some("Agreement"));
        assert_eq!(axes.series.len(), 1);
        assert_eq!(axes.series[0].mark, Mark::Scatter { radius: POINT_RADIUS });
        assert_eq!(axes.series[0].points[0], (1.25, -0.5));

        let labels = axes
            .horizontal_lines
            .iter()
            .filter_map(|l| l.label.as_deref())
            .collect::<Vec<_>>();
        // differences -0.5, 0.5, -0.5, 0.5: mean 0, population SD 0.5
        assert_eq!(
            labels,
            vec!["Mean Difference: 0.00", "Upper LoA: 0.98", "Lower LoA: -0.98"]
        );
        assert!((stats.upper_limit - 0.98).abs() < 1e-12);

        // zero bias: t = 0
        assert_eq!(axes.annotations.len(), 1);
        assert_eq!(axes.annotations[0].text, "p-value: 1.000000");
        assert_eq!(axes.annotations[0].anchor, TextAnchor::Top);
        assert_eq!((axes.annotations[0].x, axes.annotations[0].y), (0.05, 0.95));
    }

    #[test]
    fn test_no_p_value_without_variation() {
        let (axes, stats) = bland_altman_plot(&[2.0, 3.0, 4.0], &[1.0, 2.0, 3.0], None).unwrap();
        assert!(stats.t_test.is_none());
        assert!(axes.annotations.is_empty());
    }

    #[test]
    fn test_renders_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ba.svg");
        let (axes, _) = bland_altman_plot(&[5.0, 6.0, 7.0], &[5.2, 5.7, 7.4], None).unwrap();
        Figure::single(axes).save(&path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Bland-Altman plot"));
        assert!(svg.contains("Upper LoA"));
    }

    #[test]
    fn test_columns_skip_missing_rows() {
        let dataset = Dataset::from_columns(vec![
            Column::new("measured", [Some(1.0), None, Some(3.0)]),
            Column::new("predicted", [Some(1.0), Some(2.0), Some(2.0)]),
        ])
        .unwrap();
        let (axes, stats) =
            bland_altman_plot_columns(&dataset, "measured", "predicted", None).unwrap();
        assert_eq!(stats.differences, vec![0.0, 1.0]);
        assert_eq!(axes.x_label.as_deref(), Some("Mean of measured and predicted"));
        assert_eq!(axes.y_label.as_deref(), Some("measured - predicted"));
        // differences [0, 1]: t = 1 on 1 df, p = 1 - 2 atan(1) / pi = 0.5
        assert_eq!(axes.annotations[0].text, "p-value: 0.500000");

        assert!(matches!(
            bland_altman_plot_columns(&dataset, "measured", "other", None),
            Err(PlotError::Analysis {
                source: AnalysisError::MissingColumn { .. }
            })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            bland_altman_plot(&[1.0], &[1.0, 2.0], None),
            Err(PlotError::Analysis {
                source: AnalysisError::Agreement { .. }
            })
        ));
    }
}
