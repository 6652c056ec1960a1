//! Retained-mode axes.
//!
//! An [`Axes`] records what to draw and is rendered only when its
//! [`Figure`](crate::figure::Figure) is written. Workflows return the
//! `Axes` they built so callers can add overlays or place it in a grid.

use plotters::{
    coord::Shift,
    prelude::*,
    series::DashedLineSeries,
    style::text_anchor::{HPos, Pos, VPos},
};

use crate::{
    error::{RenderError, draw_error},
    settings::PlotSettings,
};

/// First color of the default color cycle.
pub const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
/// Second color of the default color cycle.
pub const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);

const LINE_WIDTH: u32 = 2;
const DASH_SIZE: u32 = 8;
const DASH_SPACING: u32 = 5;
const BAND_OPACITY: f64 = 0.2;
const RANGE_PADDING: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl From<LegendPosition> for SeriesLabelPosition {
    fn from(position: LegendPosition) -> Self {
        match position {
            LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Line(LineStyle),
    Scatter { radius: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub mark: Mark,
}

/// Horizontal reference line spanning the whole x range.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalLine {
    pub y: f64,
    pub label: Option<String>,
    pub color: RGBColor,
    pub style: LineStyle,
}

/// Shaded region between a lower and an upper path, as `(x, lower, upper)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub points: Vec<(f64, f64, f64)>,
    pub color: RGBColor,
}

/// Which edge of an annotation sits at its `y` position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Bottom,
    Top,
}

/// Text placed in axes coordinates, `(0, 0)` lower-left and `(1, 1)` upper-right.
///
/// `x` is the left edge of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Fixed x range; derived from the data when `None`.
    pub x_limits: Option<(f64, f64)>,
    /// Fixed y range; derived from the data when `None`.
    pub y_limits: Option<(f64, f64)>,
    pub series: Vec<Series>,
    pub horizontal_lines: Vec<HorizontalLine>,
    pub bands: Vec<Band>,
    pub annotations: Vec<Annotation>,
    /// Legend corner; no legend is drawn when `None` or when nothing is labelled.
    pub legend: Option<LegendPosition>,
}

impl Axes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_x_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.x_label = Some(label.into());
        self
    }

    pub fn set_y_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.y_label = Some(label.into());
        self
    }

    pub fn set_x_limits(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_limits = Some((min, max));
        self
    }

    pub fn set_y_limits(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_limits = Some((min, max));
        self
    }

    pub fn set_legend(&mut self, position: LegendPosition) -> &mut Self {
        self.legend = Some(position);
        self
    }

    /// Polyline through `points`.
    pub fn line(
        &mut self,
        points: Vec<(f64, f64)>,
        color: RGBColor,
        style: LineStyle,
        label: Option<String>,
    ) -> &mut Self {
        self.series.push(Series {
            label,
            points,
            color,
            mark: Mark::Line(style),
        });
        self
    }

    /// Filled circles at `points`.
    pub fn scatter(
        &mut self,
        points: Vec<(f64, f64)>,
        color: RGBColor,
        radius: u32,
        label: Option<String>,
    ) -> &mut Self {
        self.series.push(Series {
            label,
            points,
            color,
            mark: Mark::Scatter { radius },
        });
        self
    }

    pub fn horizontal_line(
        &mut self,
        y: f64,
        color: RGBColor,
        style: LineStyle,
        label: Option<String>,
    ) -> &mut Self {
        self.horizontal_lines.push(HorizontalLine {
            y,
            label,
            color,
            style,
        });
        self
    }

    pub fn band(&mut self, points: Vec<(f64, f64, f64)>, color: RGBColor) -> &mut Self {
        self.bands.push(Band { points, color });
        self
    }

    pub fn annotate(&mut self, text: impl Into<String>, x: f64, y: f64) -> &mut Self {
        self.annotate_anchored(text, x, y, TextAnchor::Bottom)
    }

    pub fn annotate_anchored(
        &mut self,
        text: impl Into<String>,
        x: f64,
        y: f64,
        anchor: TextAnchor,
    ) -> &mut Self {
        self.annotations.push(Annotation {
            text: text.into(),
            x,
            y,
            anchor,
        });
        self
    }

    /// Ranges actually used for drawing: the limits if set, the padded data extent otherwise.
    #[must_use]
    pub fn ranges(&self) -> ((f64, f64), (f64, f64)) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for s in &self.series {
            xs.extend(s.points.iter().map(|p| p.0));
            ys.extend(s.points.iter().map(|p| p.1));
        }
        for band in &self.bands {
            xs.extend(band.points.iter().map(|p| p.0));
            ys.extend(band.points.iter().flat_map(|p| [p.1, p.2]));
        }
        ys.extend(self.horizontal_lines.iter().map(|l| l.y));

        let x = self.x_limits.unwrap_or_else(|| padded_extent(&xs));
        let y = self.y_limits.unwrap_or_else(|| padded_extent(&ys));
        (x, y)
    }

    /// Renders onto `area`.
    pub fn draw<DB>(
        &self,
        area: &DrawingArea<DB, Shift>,
        settings: &PlotSettings,
    ) -> Result<(), RenderError>
    where
        DB: DrawingBackend,
    {
        let family = settings.font_family.as_str();
        let text_style = (family, settings.font_size).into_font().color(&BLACK);
        let ((x0, x1), (y0, y1)) = self.ranges();

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60);
        if let Some(title) = &self.title {
            builder.caption(title, (family, settings.title_font_size).into_font());
        }
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(draw_error)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .label_style(text_style.clone())
            .axis_desc_style(text_style.clone());
        if let Some(label) = &self.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &self.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw().map_err(draw_error)?;

        for band in &self.bands {
            let mut outline = band
                .points
                .iter()
                .map(|&(x, _, upper)| (x, upper))
                .collect::<Vec<_>>();
            outline.extend(band.points.iter().rev().map(|&(x, lower, _)| (x, lower)));
            chart
                .draw_series(std::iter::once(Polygon::new(
                    outline,
                    band.color.mix(BAND_OPACITY).filled(),
                )))
                .map_err(draw_error)?;
        }

        let mut labelled = false;
        for line in &self.horizontal_lines {
            let points = vec![(x0, line.y), (x1, line.y)];
            let style = line.color.stroke_width(LINE_WIDTH);
            let anno = match line.style {
                LineStyle::Solid => chart.draw_series(LineSeries::new(points, style)),
                LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(
                    points,
                    DASH_SIZE,
                    DASH_SPACING,
                    style,
                )),
            }
            .map_err(draw_error)?;
            if let Some(label) = &line.label {
                anno.label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x - 8, y), (x + 8, y)], style));
                labelled = true;
            }
        }

        for s in &self.series {
            let style = s.color.stroke_width(LINE_WIDTH);
            let anno = match s.mark {
                Mark::Line(LineStyle::Solid) => {
                    chart.draw_series(LineSeries::new(s.points.clone(), style))
                }
                Mark::Line(LineStyle::Dashed) => chart.draw_series(DashedLineSeries::new(
                    s.points.clone(),
                    DASH_SIZE,
                    DASH_SPACING,
                    style,
                )),
                Mark::Scatter { radius } => chart.draw_series(
                    s.points
                        .iter()
                        .map(|&p| Circle::new(p, radius, s.color.filled())),
                ),
            }
            .map_err(draw_error)?;
            if let Some(label) = &s.label {
                let color = s.color;
                match s.mark {
                    Mark::Line(_) => {
                        anno.label(label.as_str()).legend(move |(x, y)| {
                            PathElement::new(vec![(x - 8, y), (x + 8, y)], style)
                        });
                    }
                    Mark::Scatter { radius } => {
                        anno.label(label.as_str())
                            .legend(move |(x, y)| Circle::new((x, y), radius, color.filled()));
                    }
                }
                labelled = true;
            }
        }

        for annotation in &self.annotations {
            let x = x0 + annotation.x * (x1 - x0);
            let y = y0 + annotation.y * (y1 - y0);
            let v_pos = match annotation.anchor {
                TextAnchor::Bottom => VPos::Bottom,
                TextAnchor::Top => VPos::Top,
            };
            let style = text_style.clone().pos(Pos::new(HPos::Left, v_pos));
            chart
                .draw_series(std::iter::once(Text::new(
                    annotation.text.clone(),
                    (x, y),
                    style,
                )))
                .map_err(draw_error)?;
        }

        if let (Some(position), true) = (self.legend, labelled) {
            chart
                .configure_series_labels()
                .position(position.into())
                .label_font(text_style.clone())
                .background_style(WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(draw_error)?;
        }

        Ok(())
    }
}

fn padded_extent(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span == 0.0 {
        return (min - 0.5, max + 0.5);
    }
    (min - span * RANGE_PADDING, max + span * RANGE_PADDING)
}
