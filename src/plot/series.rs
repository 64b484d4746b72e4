//! Time-indexed charts: windowed lines, stacked areas, and single-day views.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use plotters::prelude::*;

use super::{ChartSize, PlotError, palette, render_error, value_range, wrap_svg};
use crate::data::features::stack;
use crate::data::{FrameSlice, TimeFrame};

/// A column to plot and the name shown in the legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub column: String,
    pub name: String,
}

impl Series {
    /// Series labelled with its own column name.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            column,
        }
    }

    /// Series with a display name distinct from the column.
    pub fn named(column: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            name: name.into(),
        }
    }
}

impl From<&str> for Series {
    fn from(column: &str) -> Self {
        Self::new(column)
    }
}

impl From<&String> for Series {
    fn from(column: &String) -> Self {
        Self::new(column.as_str())
    }
}

/// Options for [`time_series`].
#[derive(Debug, Clone)]
pub struct TimeSeriesOptions {
    pub title: String,
    pub y_label: String,
    /// Draw cumulative filled areas instead of independent lines.
    pub stacked: bool,
    /// Days before the last timestamp to include.
    pub days: i64,
    pub size: ChartSize,
}

impl Default for TimeSeriesOptions {
    fn default() -> Self {
        Self {
            title: "Time Series".to_string(),
            y_label: "Value".to_string(),
            stacked: false,
            days: 3,
            size: ChartSize::default(),
        }
    }
}

/// Plots `series` over the last `opts.days` days of the frame.
///
/// # Errors
///
/// Returns [`PlotError::EmptySelection`] for no series,
/// [`PlotError::UnknownColumn`] for a missing column, and
/// [`PlotError::EmptyWindow`] when the window holds no rows.
pub fn time_series(
    frame: &TimeFrame,
    series: &[Series],
    opts: &TimeSeriesOptions,
) -> Result<String, PlotError> {
    check_columns(frame, series.iter().map(|s| s.column.as_str()))?;
    let layout = Layout {
        title: &opts.title,
        y_label: &opts.y_label,
        time_format: "%m-%d %H:%M",
        size: opts.size,
    };
    let fill = if opts.stacked {
        Fill::Stacked { line_width: 2 }
    } else {
        Fill::Lines
    };
    render_timeline(&frame.last_days(opts.days), series, &layout, fill)
}

/// Stacked generation mix over the last `days` days.
///
/// `days` is clamped into the dataset's span. Missing values count as zero.
///
/// # Errors
///
/// Same conditions as [`time_series`].
pub fn composition(
    frame: &TimeFrame,
    columns: &[String],
    days: i64,
    title: &str,
    size: ChartSize,
) -> Result<String, PlotError> {
    check_columns(frame, columns.iter().map(String::as_str))?;
    let series: Vec<Series> = columns.iter().map(Series::from).collect();
    let (window, days) = frame.composition_window(days);
    tracing::debug!(days, rows = window.len(), "composition window");
    let layout = Layout {
        title,
        y_label: "Power (MW)",
        time_format: "%m-%d %H:%M",
        size,
    };
    render_timeline(&window, &series, &layout, Fill::Stacked { line_width: 1 })
}

/// Lines for every column over a single calendar day.
///
/// The default title is `Time Series for {date}`.
///
/// # Errors
///
/// Same conditions as [`time_series`]; a date outside the data is
/// [`PlotError::EmptyWindow`].
pub fn day(
    frame: &TimeFrame,
    date: NaiveDate,
    columns: &[String],
    title: Option<&str>,
    y_label: &str,
    size: ChartSize,
) -> Result<String, PlotError> {
    check_columns(frame, columns.iter().map(String::as_str))?;
    let series: Vec<Series> = columns.iter().map(Series::from).collect();
    let title = title.map_or_else(|| format!("Time Series for {date}"), str::to_string);
    let layout = Layout {
        title: &title,
        y_label,
        time_format: "%H:%M",
        size,
    };
    render_timeline(&frame.day(date), &series, &layout, Fill::Lines)
}

pub(crate) fn check_columns<'a>(
    frame: &TimeFrame,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<(), PlotError> {
    let mut any = false;
    for c in columns {
        any = true;
        if !frame.has_column(c) {
            return Err(PlotError::UnknownColumn(c.to_string()));
        }
    }
    if any {
        Ok(())
    } else {
        Err(PlotError::EmptySelection)
    }
}

struct Layout<'a> {
    title: &'a str,
    y_label: &'a str,
    time_format: &'static str,
    size: ChartSize,
}

#[derive(Debug, Clone, Copy)]
enum Fill {
    Lines,
    Stacked { line_width: u32 },
}

impl Fill {
    fn line_width(self) -> u32 {
        match self {
            Self::Lines => 2,
            Self::Stacked { line_width } => line_width,
        }
    }
}

fn render_timeline(
    window: &FrameSlice<'_>,
    series: &[Series],
    layout: &Layout<'_>,
    fill: Fill,
) -> Result<String, PlotError> {
    if window.is_empty() {
        return Err(PlotError::EmptyWindow);
    }

    let index = window.index();
    let origin = index[0];
    let xs: Vec<f64> = index.iter().map(|t| hours_since(origin, *t)).collect();

    let columns = series
        .iter()
        .map(|s| {
            window
                .column(&s.column)
                .ok_or_else(|| PlotError::UnknownColumn(s.column.clone()))
        })
        .collect::<Result<Vec<&[f64]>, _>>()?;

    let curves: Vec<Vec<f64>> = match fill {
        Fill::Lines => columns.iter().map(|c| c.to_vec()).collect(),
        Fill::Stacked { .. } => stack(&columns),
    };
    let (y_lo, y_hi) = match fill {
        Fill::Lines => value_range(curves.iter().flatten()),
        Fill::Stacked { .. } => value_range(curves.iter().flatten().chain(std::iter::once(&0.0))),
    };
    let x_hi = xs.last().copied().unwrap_or(0.0);
    let (x_lo, x_hi) = if x_hi > 0.0 { (0.0, x_hi) } else { (-0.5, 0.5) };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (layout.size.width, layout.size.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(layout.title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(render_error)?;

        let time_format = layout.time_format;
        let x_fmt = |x: &f64| {
            (origin + Duration::seconds((x * 3600.0).round() as i64))
                .format(time_format)
                .to_string()
        };
        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc(layout.y_label)
            .x_labels(8)
            .x_label_formatter(&x_fmt)
            .light_line_style(RGBColor(235, 235, 235))
            .draw()
            .map_err(render_error)?;

        let mut lower = vec![0.0; xs.len()];
        for (i, (s, curve)) in series.iter().zip(&curves).enumerate() {
            let color = palette::color(i);
            if let Fill::Stacked { .. } = fill {
                let mut outline: Vec<(f64, f64)> =
                    xs.iter().copied().zip(curve.iter().copied()).collect();
                outline.extend(xs.iter().copied().zip(lower.iter().copied()).rev());
                chart
                    .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.5).filled())))
                    .map_err(render_error)?;
                lower.clone_from(curve);
            }

            let width = fill.line_width();
            chart
                .draw_series(
                    segments(&xs, curve)
                        .into_iter()
                        .map(|seg| PathElement::new(seg, color.stroke_width(width))),
                )
                .map_err(render_error)?
                .label(s.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
        root.present().map_err(render_error)?;
    }

    Ok(wrap_svg(&svg))
}

fn hours_since(origin: NaiveDateTime, t: NaiveDateTime) -> f64 {
    (t - origin).num_seconds() as f64 / 3600.0
}

/// Splits a curve into runs of finite points so gaps are not bridged.
fn segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for (&x, &y) in xs.iter().zip(ys) {
        if y.is_finite() {
            run.push((x, y));
        } else if !run.is_empty() {
            out.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        out.push(run);
    }
    out
}
