//! Averages of columns grouped by a calendar feature.

use plotters::prelude::*;

use super::series::check_columns;
use super::{ChartSize, Marker, PlotError, palette, render_error, value_range, wrap_svg};
use crate::data::TimeFrame;
use crate::data::features::{TimeFeature, group_mean};

/// Options for [`average_by`].
#[derive(Debug, Clone, Default)]
pub struct AverageOptions {
    /// Defaults to `Average {columns} by {feature}`.
    pub title: Option<String>,
    /// Defaults to `Value`.
    pub y_label: Option<String>,
    /// One marker per column; circles when absent.
    pub markers: Option<Vec<Marker>>,
    /// One colour per column; palette order when absent.
    pub colors: Option<Vec<RGBColor>>,
    pub size: ChartSize,
}

/// Line-and-marker chart of each column's mean per `feature` value.
///
/// # Errors
///
/// Returns [`PlotError::EmptySelection`] or [`PlotError::UnknownColumn`]
/// for a bad column list and [`PlotError::StyleLength`] when marker or
/// colour overrides are shorter than the column list.
pub fn average_by(
    frame: &TimeFrame,
    columns: &[String],
    feature: TimeFeature,
    opts: &AverageOptions,
) -> Result<String, PlotError> {
    check_columns(frame, columns.iter().map(String::as_str))?;

    let markers = match &opts.markers {
        Some(m) if m.len() < columns.len() => {
            return Err(PlotError::StyleLength {
                what: "markers",
                expected: columns.len(),
                found: m.len(),
            });
        }
        Some(m) => m.clone(),
        None => vec![Marker::Circle; columns.len()],
    };
    let colors = match &opts.colors {
        Some(c) if c.len() < columns.len() => {
            return Err(PlotError::StyleLength {
                what: "colors",
                expected: columns.len(),
                found: c.len(),
            });
        }
        Some(c) => c.clone(),
        None => (0..columns.len()).map(palette::color).collect(),
    };

    let title = opts
        .title
        .clone()
        .unwrap_or_else(|| format!("Average {} by {}", columns.join(", "), feature));
    let y_label = opts.y_label.as_deref().unwrap_or("Value");

    let groups: Vec<Vec<(i32, f64)>> = columns
        .iter()
        .map(|c| {
            let values = frame.column(c).unwrap_or_default();
            group_mean(frame.index(), values, feature)
                .into_iter()
                .map(|(k, v)| (k as i32, v))
                .collect()
        })
        .collect();

    let keys = groups.iter().flatten().map(|(k, _)| *k);
    let x_lo = keys.clone().min().unwrap_or(0) - 1;
    let x_hi = keys.max().unwrap_or(0) + 1;
    let (y_lo, y_hi) = value_range(groups.iter().flatten().map(|(_, v)| v));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (opts.size.width, opts.size.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(feature.label())
            .y_desc(y_label)
            .x_labels((x_hi - x_lo + 1) as usize)
            .light_line_style(RGBColor(235, 235, 235))
            .draw()
            .map_err(render_error)?;

        for (i, (column, points)) in columns.iter().zip(&groups).enumerate() {
            let color = colors[i];
            let finite: Vec<(i32, f64)> = points.iter().copied().filter(|(_, v)| v.is_finite()).collect();

            chart
                .draw_series(std::iter::once(PathElement::new(finite.clone(), color.stroke_width(2))))
                .map_err(render_error)?
                .label(column.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            let style = color.filled();
            let drawn = match markers[i] {
                Marker::Circle => chart
                    .draw_series(finite.iter().map(|&p| Circle::new(p, 4, style)))
                    .map(|_| ()),
                Marker::Triangle => chart
                    .draw_series(finite.iter().map(|&p| TriangleMarker::new(p, 5, style)))
                    .map(|_| ()),
                Marker::Cross => chart
                    .draw_series(finite.iter().map(|&p| Cross::new(p, 4, color.stroke_width(2))))
                    .map(|_| ()),
                Marker::Square => chart
                    .draw_series(
                        finite
                            .iter()
                            .map(|&p| EmptyElement::at(p) + Rectangle::new([(-4, -4), (4, 4)], style)),
                    )
                    .map(|_| ()),
            };
            drawn.map_err(render_error)?;
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
