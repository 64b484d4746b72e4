//! Server-side chart rendering to inline SVG.
//!
//! Every renderer returns an HTML fragment (`<div class="chart">…</div>`)
//! ready to be embedded in a page.

pub mod average;
pub mod palette;
pub mod series;

use std::fmt::Display;

use thiserror::Error;

pub use average::{AverageOptions, average_by};
pub use palette::Marker;
pub use series::{Series, TimeSeriesOptions, composition, day, time_series};

/// Chart pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 550,
        }
    }
}

/// Errors raised while preparing or drawing a chart.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A requested column is not in the dataset.
    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),
    /// No columns were requested.
    #[error("no columns selected")]
    EmptySelection,
    /// The requested time window holds no rows.
    #[error("no data in the selected time window")]
    EmptyWindow,
    /// Marker or colour overrides are shorter than the column list.
    #[error("{what} has {found} entries for {expected} columns")]
    StyleLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// The drawing backend failed.
    #[error("render failed: {0}")]
    Render(String),
}

pub(crate) fn render_error(e: impl Display) -> PlotError {
    PlotError::Render(e.to_string())
}

pub(crate) fn wrap_svg(svg: &str) -> String {
    format!("<div class=\"chart\">{svg}</div>")
}

/// Min/max over finite values, padded by 5% (or 1.0 for a flat range).
///
/// Falls back to `0.0..1.0` when nothing is finite.
pub(crate) fn value_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_pads_and_ignores_nan() {
        let (lo, hi) = value_range(&[0.0, f64::NAN, 10.0]);
        assert!((lo + 0.5).abs() < 1e-9);
        assert!((hi - 10.5).abs() < 1e-9);
    }

    #[test]
    fn value_range_handles_flat_and_empty() {
        assert_eq!(value_range(&[3.0, 3.0]), (2.0, 4.0));
        assert_eq!(value_range(&[f64::NAN]), (0.0, 1.0));
        assert_eq!(value_range(&[]), (0.0, 1.0));
    }
}
