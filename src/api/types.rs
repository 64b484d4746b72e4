//! Form bodies and JSON responses.
//!
//! Multi-select fields arrive as repeated keys (`columns=a&columns=b`).
//! Scalar fields are kept as strings so that missing or malformed values
//! surface as an HTML error page instead of an extractor rejection.

use serde::{Deserialize, Serialize};

/// Body of `POST /plot`.
#[derive(Debug, Deserialize)]
pub struct PlotForm {
    #[serde(default)]
    pub columns: Vec<String>,
    pub days: Option<String>,
    /// Checkbox: present when ticked.
    pub stacked: Option<String>,
}

/// Body of `POST /avg_plot`.
#[derive(Debug, Deserialize)]
pub struct AvgForm {
    #[serde(default)]
    pub columns_avg: Vec<String>,
    pub time_feature: Option<String>,
    /// Comma-separated marker names, one per column.
    pub markers: Option<String>,
    /// Comma-separated `#RRGGBB` colours, one per column.
    pub colors: Option<String>,
}

/// Body of `POST /composition_plot`.
#[derive(Debug, Deserialize)]
pub struct CompositionForm {
    #[serde(default)]
    pub columns_comp: Vec<String>,
    pub days: Option<String>,
}

/// Body of `POST /day_plot`.
#[derive(Debug, Deserialize)]
pub struct DayForm {
    #[serde(default)]
    pub columns_day: Vec<String>,
    pub date: Option<String>,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Dataset rows.
    pub rows: usize,
    /// Dataset columns offered by the forms.
    pub columns: usize,
    /// First timestamp, `%Y-%m-%d %H:%M:%S`.
    pub first: String,
    /// Last timestamp, `%Y-%m-%d %H:%M:%S`.
    pub last: String,
}
