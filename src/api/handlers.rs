//! Request handlers for the form and chart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use axum_extra::extract::Form;
use chrono::NaiveDate;

use super::AppState;
use super::error::ApiError;
use super::pages;
use super::types::{AvgForm, CompositionForm, DayForm, HealthResponse, PlotForm};
use crate::data::TimeFeature;
use crate::plot::{self, AverageOptions, Marker, PlotError, Series, TimeSeriesOptions, palette};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `GET /` → landing page.
pub async fn index() -> Html<String> {
    Html(pages::index())
}

/// `GET /health` → dataset dimensions.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rows: state.frame.len(),
        columns: state.columns.len(),
        first: state.frame.first_timestamp().format(TIMESTAMP_FORMAT).to_string(),
        last: state.frame.last_timestamp().format(TIMESTAMP_FORMAT).to_string(),
    })
}

/// `GET /days_form` → column picker with days defaulting to the full span.
pub async fn days_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::days_form(&state.columns, state.frame.span_days()))
}

/// `GET /avg_form` → column and time-feature picker.
pub async fn avg_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::avg_form(&state.columns))
}

/// `GET /composition_form` → generation sources, all pre-selected.
pub async fn composition_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::composition_form(
        &state.generation_columns,
        state.chart.composition_default_days,
        state.frame.span_days(),
    ))
}

/// `GET /day_form` → column picker and a date bounded by the data.
pub async fn day_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::day_form(
        &state.columns,
        state.frame.first_timestamp().date(),
        state.frame.last_timestamp().date(),
    ))
}

/// `POST /plot` → columns over the last `days` days, optionally stacked.
pub async fn plot(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PlotForm>,
) -> Result<Html<String>, ApiError> {
    let columns = require_columns(form.columns, "columns")?;
    let days = parse_days(form.days.as_deref(), state.chart.default_days)?;
    if days < 1 {
        return Err(ApiError::BadRequest(format!("days must be >= 1, got {days}")));
    }
    let title = columns.join(", ");
    tracing::info!(?columns, days, stacked = form.stacked.is_some(), "time series");

    let opts = TimeSeriesOptions {
        title: title.clone(),
        y_label: "MW".to_string(),
        stacked: form.stacked.is_some(),
        days,
        size: state.chart.size(),
    };
    let chart = render(state, move |s| {
        let series: Vec<Series> = columns.iter().map(Series::from).collect();
        plot::time_series(&s.frame, &series, &opts)
    })
    .await?;
    Ok(Html(pages::chart("/days_form", &title, &chart)))
}

/// `POST /avg_plot` → column means grouped by a calendar feature.
pub async fn avg_plot(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AvgForm>,
) -> Result<Html<String>, ApiError> {
    let columns = require_columns(form.columns_avg, "columns_avg")?;
    let feature: TimeFeature = form
        .time_feature
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("missing field \"time_feature\"".to_string()))?
        .parse()
        .map_err(|e: crate::data::features::UnknownFeature| ApiError::BadRequest(e.to_string()))?;
    let title = columns.join(", ");
    tracing::info!(?columns, %feature, "average by time feature");

    let markers = parse_list(form.markers.as_deref(), |m| m.parse::<Marker>())?;
    let colors = parse_list(form.colors.as_deref(), |c| {
        palette::parse_hex(c).ok_or_else(|| format!("colour \"{c}\" is not #RRGGBB"))
    })?;

    let opts = AverageOptions {
        title: Some(title.clone()),
        y_label: Some("MW".to_string()),
        markers,
        colors,
        size: state.chart.size(),
    };
    let chart = render(state, move |s| plot::average_by(&s.frame, &columns, feature, &opts)).await?;
    Ok(Html(pages::chart("/avg_form", &title, &chart)))
}

/// `POST /composition_plot` → stacked generation mix.
///
/// Names that are not generation sources are dropped; if none remain the
/// response is an informational page rather than an error.
pub async fn composition_plot(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CompositionForm>,
) -> Result<Html<String>, ApiError> {
    let columns: Vec<String> = form
        .columns_comp
        .into_iter()
        .filter(|c| state.generation_columns.contains(c))
        .collect();
    if columns.is_empty() {
        return Ok(Html(pages::message(
            "/composition_form",
            "No valid generation columns selected.",
        )));
    }
    let days = parse_days(form.days.as_deref(), state.chart.default_days)?;
    tracing::info!(?columns, days, "generation composition");

    let size = state.chart.size();
    let chart = render(state, move |s| {
        plot::composition(&s.frame, &columns, days, "Generation Composition", size)
    })
    .await?;
    Ok(Html(pages::chart("/composition_form", "Generation Composition", &chart)))
}

/// `POST /day_plot` → columns over one calendar day.
pub async fn day_plot(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DayForm>,
) -> Result<Html<String>, ApiError> {
    let columns = require_columns(form.columns_day, "columns_day")?;
    let raw = form
        .date
        .ok_or_else(|| ApiError::BadRequest("missing field \"date\"".to_string()))?;
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("date \"{raw}\" is not YYYY-MM-DD")))?;
    tracing::info!(?columns, %date, "single day");

    let size = state.chart.size();
    let chart = render(state, move |s| plot::day(&s.frame, date, &columns, None, "MW", size)).await?;
    Ok(Html(pages::chart("/day_form", &format!("Time Series for {date}"), &chart)))
}

/// Runs a renderer on the blocking pool; SVG generation is CPU-bound.
async fn render<F>(state: Arc<AppState>, f: F) -> Result<String, ApiError>
where
    F: FnOnce(&AppState) -> Result<String, PlotError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal(format!("render task: {e}")))?
        .map_err(ApiError::from)
}

fn require_columns(columns: Vec<String>, field: &str) -> Result<Vec<String>, ApiError> {
    if columns.is_empty() {
        Err(ApiError::BadRequest(format!("select at least one column (field \"{field}\")")))
    } else {
        Ok(columns)
    }
}

/// Splits a comma-separated override list; absent or blank means `None`.
fn parse_list<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<Vec<T>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse(item).map_err(ApiError::BadRequest))
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

/// Parses an optional day count; absent or blank means `default`.
fn parse_days(raw: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest(format!("days \"{s}\" is not an integer"))),
    }
}
