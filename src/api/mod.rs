//! HTTP front end: HTML forms and chart pages over the loaded dataset.
//!
//! GET endpoints serve forms, POST endpoints render charts:
//! - `/days_form` → `/plot`: columns over the last N days
//! - `/avg_form` → `/avg_plot`: column means by calendar feature
//! - `/composition_form` → `/composition_plot`: stacked generation mix
//! - `/day_form` → `/day_plot`: columns over one calendar day
//!
//! `/health` reports dataset dimensions as JSON.

pub mod error;
mod handlers;
mod pages;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ChartConfig, CorsConfig, DataConfig};
use crate::data::TimeFrame;
use crate::data::features::generation_columns;

/// Immutable application state shared across all request handlers.
///
/// Built once after the dataset is loaded and wrapped in `Arc`; no locks
/// are needed since nothing is mutated while serving.
pub struct AppState {
    /// Loaded dataset.
    pub frame: TimeFrame,
    /// Columns offered by the forms (the CSV columns as loaded).
    pub columns: Vec<String>,
    /// Per-source generation columns offered by the composition form.
    pub generation_columns: Vec<String>,
    /// Chart rendering defaults.
    pub chart: ChartConfig,
}

impl AppState {
    /// Derives the form column lists from `frame` and the data conventions.
    pub fn new(frame: TimeFrame, data: &DataConfig, chart: ChartConfig) -> Self {
        let columns = frame.columns().to_vec();
        let generation_columns =
            generation_columns(&columns, &data.generation_prefix, &data.excluded_generation);
        Self {
            frame,
            columns,
            generation_columns,
            chart,
        }
    }
}

/// Builds the axum router with all routes and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/days_form", get(handlers::days_form))
        .route("/avg_form", get(handlers::avg_form))
        .route("/composition_form", get(handlers::composition_form))
        .route("/day_form", get(handlers::day_form))
        .route("/plot", post(handlers::plot))
        .route("/avg_plot", post(handlers::avg_plot))
        .route("/composition_plot", post(handlers::composition_plot))
        .route("/day_plot", post(handlers::day_plot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer admitting the configured origins with credentials.
///
/// An entry ending in `:*` admits that scheme and host on any port.
/// Methods and headers mirror the preflight request.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let patterns = cfg.allowed_origins.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|o| patterns.iter().any(|p| origin_matches(p, o)))
        }))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Whether `origin` is admitted by `pattern`.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix(":*") {
        Some(base) => {
            origin == base
                || origin
                    .strip_prefix(base)
                    .and_then(|rest| rest.strip_prefix(':'))
                    .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
        }
        None => origin == pattern,
    }
}

/// Binds to `addr` and serves until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr, cors: &CorsConfig) -> std::io::Result<()> {
    let app = router(state).layer(cors_layer(cors));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "plotter listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::telemetry::shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_origin_match() {
        assert!(origin_matches("https://saricmilos.com", "https://saricmilos.com"));
        assert!(!origin_matches("https://saricmilos.com", "https://evil.com"));
        assert!(!origin_matches("https://saricmilos.com", "http://saricmilos.com"));
    }

    #[test]
    fn wildcard_port_match() {
        assert!(origin_matches("http://localhost:*", "http://localhost:3000"));
        assert!(origin_matches("http://localhost:*", "http://localhost"));
        assert!(!origin_matches("http://localhost:*", "http://localhost:"));
        assert!(!origin_matches("http://localhost:*", "http://localhost:80abc"));
        assert!(!origin_matches("http://localhost:*", "http://localhost.evil.com:80"));
        assert!(!origin_matches("http://localhost:*", "https://localhost:3000"));
    }
}
