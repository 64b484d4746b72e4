//! Electricity generation dataset explorer: CSV loading, time features,
//! SVG charts, and an HTML form front end.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// Time-indexed dataset, CSV loading, and derived features.
pub mod data;
pub mod io;
/// Chart rendering to SVG.
pub mod plot;
pub mod telemetry;
