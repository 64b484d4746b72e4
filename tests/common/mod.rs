//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use energy_plotter::data::TimeFrame;
use energy_plotter::data::loader::load_csv;

/// Five days of hourly sample data, 2018-12-27 through 2018-12-31.
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/energy_sample.csv")
}

/// The sample dataset, loaded.
pub fn sample_frame() -> TimeFrame {
    load_csv(&fixture_path()).expect("fixture should load")
}

/// Per-source generation columns in the sample, in file order.
pub const SAMPLE_GENERATION: &[&str] = &[
    "generation_solar",
    "generation_wind_onshore",
    "generation_fossil_gas",
];

/// Fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("energy-plotter-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir should be created");
    dir
}
