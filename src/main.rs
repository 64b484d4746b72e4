//! energy-plotter entry point: CLI wiring, config loading, and dispatch.

use std::path::PathBuf;
use std::process;

use energy_plotter::cli::{self, CliOptions, Command};
use energy_plotter::config::AppConfig;
use energy_plotter::data::features::with_time_features;
use energy_plotter::data::loader::load_csv;
use energy_plotter::io::export::{SaveOptions, save_csv};
use energy_plotter::telemetry;

/// Loads the config file (or defaults) and applies CLI overrides.
fn build_config(cli: &CliOptions) -> Result<AppConfig, String> {
    let mut cfg = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path).map_err(|e| e.to_string())?,
        None => AppConfig::default(),
    };
    if let Some(data) = &cli.data {
        cfg.data.path = data.clone();
    }
    if let Some(bind) = &cli.bind {
        cfg.server.bind = bind.clone();
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(cfg)
}

fn run(cli: &CliOptions) -> Result<(), String> {
    let cfg = build_config(cli)?;

    tracing::info!(path = %cfg.data.path.display(), "loading dataset");
    let frame = load_csv(&cfg.data.path).map_err(|e| e.to_string())?;
    tracing::info!(
        rows = frame.len(),
        columns = frame.columns().len(),
        first = %frame.first_timestamp(),
        last = %frame.last_timestamp(),
        "dataset loaded"
    );

    match cli.command {
        Command::Export => {
            let enriched = with_time_features(&frame).map_err(|e| e.to_string())?;
            let opts = SaveOptions {
                folder: PathBuf::from(&cli.out_dir),
                project_root: cli.project_root.clone(),
                index: cli.with_index,
                sep: cli.sep,
                ..SaveOptions::default()
            };
            let path = save_csv(&enriched, &cli.file, &opts).map_err(|e| e.to_string())?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Serve => serve(cfg, frame),
    }
}

#[cfg(feature = "api")]
fn serve(cfg: AppConfig, frame: energy_plotter::data::TimeFrame) -> Result<(), String> {
    use std::sync::Arc;

    use energy_plotter::api::{self, AppState};

    let addr = cfg.bind_addr().map_err(|e| e.to_string())?;
    let state = Arc::new(AppState::new(frame, &cfg.data, cfg.chart.clone()));
    tracing::info!(generation = ?state.generation_columns, "generation sources");
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {e}"))?;
    rt.block_on(api::serve(state, addr, &cfg.cors))
        .map_err(|e| format!("server error on {addr}: {e}"))
}

#[cfg(not(feature = "api"))]
fn serve(_cfg: AppConfig, _frame: energy_plotter::data::TimeFrame) -> Result<(), String> {
    Err("this build has no HTTP server; rebuild with the `api` feature".to_string())
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    telemetry::init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
