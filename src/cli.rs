use std::env;
use std::path::PathBuf;

/// Subcommand selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTML front end (default).
    Serve,
    /// Write the dataset plus time features to CSV.
    Export,
}

/// Parsed CLI arguments. Every override is optional so the config file
/// (or built-in defaults) supply what is not given.
#[derive(Debug)]
pub struct CliOptions {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub bind: Option<String>,
    pub out_dir: String,
    pub file: String,
    pub project_root: Option<PathBuf>,
    pub with_index: bool,
    pub sep: u8,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let (command, rest) = match args.first().map(String::as_str) {
        Some("serve") => (Command::Serve, &args[1..]),
        Some("export") => (Command::Export, &args[1..]),
        _ => (Command::Serve, args),
    };

    let mut i = 0usize;
    let mut config = None;
    let mut data = None;
    let mut bind = None;
    let mut out_dir = None;
    let mut file = None;
    let mut project_root = None;
    let mut with_index = false;
    let mut sep = None;

    while i < rest.len() {
        let flag = rest[i].as_str();
        match flag {
            "--config" => {
                i += 1;
                let path = rest.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--data" => {
                i += 1;
                let path = rest.next_or_err(i, "missing value for --data (expected a CSV file path)")?;
                if data.replace(PathBuf::from(path)).is_some() {
                    return Err("--data provided more than once".to_string());
                }
            }
            "--bind" if command == Command::Serve => {
                i += 1;
                let addr = rest.next_or_err(i, "missing value for --bind (expected host:port)")?;
                if bind.replace(addr.to_string()).is_some() {
                    return Err("--bind provided more than once".to_string());
                }
            }
            "--out-dir" if command == Command::Export => {
                i += 1;
                let dir = rest.next_or_err(i, "missing value for --out-dir (expected a folder name)")?;
                if out_dir.replace(dir.to_string()).is_some() {
                    return Err("--out-dir provided more than once".to_string());
                }
            }
            "--file" if command == Command::Export => {
                i += 1;
                let name = rest.next_or_err(i, "missing value for --file (expected a file name)")?;
                if file.replace(name.to_string()).is_some() {
                    return Err("--file provided more than once".to_string());
                }
            }
            "--project-root" if command == Command::Export => {
                i += 1;
                let dir = rest.next_or_err(i, "missing value for --project-root (expected a directory)")?;
                if project_root.replace(PathBuf::from(dir)).is_some() {
                    return Err("--project-root provided more than once".to_string());
                }
            }
            "--with-index" if command == Command::Export => {
                if with_index {
                    return Err("--with-index provided more than once".to_string());
                }
                with_index = true;
            }
            "--sep" if command == Command::Export => {
                i += 1;
                let raw = rest.next_or_err(i, "missing value for --sep (expected one character)")?;
                let byte = parse_sep(raw)?;
                if sep.replace(byte).is_some() {
                    return Err("--sep provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(CliOptions {
        command,
        config,
        data,
        bind,
        out_dir: out_dir.unwrap_or_else(|| "Data".to_string()),
        file: file.unwrap_or_else(|| "energy_features.csv".to_string()),
        project_root,
        with_index,
        sep: sep.unwrap_or(b','),
    })
}

fn parse_sep(raw: &str) -> Result<u8, String> {
    let value = if raw == "\\t" { "\t" } else { raw };
    match value.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("--sep expects a single ASCII character, got \"{raw}\"")),
    }
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("energy-plotter: explore an hourly electricity dataset in the browser");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  energy-plotter [serve] [--config <path>] [--data <csv>] [--bind <host:port>]");
    eprintln!(
        "  energy-plotter export [--config <path>] [--data <csv>] [--out-dir <dir>] [--file <name>]"
    );
    eprintln!("                        [--project-root <dir>] [--with-index] [--sep <char>]");
    eprintln!();
    eprintln!("Logging is controlled with RUST_LOG (default: info).");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_serves_with_defaults() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert_eq!(opts.command, Command::Serve);
        assert!(opts.config.is_none());
        assert!(opts.bind.is_none());
    }

    #[test]
    fn serve_flags_without_subcommand() {
        let opts = parse_args_from(args(&["--bind", "127.0.0.1:9000", "--data", "x.csv"]))
            .expect("parse should succeed");
        assert_eq!(opts.command, Command::Serve);
        assert_eq!(opts.bind.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(opts.data.as_deref().and_then(|p| p.to_str()), Some("x.csv"));
    }

    #[test]
    fn export_defaults() {
        let opts = parse_args_from(args(&["export"])).expect("parse should succeed");
        assert_eq!(opts.command, Command::Export);
        assert_eq!(opts.out_dir, "Data");
        assert_eq!(opts.file, "energy_features.csv");
        assert!(!opts.with_index);
        assert_eq!(opts.sep, b',');
    }

    #[test]
    fn export_flags() {
        let opts = parse_args_from(args(&[
            "export",
            "--out-dir",
            "out",
            "--file",
            "f.csv",
            "--with-index",
            "--sep",
            ";",
            "--project-root",
            "/tmp/p",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.out_dir, "out");
        assert_eq!(opts.file, "f.csv");
        assert!(opts.with_index);
        assert_eq!(opts.sep, b';');
        assert_eq!(opts.project_root.as_deref().and_then(|p| p.to_str()), Some("/tmp/p"));
    }

    #[test]
    fn tab_separator_escape() {
        let opts = parse_args_from(args(&["export", "--sep", "\\t"])).expect("parse should succeed");
        assert_eq!(opts.sep, b'\t');
    }

    #[test]
    fn rejects_repeated_flag() {
        let err = parse_args_from(args(&["--data", "a.csv", "--data", "b.csv"])).unwrap_err();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn rejects_export_flag_on_serve() {
        let err = parse_args_from(args(&["serve", "--with-index"])).unwrap_err();
        assert_eq!(err, "unknown argument: --with-index");
    }

    #[test]
    fn rejects_missing_value() {
        let err = parse_args_from(args(&["--bind"])).unwrap_err();
        assert!(err.starts_with("missing value for --bind"));
    }

    #[test]
    fn rejects_multichar_separator() {
        assert!(parse_args_from(args(&["export", "--sep", ";;"])).is_err());
    }
}
