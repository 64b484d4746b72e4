//! CSV export of a [`TimeFrame`] into the project data folder.

use std::env;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::TimeFrame;

/// Timestamp layout for the index column.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header of the index column when it is written.
const INDEX_HEADER: &str = "time";

/// Errors raised while exporting a frame.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create \"{path}\": {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write \"{path}\": {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot determine project root: {0}")]
    ProjectRoot(io::Error),
}

/// Where and how [`save_csv`] writes.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Folder under the project root.
    pub folder: PathBuf,
    /// Defaults to the parent of the current directory.
    pub project_root: Option<PathBuf>,
    /// Write the timestamp index as the first column.
    pub index: bool,
    /// Field delimiter.
    pub sep: u8,
    /// Create missing parent directories.
    pub create_dirs: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("Data"),
            project_root: None,
            index: false,
            sep: b',',
            create_dirs: true,
        }
    }
}

/// Saves `frame` to `project_root/folder/filename` and returns that path.
///
/// # Errors
///
/// Returns an [`ExportError`] if the project root cannot be resolved, a
/// directory cannot be created, or writing fails.
pub fn save_csv(frame: &TimeFrame, filename: &str, opts: &SaveOptions) -> Result<PathBuf, ExportError> {
    let root = match &opts.project_root {
        Some(root) => root.clone(),
        None => default_project_root()?,
    };
    let full_path = root.join(&opts.folder).join(filename);

    if opts.create_dirs {
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(&full_path).map_err(|source| ExportError::Write {
        path: full_path.clone(),
        source,
    })?;
    write_csv(frame, io::BufWriter::new(file), opts.index, opts.sep)?;

    tracing::info!(path = %full_path.display(), rows = frame.len(), "dataset saved");
    Ok(full_path)
}

/// Writes `frame` as CSV to any writer. `NaN` cells are written empty.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if writing fails.
pub fn write_csv(frame: &TimeFrame, writer: impl Write, index: bool, sep: u8) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(sep).from_writer(writer);

    let mut header: Vec<&str> = Vec::with_capacity(frame.columns().len() + 1);
    if index {
        header.push(INDEX_HEADER);
    }
    header.extend(frame.columns().iter().map(String::as_str));
    wtr.write_record(&header)?;

    let columns: Vec<&[f64]> = frame
        .columns()
        .iter()
        .filter_map(|c| frame.column(c))
        .collect();

    for (row, ts) in frame.index().iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        if index {
            record.push(ts.format(TIME_FORMAT).to_string());
        }
        record.extend(columns.iter().map(|col| format_cell(col[row])));
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn format_cell(v: f64) -> String {
    if v.is_nan() { String::new() } else { v.to_string() }
}

fn default_project_root() -> Result<PathBuf, ExportError> {
    let cwd = env::current_dir().map_err(ExportError::ProjectRoot)?;
    Ok(cwd.parent().map_or_else(|| cwd.clone(), Path::to_path_buf))
}
