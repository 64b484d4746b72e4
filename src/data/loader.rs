//! CSV ingestion into a [`TimeFrame`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{DataError, TimeFrame};

/// Formats carrying a UTC offset. The offset is dropped, keeping wall time.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// Naive datetime formats tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Loads a dataset from a CSV file whose first column is the timestamp index.
///
/// # Errors
///
/// Returns [`DataError::Io`] if the file cannot be opened, or any error
/// from [`read_csv`].
pub fn load_csv(path: &Path) -> Result<TimeFrame, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Reads a dataset from any reader.
///
/// The header row is required; its first field names the index and is
/// discarded. Cells that are empty or not numeric become `NaN`.
///
/// # Errors
///
/// Returns a [`DataError`] for a missing header, zero data rows, an
/// unparsable timestamp, a row with the wrong field count, or a duplicate
/// column name.
pub fn read_csv(reader: impl Read) -> Result<TimeFrame, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(DataError::MissingHeader);
    }
    let columns: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

    let mut index = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = row + 2;
        if record.len() != headers.len() {
            return Err(DataError::RaggedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let raw_ts = &record[0];
        let ts = parse_timestamp(raw_ts).ok_or_else(|| DataError::BadTimestamp {
            line,
            value: raw_ts.to_string(),
        })?;
        index.push(ts);

        for (col, cell) in values.iter_mut().zip(record.iter().skip(1)) {
            col.push(parse_cell(cell));
        }
    }

    TimeFrame::new(index, columns, values)
}

/// Parses a timestamp, discarding any UTC offset but keeping local wall time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Numeric coercion: anything that does not parse as `f64` is `NaN`.
fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    #[test]
    fn parses_offset_timestamps_as_wall_time() {
        assert_eq!(
            parse_timestamp("2015-01-01 00:00:00+01:00"),
            Some(at(2015, 1, 1, 0))
        );
        assert_eq!(
            parse_timestamp("2015-06-01T13:00:00+02:00"),
            Some(at(2015, 6, 1, 13))
        );
    }

    #[test]
    fn parses_naive_and_date_only_timestamps() {
        assert_eq!(parse_timestamp("2015-01-01 05:00:00"), Some(at(2015, 1, 1, 5)));
        assert_eq!(parse_timestamp("2015-01-01T05:00:00"), Some(at(2015, 1, 1, 5)));
        assert_eq!(parse_timestamp("2015-01-01 05:00"), Some(at(2015, 1, 1, 5)));
        assert_eq!(parse_timestamp("2015-01-01"), Some(at(2015, 1, 1, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reads_columns_and_coerces_missing_values() {
        let csv = "time,generation_solar,price actual\n\
                   2015-01-01 01:00:00+01:00,10,50.5\n\
                   2015-01-01 00:00:00+01:00,,abc\n";
        let frame = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            frame.columns(),
            &["generation_solar".to_string(), "price actual".to_string()]
        );
        assert_eq!(frame.len(), 2);
        // sorted: the 00:00 row comes first
        let solar = frame.column("generation_solar").unwrap();
        assert!(solar[0].is_nan());
        assert_eq!(solar[1], 10.0);
        let price = frame.column("price actual").unwrap();
        assert!(price[0].is_nan());
        assert_eq!(price[1], 50.5);
    }

    #[test]
    fn reports_bad_timestamp_line() {
        let csv = "time,a\n2015-01-01 00:00:00,1\nnot-a-date,2\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::BadTimestamp { line: 3, .. }));
    }

    #[test]
    fn reports_ragged_row() {
        let csv = "time,a,b\n2015-01-01 00:00:00,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataError::RaggedRow {
                line: 2,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn header_only_is_empty() {
        let err = read_csv("time,a\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv(Path::new("/nonexistent/energy.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/energy.csv"));
    }
}
