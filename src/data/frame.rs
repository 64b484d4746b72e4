//! Column-oriented table indexed by timezone-naive timestamps.

use std::collections::HashSet;
use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::DataError;

/// In-memory dataset with a sorted timestamp index.
///
/// Values are stored per column; missing or non-numeric cells are `NaN`.
/// Rows are sorted ascending by timestamp on construction, so every time
/// window is a contiguous row range.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use energy_plotter::data::TimeFrame;
///
/// let t0 = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let t1 = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap().and_hms_opt(1, 0, 0).unwrap();
/// let frame = TimeFrame::new(
///     vec![t1, t0],
///     vec!["price".to_string()],
///     vec![vec![2.0, 1.0]],
/// )
/// .unwrap();
/// assert_eq!(frame.column("price"), Some(&[1.0, 2.0][..]));
/// ```
#[derive(Debug, Clone)]
pub struct TimeFrame {
    index: Vec<NaiveDateTime>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl TimeFrame {
    /// Builds a frame, validating its shape and sorting rows by timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Empty`] for zero rows, [`DataError::ShapeMismatch`]
    /// when a column length differs from the index length, and
    /// [`DataError::DuplicateColumn`] when two columns share a name.
    pub fn new(
        index: Vec<NaiveDateTime>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, DataError> {
        if index.is_empty() {
            return Err(DataError::Empty);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }

        if values.len() != columns.len() {
            return Err(DataError::ShapeMismatch {
                column: "<columns>".to_string(),
                expected: columns.len(),
                found: values.len(),
            });
        }
        for (name, col) in columns.iter().zip(&values) {
            if col.len() != index.len() {
                return Err(DataError::ShapeMismatch {
                    column: name.clone(),
                    expected: index.len(),
                    found: col.len(),
                });
            }
        }

        let mut frame = Self {
            index,
            columns,
            values,
        };
        frame.sort_by_time();
        Ok(frame)
    }

    fn sort_by_time(&mut self) {
        if self.index.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        let mut order: Vec<usize> = (0..self.index.len()).collect();
        order.sort_by_key(|&i| self.index[i]);
        self.index = order.iter().map(|&i| self.index[i]).collect();
        for col in &mut self.values {
            *col = order.iter().map(|&i| col[i]).collect();
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false for a constructed frame; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Sorted timestamp index.
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Returns the values of a column, or `None` if it does not exist.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Earliest timestamp.
    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.index[0]
    }

    /// Latest timestamp.
    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.index[self.index.len() - 1]
    }

    /// Whole days between the first and last timestamp, plus one.
    pub fn span_days(&self) -> i64 {
        (self.last_timestamp() - self.first_timestamp()).num_days() + 1
    }

    /// Appends a column, replacing any existing column of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ShapeMismatch`] if `values` does not match the row count.
    pub fn push_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), DataError> {
        if values.len() != self.index.len() {
            return Err(DataError::ShapeMismatch {
                column: name.to_string(),
                expected: self.index.len(),
                found: values.len(),
            });
        }
        match self.columns.iter().position(|c| c == name) {
            Some(i) => self.values[i] = values,
            None => {
                self.columns.push(name.to_string());
                self.values.push(values);
            }
        }
        Ok(())
    }

    /// Full-frame view.
    pub fn all(&self) -> FrameSlice<'_> {
        FrameSlice {
            frame: self,
            rows: 0..self.index.len(),
        }
    }

    /// Rows with timestamp `>= start`.
    pub fn since(&self, start: NaiveDateTime) -> FrameSlice<'_> {
        let lo = self.index.partition_point(|t| *t < start);
        FrameSlice {
            frame: self,
            rows: lo..self.index.len(),
        }
    }

    /// Rows with `start <= timestamp < end`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> FrameSlice<'_> {
        let lo = self.index.partition_point(|t| *t < start);
        let hi = self.index.partition_point(|t| *t < end).max(lo);
        FrameSlice {
            frame: self,
            rows: lo..hi,
        }
    }

    /// Rows from `days` days before the last timestamp onwards (inclusive).
    ///
    /// With hourly data, `last_days(3)` holds `3 * 24 + 1` rows. A
    /// non-positive `days` yields at most the final row or nothing. A
    /// cutoff before the representable date range keeps every row.
    pub fn last_days(&self, days: i64) -> FrameSlice<'_> {
        match TimeDelta::try_days(days).and_then(|d| self.last_timestamp().checked_sub_signed(d)) {
            Some(cutoff) => self.since(cutoff),
            None if days > 0 => self.all(),
            None => self.since(NaiveDateTime::MAX),
        }
    }

    /// Window used by the generation mix plot.
    ///
    /// `days` is clamped into `[1, span_days]`, then rows from
    /// `days - 1` days before the last timestamp onwards are kept.
    /// Returns the window and the clamped day count.
    pub fn composition_window(&self, days: i64) -> (FrameSlice<'_>, i64) {
        let days = days.clamp(1, self.span_days());
        let cutoff = self.last_timestamp() - TimeDelta::days(days - 1);
        (self.since(cutoff), days)
    }

    /// Rows falling on the given calendar day.
    pub fn day(&self, date: NaiveDate) -> FrameSlice<'_> {
        let start = date.and_time(NaiveTime::MIN);
        match start.checked_add_signed(TimeDelta::days(1)) {
            Some(end) => self.between(start, end),
            // last representable day
            None => self.since(start),
        }
    }
}

/// Borrowed contiguous row range of a [`TimeFrame`].
#[derive(Debug, Clone)]
pub struct FrameSlice<'a> {
    frame: &'a TimeFrame,
    rows: Range<usize>,
}

impl<'a> FrameSlice<'a> {
    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the window holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Timestamps in the window.
    pub fn index(&self) -> &'a [NaiveDateTime] {
        &self.frame.index[self.rows.clone()]
    }

    /// Column values restricted to the window.
    pub fn column(&self, name: &str) -> Option<&'a [f64]> {
        let rows = self.rows.clone();
        self.frame.column(name).map(|c| &c[rows])
    }
}
