//! Calendar features, grouped means, and generation column helpers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::{DataError, TimeFrame};

/// Default prefix of per-source generation columns.
pub const GENERATION_PREFIX: &str = "generation_";

/// Derived columns that carry the generation prefix but are not a source.
pub const DERIVED_GENERATION_COLUMNS: &[&str] = &["generation_load_difference", "total_generation"];

/// Calendar feature used to group observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFeature {
    /// Hour of day, 0..=23.
    HourOfDay,
    /// Day of week, Monday = 0 .. Sunday = 6.
    DayOfWeek,
    /// Month of year, 1..=12.
    Month,
}

impl TimeFeature {
    /// All features in form order.
    pub const ALL: [TimeFeature; 3] = [Self::HourOfDay, Self::DayOfWeek, Self::Month];

    /// Column/wire name, e.g. `hour_of_day`.
    pub fn name(self) -> &'static str {
        match self {
            Self::HourOfDay => "hour_of_day",
            Self::DayOfWeek => "day_of_week",
            Self::Month => "month",
        }
    }

    /// Title-cased display name, e.g. `Hour Of Day`.
    pub fn label(self) -> String {
        title_case(&self.name().replace('_', " "))
    }

    /// Feature value for one timestamp.
    pub fn value(self, ts: &NaiveDateTime) -> u32 {
        match self {
            Self::HourOfDay => ts.hour(),
            Self::DayOfWeek => ts.weekday().num_days_from_monday(),
            Self::Month => ts.month(),
        }
    }
}

impl fmt::Display for TimeFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no [`TimeFeature`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time feature \"{0}\", expected one of: hour_of_day, day_of_week, month")]
pub struct UnknownFeature(pub String);

impl FromStr for TimeFeature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Upper-cases the first letter of every whitespace-separated word.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Mean of `values` grouped by `feature` of the matching timestamp.
///
/// Keys are ascending and only keys present in `index` appear. `NaN`
/// values are skipped; a group with no finite values yields `NaN`.
pub fn group_mean(index: &[NaiveDateTime], values: &[f64], feature: TimeFeature) -> Vec<(u32, f64)> {
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (ts, &v) in index.iter().zip(values) {
        let entry = groups.entry(feature.value(ts)).or_insert((0.0, 0));
        if !v.is_nan() {
            entry.0 += v;
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(key, (sum, n))| {
            let mean = if n > 0 { sum / n as f64 } else { f64::NAN };
            (key, mean)
        })
        .collect()
}

/// Generation source columns: names starting with `prefix` that are not excluded.
pub fn generation_columns<S: AsRef<str>>(columns: &[String], prefix: &str, excluded: &[S]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.starts_with(prefix))
        .filter(|c| !excluded.iter().any(|e| e.as_ref() == c.as_str()))
        .cloned()
        .collect()
}

/// Running totals across series for stacked areas.
///
/// `result[k][i]` is the sum of `series[0..=k][i]`, with `NaN` counted as 0.
/// All series must share the length of the first.
pub fn stack(series: &[&[f64]]) -> Vec<Vec<f64>> {
    let len = series.first().map_or(0, |s| s.len());
    let mut running = vec![0.0; len];
    series
        .iter()
        .map(|s| {
            for (acc, v) in running.iter_mut().zip(s.iter()) {
                if !v.is_nan() {
                    *acc += v;
                }
            }
            running.clone()
        })
        .collect()
}

/// Returns a copy of `frame` with `hour_of_day`, `day_of_week`, and `month` appended.
///
/// # Errors
///
/// Propagates [`DataError`] from column insertion (cannot happen for a
/// well-formed frame).
pub fn with_time_features(frame: &TimeFrame) -> Result<TimeFrame, DataError> {
    let mut out = frame.clone();
    for feature in TimeFeature::ALL {
        let col = frame.index().iter().map(|ts| f64::from(feature.value(ts))).collect();
        out.push_column(feature.name(), col)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn start() -> NaiveDateTime {
        // Thursday
        NaiveDate::from_ymd_opt(2015, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn feature_names_round_trip_through_from_str() {
        for feature in TimeFeature::ALL {
            assert_eq!(feature.name().parse::<TimeFeature>(), Ok(feature));
        }
        assert!("minute".parse::<TimeFeature>().is_err());
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(TimeFeature::HourOfDay.label(), "Hour Of Day");
        assert_eq!(TimeFeature::DayOfWeek.label(), "Day Of Week");
        assert_eq!(TimeFeature::Month.label(), "Month");
        assert_eq!(title_case("price actual"), "Price Actual");
    }

    #[test]
    fn feature_values_follow_calendar() {
        let ts = start() + Duration::hours(13);
        assert_eq!(TimeFeature::HourOfDay.value(&ts), 13);
        assert_eq!(TimeFeature::DayOfWeek.value(&ts), 3);
        assert_eq!(TimeFeature::Month.value(&ts), 1);
    }

    #[test]
    fn group_mean_by_hour() {
        // two days, value = hour + 100 * day
        let index: Vec<NaiveDateTime> = (0..48).map(|h| start() + Duration::hours(h)).collect();
        let values: Vec<f64> = (0..48).map(|h| (h % 24) as f64 + 100.0 * (h / 24) as f64).collect();
        let means = group_mean(&index, &values, TimeFeature::HourOfDay);
        assert_eq!(means.len(), 24);
        assert_eq!(means[0], (0, 50.0));
        assert_eq!(means[23], (23, 73.0));
    }

    #[test]
    fn group_mean_skips_nan_and_keeps_empty_groups_as_nan() {
        let index = vec![start(), start() + Duration::hours(1), start() + Duration::hours(25)];
        let values = vec![f64::NAN, 4.0, 2.0];
        let means = group_mean(&index, &values, TimeFeature::HourOfDay);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].0, 0);
        assert!(means[0].1.is_nan());
        assert_eq!(means[1], (1, 3.0));
    }

    #[test]
    fn group_mean_only_present_keys_ascending() {
        let index = vec![
            start() + Duration::days(40),
            start(),
            start() + Duration::days(70),
        ];
        let values = vec![2.0, 1.0, 3.0];
        let means = group_mean(&index, &values, TimeFeature::Month);
        assert_eq!(means, vec![(1, 1.0), (2, 2.0), (3, 3.0)]);
    }

    #[test]
    fn generation_columns_excludes_derived() {
        let columns: Vec<String> = [
            "generation_solar",
            "generation_wind onshore",
            "generation_load_difference",
            "total_generation",
            "total load actual",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let gen_cols = generation_columns(&columns, GENERATION_PREFIX, DERIVED_GENERATION_COLUMNS);
        assert_eq!(gen_cols, vec!["generation_solar", "generation_wind onshore"]);
    }

    #[test]
    fn stack_accumulates_and_zero_fills() {
        let a = [1.0, f64::NAN, 3.0];
        let b = [10.0, 20.0, f64::NAN];
        let stacked = stack(&[&a[..], &b[..]]);
        assert_eq!(stacked[0], vec![1.0, 0.0, 3.0]);
        assert_eq!(stacked[1], vec![11.0, 20.0, 3.0]);
        assert!(stack(&[]).is_empty());
    }

    #[test]
    fn with_time_features_appends_three_columns() {
        let index: Vec<NaiveDateTime> = (0..3).map(|h| start() + Duration::hours(h)).collect();
        let frame = TimeFrame::new(index, vec!["load".to_string()], vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let out = with_time_features(&frame).unwrap();
        assert_eq!(out.columns().len(), 4);
        assert_eq!(out.column("hour_of_day"), Some(&[0.0, 1.0, 2.0][..]));
        assert_eq!(out.column("day_of_week"), Some(&[3.0, 3.0, 3.0][..]));
        assert_eq!(out.column("month"), Some(&[1.0, 1.0, 1.0][..]));
        // source frame untouched
        assert_eq!(frame.columns().len(), 1);
    }
}
