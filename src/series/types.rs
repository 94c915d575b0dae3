//! Core time-series value types: windows, cadences and load series.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::EngineError;

/// Timestamp format used by requests and trace files.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SECONDS_PER_DAY: i64 = 86_400;

/// Half-open calendar window `[start, end)`.
///
/// # Examples
///
/// ```
/// use loadprofile_gen::series::types::TimeRange;
///
/// let range = TimeRange::parse("2010-02-01 00:00:00", "2010-02-03 00:00:00").unwrap();
/// assert_eq!(range.duration().num_hours(), 48);
/// assert!(TimeRange::parse("2010-02-03 00:00:00", "2010-02-01 00:00:00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    /// Creates a window, rejecting `end <= start`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWindow`] if the window is empty or inverted.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, EngineError> {
        if end <= start {
            return Err(EngineError::InvalidWindow(format!(
                "end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds with [`DATE_TIME_FORMAT`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWindow`] on a malformed timestamp or an
    /// empty/inverted window.
    pub fn parse(start: &str, end: &str) -> Result<Self, EngineError> {
        Self::new(parse_bound("start_time", start)?, parse_bound("end_time", end)?)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// True if `ts` lies in `[start, end)`.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format(DATE_TIME_FORMAT),
            self.end.format(DATE_TIME_FORMAT)
        )
    }
}

fn parse_bound(field: &str, raw: &str) -> Result<NaiveDateTime, EngineError> {
    NaiveDateTime::parse_from_str(raw.trim(), DATE_TIME_FORMAT).map_err(|e| {
        EngineError::InvalidWindow(format!(
            "{field} \"{raw}\" is not a valid YYYY-MM-DD HH:MM:SS timestamp: {e}"
        ))
    })
}

/// Fixed resampling bucket width.
///
/// Always positive and an exact divisor of one day, so buckets never straddle
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence(TimeDelta);

impl Cadence {
    /// Creates a cadence from whole minutes.
    ///
    /// Returns `None` if `minutes` is zero or does not divide 1440.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        let secs = i64::from(minutes) * 60;
        if secs == 0 || SECONDS_PER_DAY % secs != 0 {
            return None;
        }
        TimeDelta::try_seconds(secs).map(Self)
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }

    pub fn seconds(&self) -> i64 {
        self.0.num_seconds()
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self(TimeDelta::minutes(15))
    }
}

/// Ordered, time-indexed sequence of non-negative power readings.
///
/// The index is strictly increasing. Every pipeline stage returns a new
/// series rather than mutating its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSeries {
    points: Vec<(NaiveDateTime, f64)>,
}

impl LoadSeries {
    /// Builds a series, checking the index order and value domain.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if timestamps are not strictly
    /// increasing or a value is negative or non-finite.
    pub fn from_points(points: Vec<(NaiveDateTime, f64)>) -> Result<Self, EngineError> {
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(EngineError::InvalidRequest(format!(
                    "series index not strictly increasing at {}",
                    pair[1].0
                )));
            }
        }
        if let Some((ts, v)) = points.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(EngineError::InvalidRequest(format!(
                "series value {v} at {ts} is not a non-negative number"
            )));
        }
        Ok(Self { points })
    }

    /// Builds a series from points already known to satisfy the invariants.
    pub(crate) fn from_sorted(points: Vec<(NaiveDateTime, f64)>) -> Self {
        debug_assert!(points.windows(2).all(|p| p[0].0 < p[1].0));
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(NaiveDateTime, f64)] {
        &self.points
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.points.iter().map(|(ts, _)| *ts)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    /// Value at `ts`, if the index contains it.
    pub fn get(&self, ts: NaiveDateTime) -> Option<f64> {
        self.points
            .binary_search_by_key(&ts, |(t, _)| *t)
            .ok()
            .map(|i| self.points[i].1)
    }

    /// Samples falling inside `range`.
    pub fn window(&self, range: &TimeRange) -> &[(NaiveDateTime, f64)] {
        let lo = self.points.partition_point(|(ts, _)| *ts < range.start());
        let hi = self.points.partition_point(|(ts, _)| *ts < range.end());
        &self.points[lo..hi]
    }

    /// Returns a copy with every timestamp shifted by `delta`.
    pub fn shifted(&self, delta: TimeDelta) -> Self {
        Self {
            points: self.points.iter().map(|(ts, v)| (*ts + delta, *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2010, 2, d)
            .and_then(|date| date.and_hms_opt(h, m, 0))
            .unwrap()
    }

    #[test]
    fn parse_rejects_malformed_timestamp() {
        let err = TimeRange::parse("2010-02-01", "2010-02-03 00:00:00").unwrap_err();
        assert!(matches!(err, EngineError::InvalidWindow(_)));
    }

    #[test]
    fn empty_window_is_invalid() {
        let err = TimeRange::new(ts(1, 0, 0), ts(1, 0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidWindow(_)));
    }

    #[test]
    fn contains_is_half_open() {
        let range = TimeRange::new(ts(1, 0, 0), ts(2, 0, 0)).unwrap();
        assert!(range.contains(ts(1, 0, 0)));
        assert!(range.contains(ts(1, 23, 59)));
        assert!(!range.contains(ts(2, 0, 0)));
    }

    #[test]
    fn cadence_must_divide_a_day() {
        assert!(Cadence::from_minutes(15).is_some());
        assert!(Cadence::from_minutes(60).is_some());
        assert!(Cadence::from_minutes(0).is_none());
        assert!(Cadence::from_minutes(7).is_none());
        assert_eq!(Cadence::default().seconds(), 900);
    }

    #[test]
    fn from_points_rejects_duplicates_and_negatives() {
        assert!(LoadSeries::from_points(vec![(ts(1, 0, 0), 1.0), (ts(1, 0, 0), 2.0)]).is_err());
        assert!(LoadSeries::from_points(vec![(ts(1, 0, 0), -1.0)]).is_err());
        assert!(LoadSeries::from_points(vec![(ts(1, 0, 0), f64::NAN)]).is_err());
    }

    #[test]
    fn window_slices_half_open() {
        let series = LoadSeries::from_points(vec![
            (ts(1, 0, 0), 1.0),
            (ts(1, 12, 0), 2.0),
            (ts(2, 0, 0), 3.0),
        ])
        .unwrap();
        let range = TimeRange::new(ts(1, 0, 0), ts(2, 0, 0)).unwrap();
        let slice = series.window(&range);
        assert_eq!(slice.len(), 2);
        assert_eq!(series.get(ts(1, 12, 0)), Some(2.0));
        assert_eq!(series.get(ts(1, 13, 0)), None);
    }
}
