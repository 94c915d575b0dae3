//! Maps calendar windows onto the single reference year of the trace data.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;

use super::types::TimeRange;
use crate::error::EngineError;

/// What to do with Feb 29 when the reference year has no leap day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeapDayPolicy {
    /// Serve Feb 29 with the data of Feb 28, keeping the Feb 29 date.
    #[default]
    Clamp,
    /// Fail with [`EngineError::DateMapping`].
    Reject,
}

/// A piece of the requested window together with the reference-year span
/// whose data fills it.
///
/// Both ranges have the same length and the same time of day at their
/// start, so `reference + offset() == requested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedSegment {
    pub requested: TimeRange,
    pub reference: TimeRange,
}

impl MappedSegment {
    /// Shift that moves reference-year timestamps back into the requested span.
    pub fn offset(&self) -> TimeDelta {
        self.requested.start() - self.reference.start()
    }
}

/// Substitutes the reference year into a requested window.
///
/// Month, day and time of day are preserved. Each requested calendar day is
/// served by the same day of the reference year; consecutive days whose
/// reference days are also consecutive are merged into one segment. Under
/// [`LeapDayPolicy::Clamp`] a requested Feb 29 is served by Feb 28 of the
/// reference year but keeps its own date, so output never leaves the
/// requested window.
///
/// A window must sit inside one calendar year; an `end` of exactly midnight
/// on Jan 1 of the following year is accepted.
///
/// # Examples
///
/// ```
/// use loadprofile_gen::series::types::TimeRange;
/// use loadprofile_gen::series::window::{LeapDayPolicy, WindowMapper};
///
/// let mapper = WindowMapper::new(2010, LeapDayPolicy::Clamp);
/// let requested = TimeRange::parse("2023-07-01 06:00:00", "2023-07-02 06:00:00").unwrap();
/// let segments = mapper.map(&requested).unwrap();
/// assert_eq!(segments.len(), 1);
/// assert_eq!(
///     segments[0].reference.to_string(),
///     "[2010-07-01 06:00:00, 2010-07-02 06:00:00)"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WindowMapper {
    reference_year: i32,
    leap_day: LeapDayPolicy,
}

impl WindowMapper {
    pub fn new(reference_year: i32, leap_day: LeapDayPolicy) -> Self {
        Self {
            reference_year,
            leap_day,
        }
    }

    /// Maps `requested` onto the reference year as time-ordered segments.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DateMapping`] if the window crosses a year
    /// boundary or touches Feb 29 under [`LeapDayPolicy::Reject`].
    pub fn map(&self, requested: &TimeRange) -> Result<Vec<MappedSegment>, EngineError> {
        let (start, end) = (requested.start(), requested.end());
        let next_year = year_start(start.year() + 1)?;
        if end > next_year {
            return Err(EngineError::DateMapping(format!(
                "window {requested} crosses a year boundary; split it per calendar year"
            )));
        }

        let mut segments: Vec<MappedSegment> = Vec::new();
        let mut day = start.date();
        loop {
            let day_start = day.and_time(NaiveTime::MIN);
            if day_start >= end {
                break;
            }
            let next_day = day.succ_opt().ok_or_else(|| {
                EngineError::DateMapping(format!("{day} has no following day"))
            })?;
            let piece_start = start.max(day_start);
            let piece_end = end.min(next_day.and_time(NaiveTime::MIN));

            let reference_day = self.map_date(day)?.and_time(NaiveTime::MIN);
            let segment = MappedSegment {
                requested: TimeRange::new(piece_start, piece_end)?,
                reference: TimeRange::new(
                    reference_day + (piece_start - day_start),
                    reference_day + (piece_end - day_start),
                )?,
            };

            match segments.last_mut() {
                Some(last) if last.offset() == segment.offset() => {
                    last.requested = TimeRange::new(last.requested.start(), piece_end)?;
                    last.reference =
                        TimeRange::new(last.reference.start(), segment.reference.end())?;
                }
                _ => segments.push(segment),
            }
            day = next_day;
        }
        Ok(segments)
    }

    fn map_date(&self, date: NaiveDate) -> Result<NaiveDate, EngineError> {
        if let Some(mapped) = date.with_year(self.reference_year) {
            return Ok(mapped);
        }
        // Only Feb 29 fails to carry over.
        match self.leap_day {
            LeapDayPolicy::Clamp => NaiveDate::from_ymd_opt(self.reference_year, 2, 28)
                .ok_or_else(|| {
                    EngineError::DateMapping(format!(
                        "cannot clamp {date} into {}",
                        self.reference_year
                    ))
                }),
            LeapDayPolicy::Reject => Err(EngineError::DateMapping(format!(
                "{date} has no counterpart in reference year {}",
                self.reference_year
            ))),
        }
    }
}

fn year_start(year: i32) -> Result<NaiveDateTime, EngineError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .ok_or_else(|| EngineError::DateMapping(format!("year {year} is out of range")))
}
