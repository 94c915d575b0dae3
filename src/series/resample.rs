//! Fixed-cadence resampling by bucket mean.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

use super::types::{Cadence, LoadSeries, TimeRange};
use crate::error::EngineError;

/// Reduces raw samples to one mean value per cadence-wide bucket.
///
/// Buckets are aligned to midnight. A bucket with no raw samples yields no
/// output row, so callers must read a gap as "no data" rather than zero.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use loadprofile_gen::series::resample::Resampler;
/// use loadprofile_gen::series::types::{Cadence, LoadSeries, TimeRange};
///
/// let t = |m| NaiveDate::from_ymd_opt(2010, 1, 1).unwrap().and_hms_opt(0, m, 0).unwrap();
/// let raw = LoadSeries::from_points(vec![(t(0), 1.0), (t(5), 3.0), (t(15), 10.0)]).unwrap();
/// let window = TimeRange::new(t(0), t(30)).unwrap();
///
/// let resampled = Resampler::new(Cadence::default()).resample(&raw, &window).unwrap();
/// assert_eq!(resampled.points(), &[(t(0), 2.0), (t(15), 10.0)]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Resampler {
    cadence: Cadence,
}

impl Resampler {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Start of the bucket containing `ts`.
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let midnight = ts.date().and_time(NaiveTime::MIN);
        let secs = (ts - midnight).num_seconds();
        let aligned = secs - secs.rem_euclid(self.cadence.seconds());
        midnight + TimeDelta::seconds(aligned)
    }

    /// Resamples the part of `series` that lies inside `window`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyInput`] if no sample falls inside `window`.
    pub fn resample(
        &self,
        series: &LoadSeries,
        window: &TimeRange,
    ) -> Result<LoadSeries, EngineError> {
        let samples = series.window(window);
        if samples.is_empty() {
            return Err(EngineError::EmptyInput(format!(
                "no trace samples inside {window}"
            )));
        }

        let mut out = Vec::with_capacity(samples.len().min(
            (window.duration().num_seconds() / self.cadence.seconds()).max(1) as usize,
        ));
        let mut current: Option<(NaiveDateTime, f64, usize)> = None;

        for &(ts, value) in samples {
            let bucket = self.bucket_start(ts);
            if let Some((start, sum, count)) = current.as_mut() {
                if *start == bucket {
                    *sum += value;
                    *count += 1;
                    continue;
                }
            }
            if let Some(done) = current.replace((bucket, value, 1)) {
                out.push(mean(done));
            }
        }
        if let Some(done) = current {
            out.push(mean(done));
        }

        debug!(
            raw = samples.len(),
            buckets = out.len(),
            cadence_s = self.cadence.seconds(),
            "resampled window"
        );
        Ok(LoadSeries::from_sorted(out))
    }
}

fn mean((start, sum, count): (NaiveDateTime, f64, usize)) -> (NaiveDateTime, f64) {
    (start, sum / count as f64)
}
