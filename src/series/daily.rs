//! Per-calendar-date partition of a series, the output shape of a profile.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::types::LoadSeries;

/// Calendar date -> that day's values in time order.
///
/// Dates without samples are absent. Serializes as a JSON object keyed by
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DailyGroups(BTreeMap<NaiveDate, Vec<f64>>);

impl DailyGroups {
    /// Partitions `series` by the date of each timestamp.
    pub fn from_series(series: &LoadSeries) -> Self {
        let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for &(ts, value) in series.points() {
            groups.entry(ts.date()).or_default().push(value);
        }
        Self(groups)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&[f64]> {
        self.0.get(&date).map(Vec::as_slice)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[f64])> + '_ {
        self.0.iter().map(|(d, v)| (*d, v.as_slice()))
    }
}
