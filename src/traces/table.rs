//! Parsing and validation of one reference-year trace table.
//!
//! A table is a CSV file with a `date_time` column followed by one numeric
//! column per unit count (`"1"`, `"2"`, ...). Empty cells are missing
//! readings.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{Datelike, NaiveDateTime};

use crate::error::EngineError;
use crate::series::types::{DATE_TIME_FORMAT, LoadSeries};

/// Name of the timestamp column.
pub const DATE_TIME_COLUMN: &str = "date_time";

const ACCEPTED_FORMATS: &[&str] = &[DATE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Immutable in-memory copy of a trace file.
#[derive(Debug, Clone)]
pub struct TraceTable {
    source: String,
    timestamps: Vec<NaiveDateTime>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl TraceTable {
    /// Reads and validates a table.
    ///
    /// # Arguments
    ///
    /// * `reader` - CSV source
    /// * `source` - Name used in error messages (usually the file path)
    /// * `reference_year` - Every timestamp must fall in this year
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CorruptTrace`] if the header lacks `date_time`,
    /// a cell does not parse, a value is negative or non-finite, a timestamp
    /// is outside `reference_year`, or timestamps are not strictly increasing.
    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
        reference_year: i32,
    ) -> Result<Self, EngineError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| EngineError::corrupt(source, format!("unreadable header: {e}")))?
            .clone();
        let ts_idx = headers
            .iter()
            .position(|h| h == DATE_TIME_COLUMN)
            .ok_or_else(|| {
                EngineError::corrupt(source, format!("missing `{DATE_TIME_COLUMN}` column"))
            })?;

        // Unnamed columns (e.g. a written-out row index) carry no unit count.
        let value_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != ts_idx && !h.is_empty())
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut timestamps = Vec::new();
        let mut columns: BTreeMap<String, Vec<Option<f64>>> = value_cols
            .iter()
            .map(|(_, name)| (name.clone(), Vec::new()))
            .collect();

        for (row_idx, record) in rdr.records().enumerate() {
            let line = row_idx + 2;
            let record = record
                .map_err(|e| EngineError::corrupt(source, format!("line {line}: {e}")))?;

            let raw_ts = record.get(ts_idx).unwrap_or_default();
            let ts = parse_timestamp(raw_ts).ok_or_else(|| {
                EngineError::corrupt(source, format!("line {line}: bad timestamp \"{raw_ts}\""))
            })?;
            if ts.year() != reference_year {
                return Err(EngineError::corrupt(
                    source,
                    format!("line {line}: {ts} is outside reference year {reference_year}"),
                ));
            }
            if let Some(prev) = timestamps.last() {
                if ts <= *prev {
                    return Err(EngineError::corrupt(
                        source,
                        format!("line {line}: {ts} is not after {prev} (unsorted or duplicate)"),
                    ));
                }
            }
            timestamps.push(ts);

            for (col_idx, name) in &value_cols {
                let cell = record.get(*col_idx).unwrap_or_default();
                let value = parse_value(cell).map_err(|msg| {
                    EngineError::corrupt(source, format!("line {line}, column {name}: {msg}"))
                })?;
                if let Some(column) = columns.get_mut(name) {
                    column.push(value);
                }
            }
        }

        if timestamps.is_empty() {
            return Err(EngineError::corrupt(source, "no data rows"));
        }

        Ok(Self {
            source: source.to_string(),
            timestamps,
            columns,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Unit-count column names, sorted.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Extracts one column as a series, skipping missing readings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationNotFound`] if the column does not exist.
    pub fn column(&self, name: &str) -> Result<LoadSeries, EngineError> {
        let values = self.columns.get(name).ok_or_else(|| {
            EngineError::ConfigurationNotFound(format!(
                "column \"{name}\" not in {} (available: {})",
                self.source,
                self.column_names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        let points = self
            .timestamps
            .iter()
            .zip(values)
            .filter_map(|(ts, v)| v.map(|v| (*ts, v)))
            .collect();
        Ok(LoadSeries::from_sorted(points))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_value(cell: &str) -> Result<Option<f64>, String> {
    if cell.is_empty() {
        return Ok(None);
    }
    let v: f64 = cell
        .parse()
        .map_err(|_| format!("\"{cell}\" is not a number"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{v} is not a non-negative finite reading"));
    }
    Ok(Some(v))
}
