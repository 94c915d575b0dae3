//! CSV export for generated load profiles.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::engine::GeneratedProfile;
use crate::series::types::DATE_TIME_FORMAT;

/// Name of the household total column.
pub const AGGREGATED_COLUMN: &str = "aggregated_load";

/// Exports a generated profile to a CSV file at the given path.
///
/// Writes a header row (`date_time`, one column per appliance family in name
/// order, then `aggregated_load`) followed by one row per aggregate timestamp.
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(profile: &GeneratedProfile, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(profile, buf)
}

/// Writes a generated profile as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(profile: &GeneratedProfile, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["date_time"];
    header.extend(profile.appliances.keys().map(String::as_str));
    header.push(AGGREGATED_COLUMN);
    wtr.write_record(&header)?;

    for &(ts, total) in profile.aggregated.points() {
        let mut row = Vec::with_capacity(header.len());
        row.push(ts.format(DATE_TIME_FORMAT).to_string());
        for series in profile.appliances.values() {
            // The aggregate index is an inner join, so every appliance has `ts`.
            row.push(series.get(ts).map(format_kw).unwrap_or_default());
        }
        row.push(format_kw(total));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn format_kw(value: f64) -> String {
    format!("{value:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{LoadSeries, TimeRange};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use std::collections::BTreeMap;

    fn t(step: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2010, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::minutes(15 * step)
    }

    fn make_profile(steps: i64) -> GeneratedProfile {
        let ev = LoadSeries::from_points((0..steps).map(|s| (t(s), s as f64)).collect()).unwrap();
        let hp = LoadSeries::from_points((0..steps).map(|s| (t(s), 2.0)).collect()).unwrap();
        let aggregated =
            LoadSeries::from_points((0..steps).map(|s| (t(s), s as f64 + 2.0)).collect()).unwrap();
        let mut appliances = BTreeMap::new();
        appliances.insert("heat_pump".to_string(), hp);
        appliances.insert("ev_charger".to_string(), ev);
        GeneratedProfile {
            window: TimeRange::new(t(0), t(steps)).unwrap(),
            appliances,
            aggregated,
        }
    }

    #[test]
    fn header_lists_families_in_name_order() {
        let mut buf = Vec::new();
        write_csv(&make_profile(1), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(first_line, "date_time,ev_charger,heat_pump,aggregated_load");
    }

    #[test]
    fn row_count_matches_aggregate() {
        let mut buf = Vec::new();
        write_csv(&make_profile(96), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 96 data rows
        assert_eq!(lines.len(), 97);
        assert_eq!(lines[2], "2010-02-01 00:15:00,1.0000,2.0000,3.0000");
    }

    #[test]
    fn deterministic_output() {
        let profile = make_profile(5);
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&profile, &mut buf1).ok();
        write_csv(&profile, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }
}
