//! Load-profile request payload.
//!
//! ```json
//! {
//!   "general": { "start_time": "2010-02-01 00:00:00", "end_time": "2010-02-03 00:00:00" },
//!   "appliances": { "ev_charger": { "number_ev": 1, "level": 1 } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::series::TimeRange;

/// Window start used when a request omits `start_time`.
pub const DEFAULT_START_TIME: &str = "2010-01-01 00:00:00";
/// Window end used when a request omits `end_time`.
pub const DEFAULT_END_TIME: &str = "2010-03-01 00:00:00";

/// Household-level request fields.
///
/// Only the window drives generation; occupancy and location are accepted
/// so callers can send one payload shape to every service version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseholdGeneral {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_people: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// A full request: household window plus per-family appliance parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadProfileRequest {
    #[serde(default)]
    pub general: HouseholdGeneral,
    /// Family name -> family-specific parameters.
    #[serde(default)]
    pub appliances: BTreeMap<String, serde_json::Value>,
}

impl LoadProfileRequest {
    /// A request for `[start, end)` with no appliances yet.
    pub fn new(start_time: &str, end_time: &str) -> Self {
        Self {
            general: HouseholdGeneral {
                start_time: Some(start_time.to_string()),
                end_time: Some(end_time.to_string()),
                ..HouseholdGeneral::default()
            },
            appliances: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) one appliance family.
    pub fn with_appliance(mut self, family: &str, params: serde_json::Value) -> Self {
        self.appliances.insert(family.to_string(), params);
        self
    }

    /// Parses a JSON request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if the JSON does not match.
    pub fn from_json_str(s: &str) -> Result<Self, EngineError> {
        serde_json::from_str(s).map_err(|e| EngineError::InvalidRequest(e.to_string()))
    }

    /// Reads and parses a JSON request file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidRequest(format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// The requested window, falling back to the default bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWindow`] for malformed or inverted bounds.
    pub fn window(&self) -> Result<TimeRange, EngineError> {
        TimeRange::parse(
            self.general
                .start_time
                .as_deref()
                .unwrap_or(DEFAULT_START_TIME),
            self.general.end_time.as_deref().unwrap_or(DEFAULT_END_TIME),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_full_payload() {
        let req = LoadProfileRequest::from_json_str(
            r#"{
                "general": {
                    "number_people": 3,
                    "start_time": "2010-02-01 00:00:00",
                    "end_time": "2010-02-03 00:00:00",
                    "latitude": 29.760427,
                    "longitude": -95.369804
                },
                "appliances": { "ev_charger": { "number_ev": 2, "level": 1 } }
            }"#,
        )
        .unwrap();
        assert_eq!(req.window().unwrap().duration().num_days(), 2);
        assert_eq!(req.appliances["ev_charger"]["number_ev"], 2);
        assert_eq!(req.general.number_people, Some(3.0));
    }

    #[test]
    fn missing_bounds_use_defaults() {
        let req = LoadProfileRequest::from_json_str(r#"{"general": {}, "appliances": {}}"#).unwrap();
        let window = req.window().unwrap();
        assert_eq!(
            window,
            TimeRange::parse(DEFAULT_START_TIME, DEFAULT_END_TIME).unwrap()
        );
    }

    #[test]
    fn inverted_bounds_are_invalid_window() {
        let req = LoadProfileRequest::new("2010-02-03 00:00:00", "2010-02-01 00:00:00");
        assert_eq!(req.window().unwrap_err().kind(), ErrorKind::InvalidWindow);
    }

    #[test]
    fn malformed_json_is_invalid_request() {
        let err = LoadProfileRequest::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
