//! Appliance load profile synthesis.
//!
//! Builds household electricity load profiles by replaying measured
//! reference-year appliance traces onto a requested window, resampling them
//! to a common cadence, perturbing them with bounded noise, and summing them
//! into a household aggregate grouped by calendar date.

pub mod appliances;
pub mod config;
/// Request orchestration and output shapes.
pub mod engine;
pub mod error;
pub mod io;
pub mod request;
/// Time-series primitives: windows, resampling, noise, aggregation.
pub mod series;
pub mod traces;

#[cfg(feature = "api")]
pub mod api;
