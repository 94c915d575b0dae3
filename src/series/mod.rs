//! Time-series stages of the synthesis pipeline.

/// Inner-join summation of per-appliance series.
pub mod aggregate;
/// Calendar-date grouping for output.
pub mod daily;
/// Zero-preserving noise injection.
pub mod noise;
/// Fixed-cadence bucket-mean resampling.
pub mod resample;
pub mod types;
/// Reference-year window mapping.
pub mod window;

pub use aggregate::aggregate;
pub use daily::DailyGroups;
pub use noise::NoiseInjector;
pub use resample::Resampler;
pub use types::{Cadence, LoadSeries, TimeRange};
pub use window::{LeapDayPolicy, WindowMapper};
