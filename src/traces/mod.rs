//! Reference-year appliance traces.

/// Cached trace lookup by appliance selector.
pub mod store;
/// CSV parsing and validation of a trace table.
pub mod table;

pub use store::{ApplianceSelector, TraceKey, TraceStore};
pub use table::TraceTable;
