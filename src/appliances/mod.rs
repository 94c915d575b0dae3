//! Appliance load generators.

/// Residential EV charger traces.
pub mod ev_charger;
/// Family-name registry of generators.
pub mod registry;
pub mod types;

// Re-export the main types for convenience
pub use ev_charger::{EvChargerGenerator, EvChargerParams};
pub use registry::GeneratorRegistry;
pub use types::{ApplianceGenerator, GeneratorContext, decode_params};
