//! File export of generated profiles.

/// Wide-format CSV export.
pub mod export;
