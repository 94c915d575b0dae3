//! Common types and traits for appliance load generators.

use rand::RngCore;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::EngineError;
use crate::series::{LoadSeries, NoiseInjector, Resampler, TimeRange, WindowMapper};
use crate::traces::{ApplianceSelector, TraceStore};

/// Shared pipeline stages handed to every generator.
///
/// Borrowed from the engine for the duration of one request.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub store: &'a TraceStore,
    pub mapper: &'a WindowMapper,
    pub resampler: &'a Resampler,
    pub noise: &'a NoiseInjector,
}

impl GeneratorContext<'_> {
    /// Runs window mapping, trace lookup, resampling and noise for one selector.
    ///
    /// Every mapped segment is resampled on its reference-year span and
    /// shifted back onto its requested span, so all timestamps of the result
    /// lie inside `window`. Segments without trace data leave a gap.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage, untagged; the engine adds the
    /// appliance family. [`EngineError::EmptyInput`] if no segment has data.
    pub fn synthesize(
        &self,
        selector: &ApplianceSelector,
        window: &TimeRange,
        rng: &mut dyn RngCore,
    ) -> Result<LoadSeries, EngineError> {
        let segments = self.mapper.map(window)?;
        let reference = self.store.series(selector)?;

        let mut points = Vec::new();
        for segment in &segments {
            let resampled = match self.resampler.resample(&reference, &segment.reference) {
                Ok(series) => series,
                Err(EngineError::EmptyInput(_)) if segments.len() > 1 => continue,
                Err(e) => return Err(e),
            };
            let noisy = self.noise.inject(&resampled, rng);
            // A window start off the cadence grid leaves a leading bucket
            // labelled before the window; it is dropped.
            points.extend(
                noisy
                    .shifted(segment.offset())
                    .points()
                    .iter()
                    .filter(|(ts, _)| segment.requested.contains(*ts)),
            );
        }
        if points.is_empty() {
            return Err(EngineError::EmptyInput(format!(
                "no trace samples for {selector} inside {window}"
            )));
        }

        debug!(
            %selector,
            segments = segments.len(),
            rows = points.len(),
            "synthesized appliance series"
        );
        Ok(LoadSeries::from_sorted(points))
    }
}

/// A household appliance family that can produce a load series for a window.
///
/// Implementations are registered by family name in a
/// [`GeneratorRegistry`](super::registry::GeneratorRegistry); adding an
/// appliance type means adding an implementation, not editing dispatch code.
pub trait ApplianceGenerator: Send + Sync {
    /// Family name as it appears in requests, e.g. `"ev_charger"`.
    fn family(&self) -> &'static str;

    /// Produces the per-appliance resampled, noise-injected series.
    ///
    /// # Arguments
    ///
    /// * `params` - Family-specific request parameters (JSON object or null)
    /// * `window` - Requested calendar window
    /// * `ctx` - Shared pipeline stages
    /// * `rng` - Noise source for this request
    fn generate(
        &self,
        params: &serde_json::Value,
        window: &TimeRange,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<LoadSeries, EngineError>;
}

/// Decodes family parameters; `null` decodes as an empty object.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] if `params` does not match `T`.
pub fn decode_params<T: DeserializeOwned>(
    family: &str,
    params: &serde_json::Value,
) -> Result<T, EngineError> {
    let value = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params.clone()
    };
    serde_json::from_value(value)
        .map_err(|e| EngineError::InvalidRequest(format!("{family} parameters: {e}")))
}
