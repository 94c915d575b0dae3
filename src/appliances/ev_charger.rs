//! Residential EV charger generator.

use rand::RngCore;
use serde::Deserialize;

use crate::appliances::types::{ApplianceGenerator, GeneratorContext, decode_params};
use crate::error::EngineError;
use crate::series::{LoadSeries, TimeRange};
use crate::traces::ApplianceSelector;

/// Request parameters for residential EV charging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvChargerParams {
    /// Number of EVs charging at the household; selects the trace column.
    pub number_ev: u32,
    /// Charger level (1 = 120 V, 2 = 240 V); selects the trace file.
    pub level: u8,
}

impl Default for EvChargerParams {
    fn default() -> Self {
        Self {
            number_ev: 1,
            level: 1,
        }
    }
}

/// Residential EV charging load replayed from measured charging sessions.
///
/// Reads `<data_dir>/ev_charger/ev_charger_l<level>.csv`, column `number_ev`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvChargerGenerator;

impl EvChargerGenerator {
    pub const FAMILY: &'static str = "ev_charger";

    /// Trace selector for `params`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if `number_ev` or `level` is zero.
    pub fn selector(params: &EvChargerParams) -> Result<ApplianceSelector, EngineError> {
        if params.number_ev == 0 {
            return Err(EngineError::InvalidRequest(
                "number_ev must be at least 1".into(),
            ));
        }
        if params.level == 0 {
            return Err(EngineError::InvalidRequest("level must be at least 1".into()));
        }
        Ok(ApplianceSelector::new(
            Self::FAMILY,
            params.level,
            params.number_ev,
        ))
    }
}

impl ApplianceGenerator for EvChargerGenerator {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn generate(
        &self,
        params: &serde_json::Value,
        window: &TimeRange,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<LoadSeries, EngineError> {
        let params: EvChargerParams = decode_params(Self::FAMILY, params)?;
        let selector = Self::selector(&params)?;
        ctx.synthesize(&selector, window, rng)
    }
}
