//! Request orchestration: generators -> aggregation -> daily grouping.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::appliances::{GeneratorContext, GeneratorRegistry};
use crate::config::{ConfigError, EngineConfig};
use crate::error::EngineError;
use crate::request::LoadProfileRequest;
use crate::series::{
    Cadence, DailyGroups, LoadSeries, NoiseInjector, Resampler, TimeRange, WindowMapper, aggregate,
};
use crate::traces::TraceStore;

/// Per-appliance and household series for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProfile {
    /// The window the profile was generated for.
    pub window: TimeRange,
    /// Family name -> that appliance's series.
    pub appliances: BTreeMap<String, LoadSeries>,
    /// Inner-join sum of all appliance series.
    pub aggregated: LoadSeries,
}

/// Output shape: household total and per-appliance traces, grouped by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadProfile {
    pub aggregated_load: DailyGroups,
    pub individual_trace: BTreeMap<String, DailyGroups>,
}

impl GeneratedProfile {
    /// Groups every series by calendar date.
    pub fn to_daily(&self) -> LoadProfile {
        LoadProfile {
            aggregated_load: DailyGroups::from_series(&self.aggregated),
            individual_trace: self
                .appliances
                .iter()
                .map(|(family, series)| (family.clone(), DailyGroups::from_series(series)))
                .collect(),
        }
    }
}

/// Synthesizes household load profiles from reference-year traces.
///
/// Synchronous and free of shared mutable state apart from the trace cache,
/// so one engine can serve concurrent requests from several threads.
#[derive(Debug)]
pub struct Engine {
    store: Arc<TraceStore>,
    registry: GeneratorRegistry,
    mapper: WindowMapper,
    resampler: Resampler,
    noise: NoiseInjector,
    seed: Option<u64>,
}

impl Engine {
    /// Builds an engine with the built-in appliance families and a fresh
    /// trace store rooted at `traces.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`EngineConfig::validate`].
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let store = TraceStore::new(&config.traces.data_dir, config.engine.reference_year);
        Self::with_store(config, Arc::new(store))
    }

    /// Builds an engine around an existing (possibly shared) trace store.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid or the store
    /// was built for a different reference year.
    pub fn with_store(config: &EngineConfig, store: Arc<TraceStore>) -> Result<Self, ConfigError> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(err);
        }
        if store.reference_year() != config.engine.reference_year {
            return Err(ConfigError {
                field: "engine.reference_year".into(),
                message: format!(
                    "trace store holds {} data, config expects {}",
                    store.reference_year(),
                    config.engine.reference_year
                ),
            });
        }
        let cadence = config.cadence().ok_or_else(|| ConfigError {
            field: "engine.cadence_minutes".into(),
            message: "invalid cadence".into(),
        })?;

        Ok(Self {
            store,
            registry: GeneratorRegistry::with_builtin(),
            mapper: WindowMapper::new(config.engine.reference_year, config.engine.leap_day),
            resampler: Resampler::new(cadence),
            noise: NoiseInjector::new(config.noise.max_offset),
            seed: config.engine.seed,
        })
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Mutable access for registering additional appliance families.
    pub fn registry_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &TraceStore {
        &self.store
    }

    pub fn cadence(&self) -> Cadence {
        self.resampler.cadence()
    }

    /// Generates every requested appliance and the household aggregate.
    ///
    /// The window and the appliance families are validated before any trace
    /// is read. Any generator failure fails the whole request.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidWindow`] for malformed or inverted bounds
    /// * [`EngineError::InvalidRequest`] if no appliance is requested
    /// * [`EngineError::ConfigurationNotFound`] for an unknown family
    /// * any stage error, wrapped in [`EngineError::Appliance`]
    /// * [`EngineError::EmptyInput`] if the appliance series share no timestamp
    pub fn generate(&self, request: &LoadProfileRequest) -> Result<GeneratedProfile, EngineError> {
        let window = request.window()?;
        if request.appliances.is_empty() {
            return Err(EngineError::InvalidRequest(
                "request names no appliances".into(),
            ));
        }

        let planned = request
            .appliances
            .iter()
            .map(|(family, params)| {
                self.registry
                    .get(family)
                    .map(|generator| (family, generator, params))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ctx = GeneratorContext {
            store: &self.store,
            mapper: &self.mapper,
            resampler: &self.resampler,
            noise: &self.noise,
        };
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut appliances = BTreeMap::new();
        for (family, generator, params) in planned {
            let series = generator
                .generate(params, &window, &ctx, &mut rng)
                .map_err(|e| e.for_family(family))?;
            debug!(%family, rows = series.len(), "appliance generated");
            appliances.insert(family.clone(), series);
        }

        let aggregated = aggregate(appliances.values())
            .filter(|series| !series.is_empty())
            .ok_or_else(|| {
                EngineError::EmptyInput(format!(
                    "appliance series for {window} share no timestamps"
                ))
            })?;

        info!(
            %window,
            appliances = appliances.len(),
            rows = aggregated.len(),
            "load profile generated"
        );
        Ok(GeneratedProfile {
            window,
            appliances,
            aggregated,
        })
    }

    /// [`Engine::generate`] followed by daily grouping.
    ///
    /// # Errors
    ///
    /// See [`Engine::generate`].
    pub fn load_profile(&self, request: &LoadProfileRequest) -> Result<LoadProfile, EngineError> {
        self.generate(request).map(|profile| profile.to_daily())
    }
}
