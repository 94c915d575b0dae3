//! Family-name lookup of appliance generators.

use std::collections::BTreeMap;
use std::fmt;

use super::ev_charger::EvChargerGenerator;
use super::types::ApplianceGenerator;
use crate::error::EngineError;

/// Generators keyed by family name.
///
/// Iteration is in family-name order, which keeps seeded runs reproducible.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<&'static str, Box<dyn ApplianceGenerator>>,
}

impl GeneratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in appliance family.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(EvChargerGenerator);
        registry
    }

    /// Adds a generator, returning the one it replaces, if any.
    pub fn register<G: ApplianceGenerator + 'static>(
        &mut self,
        generator: G,
    ) -> Option<Box<dyn ApplianceGenerator>> {
        self.generators
            .insert(generator.family(), Box::new(generator))
    }

    /// Looks up the generator for `family`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationNotFound`] for an unregistered family.
    pub fn get(&self, family: &str) -> Result<&dyn ApplianceGenerator, EngineError> {
        self.generators
            .get(family)
            .map(Box::as_ref)
            .ok_or_else(|| {
                EngineError::ConfigurationNotFound(format!(
                    "unknown appliance family \"{family}\" (available: {})",
                    self.families().collect::<Vec<_>>().join(", ")
                ))
            })
    }

    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.families()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appliances::types::GeneratorContext;
    use crate::error::ErrorKind;
    use crate::series::{LoadSeries, TimeRange};
    use rand::RngCore;

    struct Flat;

    impl ApplianceGenerator for Flat {
        fn family(&self) -> &'static str {
            "flat"
        }

        fn generate(
            &self,
            _params: &serde_json::Value,
            _window: &TimeRange,
            _ctx: &GeneratorContext<'_>,
            _rng: &mut dyn RngCore,
        ) -> Result<LoadSeries, EngineError> {
            Ok(LoadSeries::default())
        }
    }

    #[test]
    fn builtin_registry_has_ev_charger() {
        let registry = GeneratorRegistry::with_builtin();
        assert!(registry.get("ev_charger").is_ok());
        assert_eq!(registry.families().collect::<Vec<_>>(), vec!["ev_charger"]);
    }

    #[test]
    fn unknown_family_is_configuration_not_found() {
        let registry = GeneratorRegistry::with_builtin();
        let err = registry.get("dishwasher").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ConfigurationNotFound);
        assert!(err.to_string().contains("ev_charger"));
    }

    #[test]
    fn new_families_register_without_touching_dispatch() {
        let mut registry = GeneratorRegistry::with_builtin();
        assert!(registry.register(Flat).is_none());
        assert!(registry.register(Flat).is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.families().collect::<Vec<_>>(),
            vec!["ev_charger", "flat"]
        );
    }
}
