//! Historical trace store with a load-once, read-many cache.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::table::TraceTable;
use crate::error::EngineError;
use crate::series::types::LoadSeries;

/// Identifies one trace file: an appliance family at a capacity level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceKey {
    pub family: String,
    pub level: u8,
}

/// Identifies one trace column: a [`TraceKey`] plus the unit-count column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplianceSelector {
    /// Appliance family, e.g. `"ev_charger"`.
    pub family: String,
    /// Capacity or charging level tier.
    pub level: u8,
    /// Unit-count column key, e.g. `"1"`.
    pub units: String,
}

impl ApplianceSelector {
    pub fn new(family: impl Into<String>, level: u8, units: impl ToString) -> Self {
        Self {
            family: family.into(),
            level,
            units: units.to_string(),
        }
    }

    pub fn trace_key(&self) -> TraceKey {
        TraceKey {
            family: self.family.clone(),
            level: self.level,
        }
    }
}

impl fmt::Display for ApplianceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} level {} x{}", self.family, self.level, self.units)
    }
}

/// Resolves selectors to reference-year series.
///
/// Tables live at `<data_dir>/<family>/<family>_l<level>.csv`. Each table is
/// parsed once and then shared read-only; a failed load is not cached, so a
/// retry after a transient I/O error reads the file again.
#[derive(Debug)]
pub struct TraceStore {
    data_dir: PathBuf,
    reference_year: i32,
    cache: RwLock<HashMap<TraceKey, Arc<TraceTable>>>,
}

impl TraceStore {
    pub fn new(data_dir: impl Into<PathBuf>, reference_year: i32) -> Self {
        Self {
            data_dir: data_dir.into(),
            reference_year,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// File backing `key`.
    pub fn table_path(&self, key: &TraceKey) -> PathBuf {
        self.data_dir
            .join(&key.family)
            .join(format!("{}_l{}.csv", key.family, key.level))
    }

    /// Seeds the cache with an already-parsed table.
    pub fn insert(&self, key: TraceKey, table: TraceTable) {
        self.cache.write().insert(key, Arc::new(table));
    }

    /// Number of cached tables.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns the table for `key`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigurationNotFound`] if no file exists,
    /// [`EngineError::TraceIo`] if it cannot be read, and
    /// [`EngineError::CorruptTrace`] if it does not validate.
    pub fn table(&self, key: &TraceKey) -> Result<Arc<TraceTable>, EngineError> {
        if let Some(table) = self.cache.read().get(key) {
            debug!(family = %key.family, level = key.level, "trace cache hit");
            return Ok(Arc::clone(table));
        }

        let loaded = Arc::new(self.load(key)?);
        // Concurrent loaders may race here; the first insert wins and the
        // tables are identical anyway.
        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(key.clone()).or_insert(loaded)))
    }

    /// Full reference-year series for `selector`.
    ///
    /// # Errors
    ///
    /// Propagates [`TraceStore::table`] errors and returns
    /// [`EngineError::ConfigurationNotFound`] for an unknown unit count.
    pub fn series(&self, selector: &ApplianceSelector) -> Result<LoadSeries, EngineError> {
        self.table(&selector.trace_key())?.column(&selector.units)
    }

    fn load(&self, key: &TraceKey) -> Result<TraceTable, EngineError> {
        let path = self.table_path(key);
        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => EngineError::ConfigurationNotFound(format!(
                "no trace for {} level {} at {}",
                key.family,
                key.level,
                path.display()
            )),
            _ => EngineError::TraceIo {
                path: path.clone(),
                source,
            },
        })?;

        let table = TraceTable::from_reader(
            BufReader::new(file),
            &path.display().to_string(),
            self.reference_year,
        )?;
        info!(
            source = table.source(),
            rows = table.len(),
            columns = table.column_names().count(),
            "loaded trace table"
        );
        Ok(table)
    }
}
