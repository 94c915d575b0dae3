//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::RngCore;

use loadprofile_gen::appliances::{ApplianceGenerator, GeneratorContext};
use loadprofile_gen::config::EngineConfig;
use loadprofile_gen::engine::Engine;
use loadprofile_gen::error::EngineError;
use loadprofile_gen::series::{LoadSeries, TimeRange};
use loadprofile_gen::traces::{ApplianceSelector, TraceKey, TraceStore, TraceTable};

/// Raw trace resolution in minutes.
pub const RAW_STEP_MINUTES: i64 = 5;

/// Night hours (before this) carry zero EV load.
pub const CHARGING_STARTS_HOUR: i64 = 6;

/// Base EV load in the single-vehicle column.
pub const EV_BASE_KW: f64 = 1000.0;

/// Flat heat pump load.
pub const HEAT_PUMP_KW: f64 = 300.0;

pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Value of the `"1"` EV column at `minute_of_day`.
pub fn ev_raw_kw(minute_of_day: i64) -> f64 {
    if minute_of_day < CHARGING_STARTS_HOUR * 60 {
        0.0
    } else {
        EV_BASE_KW + minute_of_day as f64
    }
}

/// EV charger level-1 table for 2010-02-01 and 2010-02-02 at 5-minute
/// resolution, with columns for one and two vehicles.
pub fn ev_trace_csv() -> String {
    let mut csv = String::from("date_time,1,2\n");
    let start = ts(2010, 2, 1, 0, 0);
    for day in 0..2 {
        for step in 0..(24 * 60 / RAW_STEP_MINUTES) {
            let minute = step * RAW_STEP_MINUTES;
            let t = start + TimeDelta::days(day) + TimeDelta::minutes(minute);
            let one = ev_raw_kw(minute);
            csv.push_str(&format!(
                "{},{one},{}\n",
                t.format("%Y-%m-%d %H:%M:%S"),
                one * 2.0
            ));
        }
    }
    csv
}

/// Flat heat pump table covering 2010-02-02 only.
pub fn heat_pump_trace_csv() -> String {
    let mut csv = String::from("date_time,1\n");
    let start = ts(2010, 2, 2, 0, 0);
    for step in 0..(24 * 60 / RAW_STEP_MINUTES) {
        let t = start + TimeDelta::minutes(step * RAW_STEP_MINUTES);
        csv.push_str(&format!("{},{HEAT_PUMP_KW}\n", t.format("%Y-%m-%d %H:%M:%S")));
    }
    csv
}

/// Hourly EV value around the end of February: `day * 100 + hour + 1`.
pub fn late_feb_kw(day: u32, hour: u32) -> f64 {
    f64::from(day * 100 + hour + 1)
}

/// Hourly EV level-1 table for 2010-02-27 through 2010-03-02.
pub fn late_feb_trace_csv() -> String {
    let mut csv = String::from("date_time,1\n");
    for (month, day) in [(2, 27), (2, 28), (3, 1), (3, 2)] {
        for hour in 0..24 {
            csv.push_str(&format!(
                "2010-{month:02}-{day:02} {hour:02}:00:00,{}\n",
                late_feb_kw(day, hour)
            ));
        }
    }
    csv
}

/// Noise-free engine whose EV table spans the end of February.
pub fn late_feb_engine() -> Engine {
    let store = TraceStore::new("/nonexistent", 2010);
    store.insert(
        key("ev_charger"),
        TraceTable::from_reader(late_feb_trace_csv().as_bytes(), "ev", 2010).unwrap(),
    );
    let mut config = test_config();
    config.noise.max_offset = 0;
    Engine::with_store(&config, Arc::new(store)).unwrap()
}

/// Default configuration with a fixed seed.
pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.engine.seed = Some(7);
    config
}

fn key(family: &str) -> TraceKey {
    TraceKey {
        family: family.to_string(),
        level: 1,
    }
}

/// Store pre-seeded with the EV and heat pump tables.
pub fn in_memory_store() -> Arc<TraceStore> {
    let store = TraceStore::new("/nonexistent", 2010);
    store.insert(
        key("ev_charger"),
        TraceTable::from_reader(ev_trace_csv().as_bytes(), "ev", 2010).unwrap(),
    );
    store.insert(
        key(HeatPump::FAMILY),
        TraceTable::from_reader(heat_pump_trace_csv().as_bytes(), "heat_pump", 2010).unwrap(),
    );
    Arc::new(store)
}

/// Engine over [`in_memory_store`] with [`HeatPump`] registered.
pub fn in_memory_engine() -> Engine {
    let mut engine = Engine::with_store(&test_config(), in_memory_store()).unwrap();
    engine.registry_mut().register(HeatPump);
    engine
}

/// Fresh per-process scratch directory holding the EV trace file.
pub fn trace_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "loadprofile-gen-it-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("ev_charger")).unwrap();
    fs::write(dir.join("ev_charger").join("ev_charger_l1.csv"), ev_trace_csv()).unwrap();
    dir
}

/// File-backed engine reading from [`trace_dir`].
pub fn file_engine(name: &str) -> Engine {
    let mut config = test_config();
    config.traces.data_dir = trace_dir(name);
    Engine::from_config(&config).unwrap()
}

/// Test-only appliance family replaying the flat heat pump table.
pub struct HeatPump;

impl HeatPump {
    pub const FAMILY: &'static str = "heat_pump";
}

impl ApplianceGenerator for HeatPump {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn generate(
        &self,
        _params: &serde_json::Value,
        window: &TimeRange,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<LoadSeries, EngineError> {
        ctx.synthesize(&ApplianceSelector::new(Self::FAMILY, 1, 1), window, rng)
    }
}
