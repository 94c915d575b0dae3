//! Load profile generator entry point: CLI wiring and config-driven engine construction.

use std::path::{Path, PathBuf};
use std::process;

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use loadprofile_gen::appliances::EvChargerGenerator;
use loadprofile_gen::config::EngineConfig;
use loadprofile_gen::engine::{Engine, LoadProfile};
use loadprofile_gen::io::export::export_csv;
use loadprofile_gen::request::{DEFAULT_END_TIME, DEFAULT_START_TIME, LoadProfileRequest};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    request_path: Option<String>,
    data_dir: Option<String>,
    seed_override: Option<u64>,
    out: Option<String>,
    log_json: bool,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

/// Stdout body, shaped like the API's success response.
#[derive(Serialize)]
struct Output<'a> {
    data: &'a LoadProfile,
}

fn print_help() {
    eprintln!("loadprofile-gen - household load profile synthesis from appliance traces");
    eprintln!();
    eprintln!("Usage: loadprofile-gen [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load engine config from TOML file");
    eprintln!("  --request <path>         Load profile request from JSON file");
    eprintln!("  --data-dir <path>        Override traces.data_dir");
    eprintln!("  --seed <u64>             Override noise seed");
    eprintln!("  --out <path>             Export per-appliance and aggregate series to CSV");
    eprintln!("  --log-json               Emit logs as JSON");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server instead of a one-shot run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!(
        "If no --request is given, one EV charger is generated for {DEFAULT_START_TIME} .. {DEFAULT_END_TIME}."
    );
}

fn next_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        request_path: None,
        data_dir: None,
        seed_override: None,
        out: None,
        log_json: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                cli.config_path = Some(next_value(&args, i, "--config", "path"));
            }
            "--request" => {
                i += 1;
                cli.request_path = Some(next_value(&args, i, "--request", "path"));
            }
            "--data-dir" => {
                i += 1;
                cli.data_dir = Some(next_value(&args, i, "--data-dir", "path"));
            }
            "--seed" => {
                i += 1;
                let raw = next_value(&args, i, "--seed", "u64");
                if let Ok(s) = raw.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--out" => {
                i += 1;
                cli.out = Some(next_value(&args, i, "--out", "path"));
            }
            "--log-json" => {
                cli.log_json = true;
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = next_value(&args, i, "--port", "u16");
                if let Ok(p) = raw.parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{raw}\" is not a valid u16");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Installs the global subscriber. Logs go to stderr so stdout stays clean JSON.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &CliArgs) -> EngineConfig {
    let mut config = if let Some(ref path) = cli.config_path {
        match EngineConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        EngineConfig::default()
    };

    if let Some(seed) = cli.seed_override {
        config.engine.seed = Some(seed);
    }
    if let Some(ref dir) = cli.data_dir {
        config.traces.data_dir = PathBuf::from(dir);
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn load_request(cli: &CliArgs) -> LoadProfileRequest {
    match cli.request_path {
        Some(ref path) => match LoadProfileRequest::from_json_file(Path::new(path)) {
            Ok(req) => req,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => LoadProfileRequest::new(DEFAULT_START_TIME, DEFAULT_END_TIME)
            .with_appliance(EvChargerGenerator::FAMILY, serde_json::json!({})),
    }
}

fn main() {
    let cli = parse_args();
    init_tracing(cli.log_json);

    let config = load_config(&cli);
    let engine = match Engine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    info!(
        data_dir = %engine.store().data_dir().display(),
        reference_year = engine.store().reference_year(),
        cadence_s = engine.cadence().seconds(),
        families = ?engine.registry().families().collect::<Vec<_>>(),
        "engine ready"
    );

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(loadprofile_gen::api::AppState { engine });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(loadprofile_gen::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
        return;
    }

    let request = load_request(&cli);
    let profile = match engine.generate(&request) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.kind());
            process::exit(1);
        }
    };

    let daily = profile.to_daily();
    match serde_json::to_string_pretty(&Output { data: &daily }) {
        Ok(body) => println!("{body}"),
        Err(e) => {
            eprintln!("error: failed to encode output: {e}");
            process::exit(1);
        }
    }

    if let Some(ref path) = cli.out {
        if let Err(e) = export_csv(&profile, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Profile written to {path}");
    }
}
