#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line harness for crime hotspot prediction.
//!
//! Reads one JSON request (`{"crimes": [...], "n_clusters": 5}`) from stdin
//! or `--input`, runs the clustering pipeline, and writes exactly one JSON
//! response to stdout. Every failure, including unreadable or malformed
//! input, is reported in the response's `success`/`error` fields and the
//! process still exits with status 0. Logs go to stderr and are controlled
//! by `RUST_LOG`.

use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::error::ErrorKind;
use crime_hotspots::HotspotConfig;
use crime_hotspots_models::PredictionResult;

/// Response written when the result itself cannot be serialized.
const FALLBACK_RESPONSE: &str = r#"{"success":false,"error":"Failed to serialize response","hotspots":[],"clustered_crimes":[]}"#;

#[derive(Parser, Debug)]
#[command(
    name = "crime_hotspots",
    about = "Predict crime hotspots from a JSON batch of incidents"
)]
struct Cli {
    /// Read the request from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,
    /// Seed for k-means initialization (overrides `HOTSPOT_SEED`)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of k-means restarts (overrides `HOTSPOT_RESTARTS`)
    #[arg(long)]
    restarts: Option<usize>,
    /// Maximum Lloyd iterations per restart (overrides `HOTSPOT_MAX_ITERATIONS`)
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Pretty-print the JSON response
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn config(&self) -> HotspotConfig {
        let mut config = HotspotConfig::from_env();
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(restarts) = self.restarts {
            config = config.with_restarts(restarts);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        config
    }
}

fn main() {
    pretty_env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            match usage_failure(&e) {
                Some(result) => emit(&result, false),
                None => {
                    let _ = e.print();
                }
            }
            return;
        }
    };

    let result = run(&cli);
    emit(&result, cli.pretty);
}

/// Converts a rejected command line into a failure response.
///
/// Returns `None` for `--help` and `--version`, which are printed as-is.
fn usage_failure(error: &clap::Error) -> Option<PredictionResult> {
    if matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    ) {
        return None;
    }
    Some(PredictionResult::failure(error.to_string().trim_end()))
}

fn run(cli: &Cli) -> PredictionResult {
    let config = cli.config();
    log::debug!("Using {config:?}");

    match read_payload(cli.input.as_deref()) {
        Ok(payload) => crime_hotspots::predict_from_json(&payload, &config),
        Err(e) => {
            log::error!("Failed to read request: {e}");
            PredictionResult::failure(format!("Failed to read input: {e}"))
        }
    }
}

/// Reads the whole request before any processing starts.
fn read_payload(input: Option<&Path>) -> std::io::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut payload = String::new();
            std::io::stdin().lock().read_to_string(&mut payload)?;
            Ok(payload)
        }
    }
}

fn render(result: &PredictionResult, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    };

    rendered.unwrap_or_else(|e| {
        log::error!("Failed to serialize response: {e}");
        FALLBACK_RESPONSE.to_string()
    })
}

fn emit(result: &PredictionResult, pretty: bool) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", render(result, pretty)).and_then(|()| stdout.flush()) {
        log::error!("Failed to write response: {e}");
    }
}
