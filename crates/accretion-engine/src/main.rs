//! Headless host binary for the Accretion simulation.
//!
//! Loads configuration, builds the world, and runs the tick loop until a
//! run boundary is reached or the process receives Ctrl-C. A display front
//! end would replace this binary and drive the same [`HostControl`].
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `accretion-config.yaml` (or the path given
//!    as the first argument), falling back to defaults if it is missing
//! 2. Initialize structured logging (tracing)
//! 3. Build the world state
//! 4. Create host control and hook Ctrl-C to a clean stop
//! 5. Run the simulation loop
//! 6. Log the result

mod error;
mod stats_logger;

use std::path::PathBuf;
use std::sync::Arc;

use accretion_core::{HostControl, SimulationConfig, WorldState, runner};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::stats_logger::StatsLogger;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "accretion-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, world setup, or the run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("accretion-engine starting");
    info!(
        source = %config_source,
        world_name = config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        initial_block_count = config.world.initial_block_count,
        tick_interval_ms = config.simulation.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Build the world.
    let stats_interval = config.logging.stats_interval_ticks;
    let control = Arc::new(HostControl::new(&config.simulation));
    let mut state = WorldState::new(config).map_err(EngineError::from)?;

    // 4. Ctrl-C requests a clean stop between ticks.
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current tick");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }
    if !control.is_running() {
        info!("start_running is false; waiting for the host to start the loop");
    }

    // 5. Run the simulation.
    let mut callback = StatsLogger::new(stats_interval);
    let result = runner::run_simulation(&mut state, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_run_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        ledger_anomalies = state.ledger().anomaly_count(),
        "accretion-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration and describe where it came from.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let mut config = SimulationConfig::default();
        let seed = std::env::var(accretion_core::config::SEED_ENV_VAR).ok();
        config.apply_seed_override(seed.as_deref())?;
        Ok((config, "defaults".to_owned()))
    }
}
