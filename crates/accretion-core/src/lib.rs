//! Core engine for the Accretion simulation.
//!
//! This crate owns the whole world and the loop that advances it. It loads
//! configuration, builds the [`WorldState`] that every update phase reads
//! and writes, runs the tick cycle, and summarizes the population.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with overflow checking
//! - [`config`] -- YAML configuration loading and validation
//! - [`operator`] -- Host run-control shared with the tick loop ([`HostControl`])
//! - [`runner`] -- Async loop around the tick cycle with run boundaries
//! - [`state`] -- The complete mutable world ([`WorldState`])
//! - [`stats`] -- Population statistics aggregator
//! - [`tick`] -- The five-phase tick cycle ([`run_tick`])

pub mod clock;
pub mod config;
pub mod operator;
pub mod runner;
pub mod state;
pub mod stats;
pub mod tick;

// Re-export primary types at crate root for convenience.
pub use clock::{ClockError, WorldClock};
pub use config::{ConfigError, LoggingConfig, RunConfig, SimulationConfig, WorldConfig};
pub use operator::{HostControl, RunEndReason};
pub use runner::{NoOpCallback, RunResult, RunnerError, TickCallback, run_simulation};
pub use state::{StateError, WorldState};
pub use tick::{TickError, TickSummary, run_tick};
