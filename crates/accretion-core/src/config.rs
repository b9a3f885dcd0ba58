//! Configuration loading and typed config structures for the Accretion simulation.
//!
//! The canonical configuration lives in `accretion-config.yaml` at the
//! project root. Every section is optional: a missing section, or a missing
//! key inside one, falls back to the reference defaults. The gas, block,
//! formation, and behavior sections reuse the config types of the crates
//! that consume them.

use std::path::Path;

use serde::Deserialize;

use accretion_organisms::{BehaviorConfig, FormationConfig};
use accretion_types::WorldBounds;
use accretion_world::{BlockConfig, GasConfig};

/// Environment variable that overrides `world.seed` when loading from a file.
pub const SEED_ENV_VAR: &str = "ACCRETION_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Which value is wrong and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `accretion-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World size, seed, and global movement parameters.
    #[serde(default)]
    pub world: WorldConfig,

    /// Gas grid resolution and diffusion constants.
    #[serde(default)]
    pub gas: GasConfig,

    /// Free block drift, attraction, and spawning.
    #[serde(default)]
    pub blocks: BlockConfig,

    /// Formation engine parameters.
    #[serde(default)]
    pub formation: FormationConfig,

    /// Organism behavior constants.
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Run boundaries and host loop timing.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ACCRETION_SEED`, when set, overrides `world.seed`. The result is
    /// validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range or the seed
    /// override is not an unsigned integer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_seed_override(std::env::var(SEED_ENV_VAR).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Unlike [`SimulationConfig::from_file`], the environment is not
    /// consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace `world.seed` with `value` if one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `value` is not a `u64`.
    pub fn apply_seed_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = value else {
            return Ok(());
        };
        let seed = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
            reason: format!("{SEED_ENV_VAR}={raw:?} is not an unsigned integer: {e}"),
        })?;
        self.world.seed = seed;
        Ok(())
    }

    /// Check every value that would make the world unconstructible or the
    /// random rolls meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("world.width", self.world.width)?;
        require_positive("world.height", self.world.height)?;
        require_positive("world.global_speed", self.world.global_speed)?;
        require_positive("gas.cell_size", self.gas.cell_size)?;
        require_non_negative("world.attraction_range", self.world.attraction_range)?;
        require_non_negative("formation.radius", self.formation.radius)?;
        require_probability("blocks.attraction_chance", self.blocks.attraction_chance)?;
        require_probability("blocks.spawn_chance", self.blocks.spawn_chance)?;
        require_probability("formation.attempt_chance", self.formation.attempt_chance)?;
        require_probability("behavior.reproduction_chance", self.behavior.reproduction_chance)?;
        validate_behavior(&self.behavior)
    }
}

fn validate_behavior(behavior: &BehaviorConfig) -> Result<(), ConfigError> {
    require_positive("behavior.max_energy", behavior.max_energy)?;
    for (name, value) in [
        ("behavior.death_energy", behavior.death_energy),
        ("behavior.reproduction_energy", behavior.reproduction_energy),
        ("behavior.child_energy", behavior.child_energy),
        ("behavior.parent_energy_after", behavior.parent_energy_after),
    ] {
        require_non_negative(name, value)?;
        require_at_most(name, value, "behavior.max_energy", behavior.max_energy)?;
    }
    for (name, value) in [
        ("behavior.breath_threshold", behavior.breath_threshold),
        ("behavior.sensing_radius", behavior.sensing_radius),
        ("behavior.prey_weight", behavior.prey_weight),
        ("behavior.gradient_weight", behavior.gradient_weight),
        ("behavior.jitter_weight", behavior.jitter_weight),
        ("behavior.consume_factor", behavior.consume_factor),
        ("behavior.produce_factor", behavior.produce_factor),
        ("behavior.suffocation_factor", behavior.suffocation_factor),
        ("behavior.capture_margin", behavior.capture_margin),
        ("behavior.feeding_bonus", behavior.feeding_bonus),
        ("behavior.mutation_spread", behavior.mutation_spread),
        ("behavior.child_jitter", behavior.child_jitter),
        ("behavior.child_speed", behavior.child_speed),
    ] {
        require_non_negative(name, value)?;
    }
    for (name, value) in [
        ("behavior.hibernate_fraction", behavior.hibernate_fraction),
        ("behavior.wake_fraction", behavior.wake_fraction),
        (
            "behavior.hibernation_metabolism_factor",
            behavior.hibernation_metabolism_factor,
        ),
        ("behavior.damping", behavior.damping),
    ] {
        require_probability(name, value)?;
    }
    require_at_most(
        "behavior.wake_fraction",
        behavior.wake_fraction,
        "behavior.hibernate_fraction",
        behavior.hibernate_fraction,
    )
}

fn require_at_most(name: &str, value: f64, limit_name: &str, limit: f64) -> Result<(), ConfigError> {
    if value <= limit {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must not exceed {limit_name} ({limit}), got {value}"),
        })
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be positive and finite, got {value}"),
        })
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be non-negative and finite, got {value}"),
        })
    }
}

fn require_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be within [0, 1], got {value}"),
        })
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// World width in world units.
    #[serde(default = "default_width")]
    pub width: f64,

    /// World height in world units.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Free blocks scattered on construction and on every reset.
    #[serde(default = "default_initial_block_count")]
    pub initial_block_count: u32,

    /// Multiplier on every displacement per tick.
    #[serde(default = "default_global_speed")]
    pub global_speed: f64,

    /// Radius within which free blocks attract each other.
    #[serde(default = "default_attraction_range")]
    pub attraction_range: f64,
}

impl WorldConfig {
    /// The toroidal world rectangle.
    pub const fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width, self.height)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_width(),
            height: default_height(),
            initial_block_count: default_initial_block_count(),
            global_speed: default_global_speed(),
            attraction_range: default_attraction_range(),
        }
    }
}

/// Run boundaries and host loop timing.
///
/// A value of 0 for either `max_ticks` or `max_real_time_seconds` means
/// unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Real-time milliseconds slept between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Whether the loop starts running or waits for the host to start it.
    #[serde(default = "default_true")]
    pub start_running: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            max_real_time_seconds: 0,
            tick_interval_ms: default_tick_interval_ms(),
            start_running: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Population stats are logged every N ticks (0 = never).
    #[serde(default = "default_stats_interval_ticks")]
    pub stats_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            stats_interval_ticks: default_stats_interval_ticks(),
        }
    }
}

fn default_world_name() -> String {
    "Accretion".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_width() -> f64 {
    800.0
}

const fn default_height() -> f64 {
    600.0
}

const fn default_initial_block_count() -> u32 {
    300
}

const fn default_global_speed() -> f64 {
    1.0
}

const fn default_attraction_range() -> f64 {
    40.0
}

const fn default_tick_interval_ms() -> u64 {
    16
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_stats_interval_ticks() -> u64 {
    100
}
