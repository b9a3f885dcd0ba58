//! Tunable parameters for formation and organism behavior.
//!
//! These values correspond to the `formation` and `behavior` sections of
//! `accretion-config.yaml`. Every numeric constant the state machine uses
//! lives here so that the tick cycle and tests can override defaults; the
//! defaults are reference values, not physical law.

use serde::{Deserialize, Serialize};

/// Parameters for the formation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationConfig {
    /// Per-archetype, per-tick probability of attempting a formation (default: 0.0008).
    #[serde(default = "default_attempt_chance")]
    pub attempt_chance: f64,

    /// Neighbourhood radius around the seed block in world units (default: 32).
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Half-width of each velocity component of a new organism (default: 0.5).
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f64,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            attempt_chance: default_attempt_chance(),
            radius: default_radius(),
            initial_speed: default_initial_speed(),
        }
    }
}

const fn default_attempt_chance() -> f64 {
    0.0008
}

const fn default_radius() -> f64 {
    32.0
}

const fn default_initial_speed() -> f64 {
    0.5
}

/// Parameters for the per-organism behavior state machine.
///
/// Energy values are on the `[0, 100]` scale; rates are per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Consumed-gas level an organism needs to breathe (default: 10).
    pub breath_threshold: f64,

    /// Fraction of starvation resistance past which a suffocating organism
    /// hibernates (default: 0.5).
    pub hibernate_fraction: f64,

    /// Fraction of starvation resistance below which a breathing organism
    /// wakes (default: 0.3).
    pub wake_fraction: f64,

    /// Metabolism multiplier while hibernating (default: 0.1).
    pub hibernation_metabolism_factor: f64,

    /// Radius within which predators notice prey (default: 130).
    pub sensing_radius: f64,

    /// Force magnitude toward sensed prey (default: 0.1).
    pub prey_weight: f64,

    /// Force magnitude along the best gas gradient direction (default: 0.05).
    pub gradient_weight: f64,

    /// Half-width of the random jitter force per component (default: 0.03).
    pub jitter_weight: f64,

    /// Velocity multiplier applied each tick while active (default: 0.96).
    pub damping: f64,

    /// Consumed gas removed per unit of effective metabolism (default: 2).
    pub consume_factor: f64,

    /// Produced gas added per unit of effective metabolism (default: 3).
    pub produce_factor: f64,

    /// Energy lost per unit of effective metabolism when suffocating (default: 2).
    pub suffocation_factor: f64,

    /// Distance added to the archetype size to form the capture radius (default: 2.5).
    pub capture_margin: f64,

    /// Energy gained by eating one prey (default: 30).
    pub feeding_bonus: f64,

    /// Energy ceiling (default: 100).
    pub max_energy: f64,

    /// Energy an organism must exceed to reproduce (default: 70).
    pub reproduction_energy: f64,

    /// `time_since_fed` must be below this to reproduce (default: 55).
    pub reproduction_fed_window: u64,

    /// Per-tick probability of reproducing once eligible (default: 0.002).
    pub reproduction_chance: f64,

    /// Starting energy of a child (default: 60).
    pub child_energy: f64,

    /// Parent energy after reproducing (default: 50).
    pub parent_energy_after: f64,

    /// Relative spread of the mutation applied to inherited traits (default: 0.05).
    pub mutation_spread: f64,

    /// Half-width of the child's position offset from its parent (default: 10).
    pub child_jitter: f64,

    /// Half-width of each velocity component of a child (default: 0.5).
    pub child_speed: f64,

    /// A starving organism dies at or below this energy (default: 10).
    pub death_energy: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            breath_threshold: 10.0,
            hibernate_fraction: 0.5,
            wake_fraction: 0.3,
            hibernation_metabolism_factor: 0.1,
            sensing_radius: 130.0,
            prey_weight: 0.1,
            gradient_weight: 0.05,
            jitter_weight: 0.03,
            damping: 0.96,
            consume_factor: 2.0,
            produce_factor: 3.0,
            suffocation_factor: 2.0,
            capture_margin: 2.5,
            feeding_bonus: 30.0,
            max_energy: 100.0,
            reproduction_energy: 70.0,
            reproduction_fed_window: 55,
            reproduction_chance: 0.002,
            child_energy: 60.0,
            parent_energy_after: 50.0,
            mutation_spread: 0.05,
            child_jitter: 10.0,
            child_speed: 0.5,
            death_energy: 10.0,
        }
    }
}
