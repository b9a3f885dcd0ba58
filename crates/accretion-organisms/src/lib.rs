//! Organisms, their recipes, and their lifecycle for the Accretion simulation.
//!
//! This crate contains the living half of the world: how organisms form
//! from free blocks, how they behave each tick, and how they return their
//! blocks on death. It sits between `accretion-world` (the gas field and
//! block pool it reads and mutates) and `accretion-core` (which orchestrates
//! the tick and keeps the ledger).
//!
//! # Modules
//!
//! - [`archetype`] -- Static recipe table ([`ArchetypeTable`]) and block
//!   compatibility rules
//! - [`behavior`] -- Respiration, hibernation hysteresis, steering, gas exchange
//! - [`config`] -- Tunable parameters ([`FormationConfig`], [`BehaviorConfig`])
//! - [`death`] -- Death conditions and records ([`DeathCause`], [`DeathRecord`])
//! - [`error`] -- Error types for archetype operations ([`OrganismError`])
//! - [`formation`] -- The formation engine ([`try_form`])
//! - [`organism`] -- Per-instance [`Organism`] state
//! - [`predation`] -- Nearest-prey search for sensing and capture
//! - [`registry`] -- The live collection and its per-tick update
//!   ([`OrganismRegistry`], [`UpdateReport`])
//! - [`reproduction`] -- Eligibility, budding, and trait mutation

pub mod archetype;
pub mod behavior;
pub mod config;
pub mod death;
pub mod error;
pub mod formation;
pub mod organism;
pub mod predation;
pub mod registry;
pub mod reproduction;

// Re-export primary types at crate root for convenience.
pub use archetype::{Archetype, ArchetypeTable, are_compatible};
pub use config::{BehaviorConfig, FormationConfig};
pub use death::{DeathCause, DeathRecord};
pub use error::OrganismError;
pub use formation::{FormationOutcome, FormationPlan, FormationRejection, plan_formation, try_form};
pub use organism::Organism;
pub use registry::{BirthRecord, OrganismRegistry, UpdateContext, UpdateReport};
