//! Shared type definitions for the Accretion simulation.
//!
//! This crate is the single source of truth for value types used across the
//! Accretion workspace. Types that the display collaborator reads are
//! exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for organisms and runs
//! - [`enums`] -- Block catalog, species, gases, lifecycle states
//! - [`structs`] -- Vectors, world bounds, compositions, statistics

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BlockType, Gas, LifeState, MembraneShape, Species};
pub use ids::{OrganismId, RunId};
pub use structs::{Composition, PopulationStats, SpeciesStats, Vec2, WorldBounds};
