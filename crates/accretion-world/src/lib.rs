//! The physical medium of the Accretion simulation.
//!
//! This crate models everything in the world that is not alive: the coarse
//! oxygen/CO2 grid organisms breathe from, and the pool of free building
//! blocks organisms are assembled from.
//!
//! # Modules
//!
//! - [`blocks`] -- [`BlockPool`] of free [`BuildingBlock`]s with damped
//!   drift, neighbour attraction, spontaneous generation and release.
//! - [`chance`] -- Panic-free random draws (Bernoulli rolls, jitter,
//!   random positions) used by every stochastic update.
//! - [`error`] -- Error types for world construction.
//! - [`gas`] -- [`GasField`] grid with double-buffered diffusion and
//!   relaxation toward baseline.

pub mod blocks;
pub mod chance;
pub mod error;
pub mod gas;

// Re-export primary types at crate root.
pub use blocks::{BlockConfig, BlockPool, BuildingBlock};
pub use error::WorldError;
pub use gas::{GAS_MAX, GAS_MIN, GasCell, GasConfig, GasField};
