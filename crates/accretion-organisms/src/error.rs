//! Error types for the accretion-organisms crate.
//!
//! The per-tick update never fails: out-of-grid organisms are skipped and
//! counters saturate. Errors arise only when building or querying the
//! archetype table.

use accretion_types::{BlockType, Species};

/// Errors that can occur during archetype and organism operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganismError {
    /// The archetype table has no entry for the species.
    #[error("no archetype registered for species {0}")]
    UnknownSpecies(Species),

    /// Two archetypes in one table share a species.
    #[error("duplicate archetype for species {0}")]
    DuplicateSpecies(Species),

    /// A recipe requires two block types that can never bond.
    #[error("recipe for {species} pairs incompatible blocks {first} and {second}")]
    IncompatibleRecipe {
        /// The species whose recipe is invalid.
        species: Species,
        /// One side of the incompatible pair.
        first: BlockType,
        /// The other side of the incompatible pair.
        second: BlockType,
    },

    /// An archetype parameter is out of range.
    #[error("invalid archetype for {species}: {reason}")]
    InvalidArchetype {
        /// The species whose archetype is invalid.
        species: Species,
        /// Description of the offending parameter.
        reason: String,
    },
}
