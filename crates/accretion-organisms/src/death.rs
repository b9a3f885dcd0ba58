//! Death conditions and consequences for organisms.
//!
//! Organisms die in one of two ways:
//! - Starvation: unfed for longer than their resistance with energy at or
//!   below the death threshold.
//! - Predation: eaten by a predator.
//!
//! Either way the organism's full composition re-enters the block pool as
//! fresh free blocks scattered around its last position.

use accretion_types::{Composition, OrganismId, Species, Vec2};

use crate::config::BehaviorConfig;
use crate::organism::Organism;

/// The cause of an organism's death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Unfed past its starvation resistance and out of energy.
    Starvation,
    /// Eaten by a predator.
    Predation {
        /// The organism that ate it.
        predator: OrganismId,
    },
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::Predation { .. } => write!(f, "predation"),
        }
    }
}

/// Check whether an organism meets the starvation death condition.
///
/// Returns `Some(cause)` if the organism is dead, `None` if alive. This
/// only inspects state; it does not mutate anything.
pub fn check_starvation(organism: &Organism, config: &BehaviorConfig) -> Option<DeathCause> {
    // Tick counters stay far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let hungry_for = organism.time_since_fed as f64;
    if hungry_for > organism.starvation_resistance && organism.energy <= config.death_energy {
        Some(DeathCause::Starvation)
    } else {
        None
    }
}

/// What remains of an organism after death, for logging and ledger posting.
#[derive(Debug, Clone, PartialEq)]
pub struct DeathRecord {
    /// The organism that died.
    pub organism_id: OrganismId,
    /// Its species.
    pub species: Species,
    /// How it died.
    pub cause: DeathCause,
    /// Age at death in ticks.
    pub age: u64,
    /// Where it died; released blocks scatter around this point.
    pub position: Vec2,
    /// The blocks returned to the pool.
    pub released: Composition,
}

impl DeathRecord {
    /// Build the record for `organism` dying of `cause`.
    pub fn new(organism: &Organism, cause: DeathCause) -> Self {
        Self {
            organism_id: organism.id,
            species: organism.species,
            cause,
            age: organism.age,
            position: organism.position,
            released: *organism.composition(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeTable;

    fn starving() -> Organism {
        let table = ArchetypeTable::default();
        let mut o = Organism::from_archetype(
            table.require(Species::Hunter).unwrap(),
            Vec2::new(3.0, 4.0),
            Vec2::ZERO,
            10.0,
        );
        o.time_since_fed = 351;
        o
    }

    #[test]
    fn starvation_needs_both_conditions() {
        let config = BehaviorConfig::default();
        let mut o = starving();
        assert_eq!(check_starvation(&o, &config), Some(DeathCause::Starvation));

        o.energy = 10.5;
        assert_eq!(check_starvation(&o, &config), None);

        o.energy = 0.0;
        o.time_since_fed = 350;
        assert_eq!(check_starvation(&o, &config), None);
    }

    #[test]
    fn record_carries_full_composition() {
        let o = starving();
        let record = DeathRecord::new(&o, DeathCause::Starvation);
        assert_eq!(record.released.total(), 6);
        assert_eq!(record.position, Vec2::new(3.0, 4.0));
        assert_eq!(record.cause.to_string(), "starvation");
    }
}
