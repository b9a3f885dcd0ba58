//! Per-instance organism state.

use accretion_types::{Composition, LifeState, OrganismId, Species, Vec2};

use crate::archetype::Archetype;

/// Lowest energy an organism can hold.
pub const MIN_ENERGY: f64 = 0.0;

/// A living organism.
///
/// `composition` is fixed at creation: it is the block budget returned to
/// the pool when the organism dies or is eaten.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    /// Unique identifier.
    pub id: OrganismId,
    /// Species, keying into the archetype table.
    pub species: Species,
    /// Position in world units.
    pub position: Vec2,
    /// Velocity in world units per tick, before the global speed factor.
    pub velocity: Vec2,
    /// Energy in `[0, max_energy]`.
    pub energy: f64,
    /// Ticks lived.
    pub age: u64,
    /// Ticks since the last feeding event.
    pub time_since_fed: u64,
    /// Active or hibernating.
    pub state: LifeState,
    /// Inherited, mutated copy of the archetype's starvation time.
    pub starvation_resistance: f64,
    /// Inherited, mutated copy of the archetype's metabolism rate.
    pub metabolism_rate: f64,
    /// Blocks this organism is built from.
    composition: Composition,
}

impl Organism {
    /// A freshly formed organism: full energy, active, with the archetype's
    /// base traits and recipe.
    pub fn from_archetype(archetype: &Archetype, position: Vec2, velocity: Vec2, energy: f64) -> Self {
        Self {
            id: OrganismId::new(),
            species: archetype.species,
            position,
            velocity,
            energy,
            age: 0,
            time_since_fed: 0,
            state: LifeState::Active,
            starvation_resistance: archetype.starvation_time,
            metabolism_rate: archetype.metabolism_rate,
            composition: archetype.recipe,
        }
    }

    /// A new organism sharing `parent`'s species and composition.
    ///
    /// Traits are taken as given; mutation is the caller's concern.
    pub fn offspring(
        parent: &Self,
        position: Vec2,
        velocity: Vec2,
        energy: f64,
        starvation_resistance: f64,
        metabolism_rate: f64,
    ) -> Self {
        Self {
            id: OrganismId::new(),
            species: parent.species,
            position,
            velocity,
            energy,
            age: 0,
            time_since_fed: 0,
            state: LifeState::Active,
            starvation_resistance,
            metabolism_rate,
            composition: parent.composition,
        }
    }

    /// The immutable block composition.
    pub const fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Whether the organism is hibernating.
    pub const fn is_hibernating(&self) -> bool {
        matches!(self.state, LifeState::Hibernating)
    }

    /// Metabolism after the hibernation reduction.
    pub fn effective_metabolism(&self, hibernation_factor: f64) -> f64 {
        if self.is_hibernating() {
            self.metabolism_rate * hibernation_factor
        } else {
            self.metabolism_rate
        }
    }

    /// Add energy, capped at `max_energy`.
    pub fn gain_energy(&mut self, amount: f64, max_energy: f64) {
        self.energy = (self.energy + amount).min(max_energy).max(MIN_ENERGY);
    }

    /// Remove energy, floored at zero.
    pub fn spend_energy(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(MIN_ENERGY);
    }

    /// Record a feeding event.
    pub const fn mark_fed(&mut self) {
        self.time_since_fed = 0;
    }
}
