//! The live organism collection and its per-tick update.
//!
//! [`OrganismRegistry::update_all`] runs the behavior state machine for
//! every organism present at the start of the tick, exactly once, walking
//! the list from the end to the front:
//!
//! 1. Locate the gas cell; organisms off the grid are skipped this tick.
//! 2. Decide whether the organism can breathe.
//! 3. Apply the hibernation hysteresis.
//! 4. Compute effective metabolism.
//! 5. Move (active only): chase sensed prey, else climb the gas gradient.
//! 6. Exchange gas with the cell located in step 1.
//! 7. Feed: capture one prey in range, else count another unfed tick.
//! 8. Maybe reproduce.
//! 9. Age.
//! 10. Die of starvation if unfed and depleted.
//!
//! Removing an organism at an index below the cursor shifts the current
//! organism down by one, so the cursor follows it. Children are appended
//! to the end of the list, behind the cursor, and first act next tick.

use rand::Rng;

use accretion_types::{Composition, LifeState, OrganismId, Species, WorldBounds};
use accretion_world::{BlockPool, GasField};

use crate::archetype::ArchetypeTable;
use crate::behavior::{can_breathe, exchange_gas, integrate_motion, next_life_state, steering_force};
use crate::config::BehaviorConfig;
use crate::death::{DeathCause, DeathRecord, check_starvation};
use crate::organism::Organism;
use crate::predation::{nearest_prey, sense_prey};
use crate::reproduction::maybe_reproduce;

/// Everything outside the registry that one update pass reads or writes.
pub struct UpdateContext<'a> {
    /// Gas grid, read for breathing and gradients, written by gas exchange.
    pub gas: &'a mut GasField,
    /// Block pool, receiving released compositions.
    pub pool: &'a mut BlockPool,
    /// Archetype lookup.
    pub archetypes: &'a ArchetypeTable,
    /// State machine parameters.
    pub config: &'a BehaviorConfig,
    /// World rectangle organisms wrap within.
    pub bounds: WorldBounds,
    /// Global speed multiplier.
    pub speed: f64,
}

/// A reproduction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthRecord {
    /// The parent organism.
    pub parent: OrganismId,
    /// The new child.
    pub child: OrganismId,
    /// Species of both.
    pub species: Species,
    /// The child's composition: new embedded mass.
    pub composition: Composition,
}

/// What happened during one [`OrganismRegistry::update_all`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Children born, in order.
    pub births: Vec<BirthRecord>,
    /// Organisms that died, in order.
    pub deaths: Vec<DeathRecord>,
    /// Predation feeding events.
    pub feedings: u32,
    /// Organisms that entered hibernation.
    pub hibernated: u32,
    /// Organisms that woke from hibernation.
    pub woke: u32,
    /// Organisms skipped because they were off the gas grid.
    pub skipped: u32,
}

impl UpdateReport {
    /// All blocks returned to the pool this pass.
    pub fn released(&self) -> Composition {
        let mut total = Composition::empty();
        for death in &self.deaths {
            total.merge(&death.released);
        }
        total
    }

    /// All embedded blocks created for children this pass.
    pub fn reproduced(&self) -> Composition {
        let mut total = Composition::empty();
        for birth in &self.births {
            total.merge(&birth.composition);
        }
        total
    }

    /// Number of deaths from starvation.
    pub fn deaths_by_starvation(&self) -> usize {
        self.deaths
            .iter()
            .filter(|d| d.cause == DeathCause::Starvation)
            .count()
    }
}

/// The live organism collection.
#[derive(Debug, Clone, Default)]
pub struct OrganismRegistry {
    organisms: Vec<Organism>,
}

impl OrganismRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            organisms: Vec::new(),
        }
    }

    /// Add an organism. It first acts on the next update pass.
    pub fn push(&mut self, organism: Organism) {
        self.organisms.push(organism);
    }

    /// Remove every organism.
    pub fn clear(&mut self) {
        self.organisms.clear();
    }

    /// Number of living organisms.
    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    /// Whether no organisms are alive.
    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    /// All living organisms, for rendering and statistics.
    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    /// Iterate over living organisms.
    pub fn iter(&self) -> impl Iterator<Item = &Organism> {
        self.organisms.iter()
    }

    /// Look up an organism by id.
    pub fn find(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.iter().find(|o| o.id == id)
    }

    /// Mutable lookup by id.
    pub fn find_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.organisms.iter_mut().find(|o| o.id == id)
    }

    /// Sum of every living organism's composition.
    pub fn embedded_composition(&self) -> Composition {
        let mut total = Composition::empty();
        for organism in &self.organisms {
            total.merge(organism.composition());
        }
        total
    }

    /// Run the behavior state machine once for every organism.
    #[allow(clippy::too_many_lines)]
    pub fn update_all(&mut self, ctx: &mut UpdateContext<'_>, rng: &mut impl Rng) -> UpdateReport {
        let mut report = UpdateReport::default();
        let archetypes = ctx.archetypes;
        let config = ctx.config;

        let mut i = self.organisms.len();
        while i > 0 {
            i = i.saturating_sub(1);

            let Some(current) = self.organisms.get(i) else {
                continue;
            };
            let Some(archetype) = archetypes.get(current.species) else {
                tracing::warn!(species = %current.species, "organism has no archetype, skipping");
                continue;
            };

            // 1. Locate the gas cell.
            let Some((row, col)) = ctx.gas.locate(current.position) else {
                report.skipped = report.skipped.saturating_add(1);
                continue;
            };
            let Some(cell) = ctx.gas.cell(row, col).copied() else {
                report.skipped = report.skipped.saturating_add(1);
                continue;
            };

            // 2. Respiration check.
            let breathing = can_breathe(&cell, archetype.breathes, config);

            // 3. Hibernation hysteresis.
            let previous = current.state;
            let next = next_life_state(
                previous,
                current.time_since_fed,
                current.starvation_resistance,
                breathing,
                config,
            );
            let active = next == LifeState::Active;

            // Steering reads the other organisms before this one is
            // borrowed mutably.
            let prey_position = if active {
                sense_prey(&self.organisms, i, archetype, config.sensing_radius)
            } else {
                None
            };

            let Some(organism) = self.organisms.get_mut(i) else {
                continue;
            };
            organism.state = next;
            match (previous, organism.state) {
                (LifeState::Active, LifeState::Hibernating) => {
                    report.hibernated = report.hibernated.saturating_add(1);
                }
                (LifeState::Hibernating, LifeState::Active) => {
                    report.woke = report.woke.saturating_add(1);
                }
                _ => {}
            }

            // 4. Effective metabolism.
            let metabolism = organism.effective_metabolism(config.hibernation_metabolism_factor);

            // 5. Movement.
            if active {
                let force = steering_force(
                    organism.position,
                    prey_position,
                    ctx.gas,
                    archetype,
                    config,
                    rng,
                );
                integrate_motion(
                    organism,
                    force,
                    archetype.max_speed,
                    ctx.speed,
                    config.damping,
                    ctx.bounds,
                );
            }

            // 6. Gas exchange with the cell located before moving.
            if let Some(cell) = ctx.gas.cell_mut(row, col) {
                exchange_gas(cell, organism, archetype, breathing, metabolism, config);
            }

            // 7. Feeding.
            let mut fed = false;
            let organism_id = organism.id;

            if active && !archetype.is_autotroph() {
                let capture = archetype.capture_radius(config.capture_margin);
                if let Some(j) = nearest_prey(&self.organisms, i, archetype, capture) {
                    let prey = self.organisms.remove(j);
                    let record = DeathRecord::new(
                        &prey,
                        DeathCause::Predation {
                            predator: organism_id,
                        },
                    );
                    ctx.pool
                        .release_composition(&record.released, record.position, rng);
                    tracing::debug!(
                        predator = %organism_id,
                        prey = %prey.id,
                        species = %prey.species,
                        "organism eaten"
                    );
                    report.deaths.push(record);
                    report.feedings = report.feedings.saturating_add(1);
                    if j < i {
                        i = i.saturating_sub(1);
                    }
                    if let Some(predator) = self.organisms.get_mut(i) {
                        predator.gain_energy(config.feeding_bonus, config.max_energy);
                    }
                    fed = true;
                }
            }

            let Some(organism) = self.organisms.get_mut(i) else {
                continue;
            };
            if fed {
                organism.mark_fed();
            } else {
                organism.time_since_fed = organism.time_since_fed.saturating_add(1);
            }

            // 8. Reproduction.
            let child = maybe_reproduce(organism, config, ctx.bounds, rng);

            // 9. Age.
            organism.age = organism.age.saturating_add(1);

            // 10. Starvation.
            let starved = check_starvation(organism, config);

            if let Some(child) = child {
                report.births.push(BirthRecord {
                    parent: organism_id,
                    child: child.id,
                    species: child.species,
                    composition: *child.composition(),
                });
                tracing::trace!(parent = %organism_id, child = %child.id, "organism reproduced");
                self.organisms.push(child);
            }

            if let Some(cause) = starved {
                let dead = self.organisms.remove(i);
                let record = DeathRecord::new(&dead, cause);
                ctx.pool
                    .release_composition(&record.released, record.position, rng);
                tracing::debug!(
                    organism_id = %dead.id,
                    species = %dead.species,
                    age = dead.age,
                    "organism starved"
                );
                report.deaths.push(record);
            }
        }

        report
    }
}
