//! Per-organism behavior: respiration, hibernation, movement, gas exchange.
//!
//! These are the pure building blocks of the state machine that
//! [`OrganismRegistry::update_all`] runs once per organism per tick. Each
//! function touches only what it is given, so every rule can be tested in
//! isolation.
//!
//! # Hibernation hysteresis
//!
//! ```text
//! Active      -> Hibernating  when time_since_fed > 0.5 * resistance and cannot breathe
//! Hibernating -> Active       when can breathe and time_since_fed < 0.3 * resistance
//! ```
//!
//! The gap between the two fractions keeps organisms from flapping between
//! states when conditions hover near a threshold.
//!
//! [`OrganismRegistry::update_all`]: crate::registry::OrganismRegistry::update_all

use rand::Rng;

use accretion_types::{Gas, LifeState, Vec2, WorldBounds};
use accretion_world::{GasCell, GasField, chance};

use crate::archetype::Archetype;
use crate::config::BehaviorConfig;
use crate::organism::Organism;

/// The 8 compass directions sampled for gradient seeking, as unit vectors.
const COMPASS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (core::f64::consts::FRAC_1_SQRT_2, core::f64::consts::FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-core::f64::consts::FRAC_1_SQRT_2, core::f64::consts::FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-core::f64::consts::FRAC_1_SQRT_2, -core::f64::consts::FRAC_1_SQRT_2),
    (0.0, -1.0),
    (core::f64::consts::FRAC_1_SQRT_2, -core::f64::consts::FRAC_1_SQRT_2),
];

/// Whether the consumed gas in `cell` is above the breathing threshold.
pub fn can_breathe(cell: &GasCell, breathes: Gas, config: &BehaviorConfig) -> bool {
    cell.level(breathes) > config.breath_threshold
}

/// Apply the hibernation hysteresis to the current state.
pub fn next_life_state(
    current: LifeState,
    time_since_fed: u64,
    starvation_resistance: f64,
    breathing: bool,
    config: &BehaviorConfig,
) -> LifeState {
    // Tick counters stay far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let hungry_for = time_since_fed as f64;
    match current {
        LifeState::Active
            if !breathing && hungry_for > config.hibernate_fraction * starvation_resistance =>
        {
            LifeState::Hibernating
        }
        LifeState::Hibernating
            if breathing && hungry_for < config.wake_fraction * starvation_resistance =>
        {
            LifeState::Active
        }
        state => state,
    }
}

/// The compass direction, one grid cell away, with the most of `gas`.
///
/// Samples that fall outside the grid are skipped. Returns `None` when no
/// sample lands on the grid. Ties go to the earlier compass direction.
pub fn gradient_direction(field: &GasField, position: Vec2, gas: Gas) -> Option<Vec2> {
    let step = field.cell_size();
    let mut best: Option<(Vec2, f64)> = None;
    for (dx, dy) in COMPASS {
        let direction = Vec2::new(dx, dy);
        let Some(level) = field.level_at(position + direction * step, gas) else {
            continue;
        };
        if best.is_none_or(|(_, best_level)| level > best_level) {
            best = Some((direction, level));
        }
    }
    best.map(|(direction, _)| direction)
}

/// The steering force for an active organism this tick.
///
/// With a sensed prey position the force points at it. Otherwise the
/// organism follows the gradient of the gas it breathes, plus a small
/// random jitter.
pub fn steering_force(
    position: Vec2,
    prey_position: Option<Vec2>,
    field: &GasField,
    archetype: &Archetype,
    config: &BehaviorConfig,
    rng: &mut impl Rng,
) -> Vec2 {
    if let Some(target) = prey_position {
        return (target - position)
            .normalized()
            .map_or(Vec2::ZERO, |direction| direction * config.prey_weight);
    }
    let gradient = gradient_direction(field, position, archetype.breathes)
        .map_or(Vec2::ZERO, |direction| direction * config.gradient_weight);
    gradient + chance::jitter(rng, config.jitter_weight)
}

/// Integrate one tick of motion: accelerate, damp, clamp, move, wrap.
pub fn integrate_motion(
    organism: &mut Organism,
    force: Vec2,
    max_speed: f64,
    speed: f64,
    damping: f64,
    bounds: WorldBounds,
) {
    let velocity = (organism.velocity + force * speed) * damping;
    organism.velocity = velocity.clamp_length(max_speed * speed);
    organism.position = bounds.wrap(organism.position + organism.velocity);
}

/// Breathe (or suffocate) for one tick.
///
/// A breathing organism draws its consumed gas from `cell`, releases its
/// produced gas into it, and spends its effective metabolism in energy. A
/// suffocating organism leaves the cell alone and pays a penalty instead.
pub fn exchange_gas(
    cell: &mut GasCell,
    organism: &mut Organism,
    archetype: &Archetype,
    breathing: bool,
    metabolism: f64,
    config: &BehaviorConfig,
) {
    if breathing {
        cell.adjust(archetype.breathes, -config.consume_factor * metabolism);
        cell.adjust(archetype.produces, config.produce_factor * metabolism);
        organism.spend_energy(metabolism);
    } else {
        organism.spend_energy(config.suffocation_factor * metabolism);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeTable;
    use accretion_types::Species;
    use accretion_world::GasConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn archetype(species: Species) -> Archetype {
        ArchetypeTable::default().require(species).unwrap().clone()
    }

    fn organism(species: Species, position: Vec2) -> Organism {
        Organism::from_archetype(&archetype(species), position, Vec2::ZERO, 100.0)
    }

    #[test]
    fn breathing_threshold_is_strict() {
        let config = BehaviorConfig::default();
        let mut cell = GasCell::uniform(50.0);
        assert!(can_breathe(&cell, Gas::Oxygen, &config));
        cell.oxygen = 10.0;
        assert!(!can_breathe(&cell, Gas::Oxygen, &config));
        assert!(can_breathe(&cell, Gas::CarbonDioxide, &config));
    }

    #[test]
    fn hibernation_requires_both_conditions() {
        let config = BehaviorConfig::default();
        // Resistance 300: hibernate above 150, wake below 90.
        assert_eq!(
            next_life_state(LifeState::Active, 151, 300.0, true, &config),
            LifeState::Active
        );
        assert_eq!(
            next_life_state(LifeState::Active, 150, 300.0, false, &config),
            LifeState::Active
        );
        assert_eq!(
            next_life_state(LifeState::Active, 151, 300.0, false, &config),
            LifeState::Hibernating
        );
    }

    #[test]
    fn waking_uses_lower_threshold() {
        let config = BehaviorConfig::default();
        // Breathing again but still hungry: stays asleep inside the band.
        assert_eq!(
            next_life_state(LifeState::Hibernating, 120, 300.0, true, &config),
            LifeState::Hibernating
        );
        assert_eq!(
            next_life_state(LifeState::Hibernating, 89, 300.0, false, &config),
            LifeState::Hibernating
        );
        assert_eq!(
            next_life_state(LifeState::Hibernating, 89, 300.0, true, &config),
            LifeState::Active
        );
    }

    #[test]
    fn hibernation_is_monotonic_without_feeding() {
        let config = BehaviorConfig::default();
        let mut state = LifeState::Active;
        let mut was_hibernating = false;
        for tsf in 0..1000 {
            state = next_life_state(state, tsf, 300.0, false, &config);
            let hibernating = state == LifeState::Hibernating;
            assert!(hibernating || !was_hibernating);
            was_hibernating = hibernating;
        }
        assert!(was_hibernating);
    }

    #[test]
    fn gradient_points_at_richer_cell() {
        let mut field =
            GasField::new(WorldBounds::new(200.0, 200.0), &GasConfig::default()).unwrap();
        // Organism in cell (5, 5); enrich the cell to its east.
        if let Some(cell) = field.cell_mut(5, 6) {
            cell.oxygen = 90.0;
        }
        let direction = gradient_direction(&field, Vec2::new(110.0, 110.0), Gas::Oxygen).unwrap();
        assert_eq!(direction, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn gradient_skips_samples_off_grid() {
        let field = GasField::new(WorldBounds::new(20.0, 20.0), &GasConfig::default()).unwrap();
        // Single-cell grid: every sample one cell away is off the grid.
        assert!(gradient_direction(&field, Vec2::new(10.0, 10.0), Gas::Oxygen).is_none());
    }

    #[test]
    fn prey_force_points_at_prey() {
        let field = GasField::new(WorldBounds::new(200.0, 200.0), &GasConfig::default()).unwrap();
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let force = steering_force(
            Vec2::new(50.0, 50.0),
            Some(Vec2::new(50.0, 80.0)),
            &field,
            &archetype(Species::Hunter),
            &config,
            &mut rng,
        );
        assert!(force.x.abs() < 1e-12);
        assert!((force.y - config.prey_weight).abs() < 1e-12);
    }

    #[test]
    fn motion_is_clamped_and_wrapped() {
        let mut o = organism(Species::Grazer, Vec2::new(199.0, 100.0));
        o.velocity = Vec2::new(50.0, 0.0);
        integrate_motion(&mut o, Vec2::ZERO, 1.2, 1.0, 0.96, WorldBounds::new(200.0, 200.0));
        assert!((o.velocity.length() - 1.2).abs() < 1e-9);
        assert!((o.position.x - 0.2).abs() < 1e-9);
    }

    #[test]
    fn breathing_exchanges_gas_and_spends_energy() {
        let config = BehaviorConfig::default();
        let alga = archetype(Species::Alga);
        let mut o = organism(Species::Alga, Vec2::ZERO);
        let mut cell = GasCell::uniform(50.0);
        exchange_gas(&mut cell, &mut o, &alga, true, 0.5, &config);
        assert!((cell.co2 - 49.0).abs() < 1e-12);
        assert!((cell.oxygen - 51.5).abs() < 1e-12);
        assert!((o.energy - 99.5).abs() < 1e-12);
    }

    #[test]
    fn suffocation_costs_double_and_leaves_cell() {
        let config = BehaviorConfig::default();
        let alga = archetype(Species::Alga);
        let mut o = organism(Species::Alga, Vec2::ZERO);
        let mut cell = GasCell::uniform(5.0);
        exchange_gas(&mut cell, &mut o, &alga, false, 0.5, &config);
        assert_eq!(cell, GasCell::uniform(5.0));
        assert!((o.energy - 99.0).abs() < 1e-12);
    }
}
