//! Asexual reproduction.
//!
//! An eligible organism -- well fed and recently fed -- has a small chance
//! each tick to bud off a child. The child copies the parent's species and
//! composition. Its starvation resistance and metabolism rate are the
//! parent's current values each scaled by an independent factor in
//! `[1 - spread, 1 + spread]`, so traits drift across generations.
//!
//! Reproduction does not touch the block pool. The child's composition is
//! new embedded mass, which the block ledger records as a reproduction flow.

use rand::Rng;

use accretion_types::WorldBounds;
use accretion_world::chance;

use crate::config::BehaviorConfig;
use crate::organism::Organism;

/// Whether `organism` meets the energy and recent-feeding thresholds.
pub fn is_eligible(organism: &Organism, config: &BehaviorConfig) -> bool {
    organism.energy > config.reproduction_energy
        && organism.time_since_fed < config.reproduction_fed_window
}

/// Create a child of `parent` and charge the parent for it.
///
/// Sets the parent's energy to `parent_energy_after`.
pub fn reproduce(
    parent: &mut Organism,
    config: &BehaviorConfig,
    bounds: WorldBounds,
    rng: &mut impl Rng,
) -> Organism {
    let position = bounds.wrap(parent.position + chance::jitter(rng, config.child_jitter));
    let velocity = chance::jitter(rng, config.child_speed);
    let resistance = chance::perturb(rng, parent.starvation_resistance, config.mutation_spread);
    let metabolism = chance::perturb(rng, parent.metabolism_rate, config.mutation_spread);

    let child = Organism::offspring(
        parent,
        position,
        velocity,
        config.child_energy,
        resistance,
        metabolism,
    );
    parent.energy = config.parent_energy_after;
    child
}

/// Roll for reproduction and, on success, return the child.
pub fn maybe_reproduce(
    parent: &mut Organism,
    config: &BehaviorConfig,
    bounds: WorldBounds,
    rng: &mut impl Rng,
) -> Option<Organism> {
    if !is_eligible(parent, config) || !chance::roll(rng, config.reproduction_chance) {
        return None;
    }
    Some(reproduce(parent, config, bounds, rng))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeTable;
    use accretion_types::{LifeState, Species, Vec2};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn parent() -> Organism {
        let table = ArchetypeTable::default();
        let mut o = Organism::from_archetype(
            table.require(Species::Sporeling).unwrap(),
            Vec2::new(100.0, 100.0),
            Vec2::ZERO,
            90.0,
        );
        o.age = 40;
        o.time_since_fed = 10;
        o
    }

    #[test]
    fn eligibility_thresholds() {
        let config = BehaviorConfig::default();
        let mut o = parent();
        assert!(is_eligible(&o, &config));
        o.energy = 70.0;
        assert!(!is_eligible(&o, &config));
        o.energy = 80.0;
        o.time_since_fed = 55;
        assert!(!is_eligible(&o, &config));
    }

    #[test]
    fn child_and_parent_energy_are_fixed() {
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut p = parent();
        let child = reproduce(&mut p, &config, WorldBounds::new(400.0, 400.0), &mut rng);
        assert_eq!(p.energy, 50.0);
        assert_eq!(child.energy, 60.0);
        assert_eq!(child.age, 0);
        assert_eq!(child.time_since_fed, 0);
        assert_eq!(child.state, LifeState::Active);
        assert_eq!(child.composition(), p.composition());
        assert!(child.position.distance(p.position) <= 10.0 * core::f64::consts::SQRT_2);
    }

    #[test]
    fn traits_mutate_within_spread() {
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..200 {
            let mut p = parent();
            let child = reproduce(&mut p, &config, WorldBounds::new(400.0, 400.0), &mut rng);
            let ratio = child.starvation_resistance / p.starvation_resistance;
            assert!((0.95..=1.05).contains(&ratio));
            let ratio = child.metabolism_rate / p.metabolism_rate;
            assert!((0.95..=1.05).contains(&ratio));
        }
    }

    #[test]
    fn certain_chance_reproduces_only_when_eligible() {
        let config = BehaviorConfig {
            reproduction_chance: 1.0,
            ..BehaviorConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        let mut p = parent();
        assert!(maybe_reproduce(&mut p, &config, WorldBounds::new(400.0, 400.0), &mut rng).is_some());
        // Energy is now 50: no longer eligible.
        assert!(maybe_reproduce(&mut p, &config, WorldBounds::new(400.0, 400.0), &mut rng).is_none());
    }
}
