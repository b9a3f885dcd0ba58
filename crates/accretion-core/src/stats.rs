//! Population statistics.
//!
//! [`summarize`] is a pure read over the registry, pool, and gas field.
//! Every mean over an empty population is reported as zero.

use accretion_organisms::OrganismRegistry;
use accretion_types::{PopulationStats, RunId, Species, SpeciesStats};
use accretion_world::{BlockPool, GasField};

/// Running sums for one group of organisms.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: u32,
    energy: f64,
    age: f64,
    resistance: f64,
    metabolism: f64,
}

impl Accumulator {
    fn mean(&self, sum: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            sum / f64::from(self.count)
        }
    }
}

/// Build the stats summary for `tick`.
pub fn summarize(
    run_id: RunId,
    tick: u64,
    registry: &OrganismRegistry,
    pool: &BlockPool,
    gas: &GasField,
) -> PopulationStats {
    let mut all = Accumulator::default();
    let mut per_species = [Accumulator::default(); Species::COUNT];
    let mut hibernating_count: u32 = 0;

    for organism in registry.iter() {
        // Tick counters stay far below 2^52.
        #[allow(clippy::cast_precision_loss)]
        let age = organism.age as f64;

        all.count = all.count.saturating_add(1);
        all.energy += organism.energy;
        all.age += age;
        if organism.is_hibernating() {
            hibernating_count = hibernating_count.saturating_add(1);
        }

        if let Some(group) = per_species.get_mut(organism.species.index()) {
            group.count = group.count.saturating_add(1);
            group.energy += organism.energy;
            group.age += age;
            group.resistance += organism.starvation_resistance;
            group.metabolism += organism.metabolism_rate;
        }
    }

    let species = Species::ALL
        .iter()
        .zip(per_species.iter())
        .map(|(&species, group)| SpeciesStats {
            species,
            count: group.count,
            mean_energy: group.mean(group.energy),
            mean_age: group.mean(group.age),
            mean_starvation_resistance: group.mean(group.resistance),
            mean_metabolism: group.mean(group.metabolism),
        })
        .collect();

    let (mean_oxygen, mean_co2) = gas.mean_levels();

    PopulationStats {
        run_id,
        tick,
        organism_count: all.count,
        mean_energy: all.mean(all.energy),
        mean_age: all.mean(all.age),
        hibernating_count,
        free_block_count: u32::try_from(pool.len()).unwrap_or(u32::MAX),
        embedded_block_count: registry.embedded_composition().total(),
        mean_oxygen,
        mean_co2,
        species,
    }
}
