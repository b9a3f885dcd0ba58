//! The formation engine: turning clusters of free blocks into organisms.
//!
//! Once per tick [`try_form`] walks the archetype table in order. Each
//! archetype is attempted with a small probability; an attempt picks a
//! random seed block, gathers every free block within the formation radius
//! of it, and checks two conditions:
//!
//! 1. **Satisfiable**: the neighbourhood holds at least the recipe's count
//!    of every required type.
//! 2. **Compatible**: every pair of distinct required types can bond
//!    (see [`are_compatible`]).
//!
//! A failed attempt only ends that archetype's chance this tick. The first
//! success ends the pass, so at most one organism forms per tick.
//!
//! Block selection is deterministic given the seed: for each required type
//! the neighbourhood is scanned from its highest index down and the first
//! matches are taken. The organism spawns at the centroid of the selected
//! blocks, which are then removed from the pool highest index first.
//!
//! [`are_compatible`]: crate::archetype::are_compatible

use rand::Rng;

use accretion_types::{BlockType, Composition, Vec2};
use accretion_world::{BlockPool, chance};

use crate::archetype::{Archetype, ArchetypeTable, first_incompatible_pair};
use crate::config::FormationConfig;
use crate::organism::Organism;

/// Why an attempt around a given seed did not produce an organism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationRejection {
    /// The seed index does not refer to a block.
    NoSeed,
    /// The neighbourhood lacks enough blocks of this type.
    Unsatisfiable {
        /// The first type found short.
        block_type: BlockType,
        /// How many the recipe needs.
        required: u32,
        /// How many the neighbourhood holds.
        available: u32,
    },
    /// Two required types cannot bond.
    Incompatible {
        /// One side of the pair.
        first: BlockType,
        /// The other side of the pair.
        second: BlockType,
    },
}

/// A validated selection of blocks for one archetype.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationPlan {
    /// Pool indices to consume, in selection order.
    pub selected: Vec<usize>,
    /// Centroid of the selected blocks.
    pub centroid: Vec2,
}

/// A successful formation.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationOutcome {
    /// The new organism, not yet in any registry.
    pub organism: Organism,
    /// The blocks removed from the pool.
    pub consumed: Composition,
}

/// Check whether `archetype` can form around the block at `seed_index`
/// and, if so, which blocks it would consume.
///
/// # Errors
///
/// Returns the [`FormationRejection`] explaining why the cluster does not
/// qualify. This is an expected outcome, not a fault.
pub fn plan_formation(
    pool: &BlockPool,
    archetype: &Archetype,
    seed_index: usize,
    radius: f64,
) -> Result<FormationPlan, FormationRejection> {
    let seed = pool.get(seed_index).ok_or(FormationRejection::NoSeed)?;
    let neighbourhood = pool.indices_within(seed.position, radius);

    let mut available = Composition::empty();
    for &index in &neighbourhood {
        if let Some(block) = pool.get(index) {
            available.add(block.block_type, 1);
        }
    }

    for (block_type, required) in archetype.recipe.iter() {
        let have = available.get(block_type);
        if have < required {
            return Err(FormationRejection::Unsatisfiable {
                block_type,
                required,
                available: have,
            });
        }
    }

    if let Some((first, second)) = first_incompatible_pair(&archetype.recipe.types()) {
        return Err(FormationRejection::Incompatible { first, second });
    }

    let mut selected = Vec::new();
    for (block_type, required) in archetype.recipe.iter() {
        let matches = neighbourhood
            .iter()
            .rev()
            .copied()
            .filter(|&index| pool.get(index).is_some_and(|b| b.block_type == block_type))
            .take(usize::try_from(required).unwrap_or(usize::MAX));
        selected.extend(matches);
    }

    let centroid = centroid_of(pool, &selected).unwrap_or(seed.position);
    Ok(FormationPlan { selected, centroid })
}

/// Run one formation pass: at most one organism per call.
pub fn try_form(
    pool: &mut BlockPool,
    table: &ArchetypeTable,
    config: &FormationConfig,
    energy: f64,
    rng: &mut impl Rng,
) -> Option<FormationOutcome> {
    for archetype in table.iter() {
        if !chance::roll(rng, config.attempt_chance) {
            continue;
        }
        if pool.is_empty() {
            return None;
        }
        let seed_index = rng.random_range(0..pool.len());

        match plan_formation(pool, archetype, seed_index, config.radius) {
            Ok(plan) => {
                let consumed = pool.remove_descending(&plan.selected);
                let velocity = chance::jitter(rng, config.initial_speed);
                let organism = Organism::from_archetype(archetype, plan.centroid, velocity, energy);
                tracing::debug!(
                    species = %archetype.species,
                    organism_id = %organism.id,
                    x = plan.centroid.x,
                    y = plan.centroid.y,
                    blocks = consumed.total(),
                    "organism formed"
                );
                return Some(FormationOutcome { organism, consumed });
            }
            Err(rejection) => {
                tracing::trace!(species = %archetype.species, ?rejection, "formation attempt failed");
            }
        }
    }
    None
}

/// Mean position of the blocks at `indices`, or `None` if none exist.
fn centroid_of(pool: &BlockPool, indices: &[usize]) -> Option<Vec2> {
    let mut sum = Vec2::ZERO;
    let mut count: u32 = 0;
    for block in indices.iter().filter_map(|&i| pool.get(i)) {
        sum += block.position;
        count = count.saturating_add(1);
    }
    if count == 0 {
        return None;
    }
    Some(sum * (1.0 / f64::from(count)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use accretion_types::{Species, WorldBounds};
    use accretion_world::BlockConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn empty_pool() -> BlockPool {
        BlockPool::new(WorldBounds::new(400.0, 400.0), BlockConfig::default())
    }

    fn lay_recipe(pool: &mut BlockPool, archetype: &Archetype, origin: Vec2) {
        let mut offset = 0.0;
        for (block_type, count) in archetype.recipe.iter() {
            for _ in 0..count {
                pool.insert_at(block_type, origin + Vec2::new(offset, 0.0));
                offset += 2.0;
            }
        }
    }

    #[test]
    fn exact_recipe_is_planned() {
        let table = ArchetypeTable::default();
        let alga = table.require(Species::Alga).unwrap();
        let mut pool = empty_pool();
        lay_recipe(&mut pool, alga, Vec2::new(100.0, 100.0));

        let plan = plan_formation(&pool, alga, 0, 32.0).unwrap();
        assert_eq!(plan.selected.len(), 5);
        // Blocks sit at x = 100, 102, .., 108.
        assert!((plan.centroid.x - 104.0).abs() < 1e-9);
        assert!((plan.centroid.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_block_is_unsatisfiable() {
        let table = ArchetypeTable::default();
        let alga = table.require(Species::Alga).unwrap();
        let mut pool = empty_pool();
        pool.insert_at(BlockType::Carbon, Vec2::new(50.0, 50.0));
        pool.insert_at(BlockType::Carbon, Vec2::new(51.0, 50.0));
        pool.insert_at(BlockType::Pigment, Vec2::new(52.0, 50.0));
        pool.insert_at(BlockType::Lipid, Vec2::new(53.0, 50.0));

        let result = plan_formation(&pool, alga, 0, 32.0);
        assert_eq!(
            result,
            Err(FormationRejection::Unsatisfiable {
                block_type: BlockType::Pigment,
                required: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn distant_blocks_do_not_count() {
        let table = ArchetypeTable::default();
        let alga = table.require(Species::Alga).unwrap();
        let mut pool = empty_pool();
        lay_recipe(&mut pool, alga, Vec2::new(10.0, 10.0));
        // Swap the last pigment for a lipid far outside the radius.
        let far = pool.len().saturating_sub(1);
        pool.remove_descending(&[far]);
        pool.insert_at(BlockType::Lipid, Vec2::new(300.0, 300.0));

        assert!(matches!(
            plan_formation(&pool, alga, 0, 32.0),
            Err(FormationRejection::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn incompatible_recipe_is_rejected() {
        let table = ArchetypeTable::default();
        let mut odd = table.require(Species::Hunter).unwrap().clone();
        odd.recipe = Composition::from_pairs(&[(BlockType::Pigment, 1), (BlockType::Enzyme, 1)]);
        let mut pool = empty_pool();
        pool.insert_at(BlockType::Pigment, Vec2::new(20.0, 20.0));
        pool.insert_at(BlockType::Enzyme, Vec2::new(21.0, 20.0));

        assert_eq!(
            plan_formation(&pool, &odd, 0, 32.0),
            Err(FormationRejection::Incompatible {
                first: BlockType::Pigment,
                second: BlockType::Enzyme,
            })
        );
    }

    #[test]
    fn selection_prefers_higher_indices() {
        let table = ArchetypeTable::default();
        let alga = table.require(Species::Alga).unwrap();
        let mut pool = empty_pool();
        // Three carbons: the recipe needs two, so index 0 must be left.
        pool.insert_at(BlockType::Carbon, Vec2::new(100.0, 100.0));
        lay_recipe(&mut pool, alga, Vec2::new(101.0, 100.0));

        let plan = plan_formation(&pool, alga, 0, 32.0).unwrap();
        assert!(!plan.selected.contains(&0));
        assert_eq!(plan.selected.len(), 5);
    }

    #[test]
    fn forced_formation_consumes_blocks() {
        let table = ArchetypeTable::default();
        let grazer = table.require(Species::Grazer).unwrap();
        let mut pool = empty_pool();
        lay_recipe(&mut pool, grazer, Vec2::new(200.0, 200.0));
        let config = FormationConfig {
            attempt_chance: 1.0,
            ..FormationConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(9);

        let outcome = try_form(&mut pool, &table, &config, 100.0, &mut rng).unwrap();
        assert_eq!(outcome.organism.species, Species::Grazer);
        assert_eq!(outcome.consumed, grazer.recipe);
        assert_eq!(outcome.organism.energy, 100.0);
        assert!(pool.is_empty());

        // Nothing left to form from.
        assert!(try_form(&mut pool, &table, &config, 100.0, &mut rng).is_none());
    }

    #[test]
    fn zero_chance_never_forms() {
        let table = ArchetypeTable::default();
        let mut pool = empty_pool();
        lay_recipe(&mut pool, table.require(Species::Alga).unwrap(), Vec2::new(50.0, 50.0));
        let config = FormationConfig {
            attempt_chance: 0.0,
            ..FormationConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(try_form(&mut pool, &table, &config, 100.0, &mut rng).is_none());
        }
        assert_eq!(pool.len(), 5);
    }
}
