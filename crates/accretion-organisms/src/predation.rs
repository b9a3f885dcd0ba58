//! Prey search for predators.
//!
//! The same nearest-prey query serves two purposes: steering (with the
//! sensing radius) and capture (with the archetype's capture radius).
//! Distances are plain Euclidean and do not wrap around the world edges.

use accretion_types::Vec2;

use crate::archetype::Archetype;
use crate::organism::Organism;

/// Index of the nearest organism `hunter` may eat within `radius`.
///
/// `hunter_index` is excluded from the search. Returns `None` for
/// archetypes without prey.
pub fn nearest_prey(
    organisms: &[Organism],
    hunter_index: usize,
    hunter: &Archetype,
    radius: f64,
) -> Option<usize> {
    if hunter.is_autotroph() {
        return None;
    }
    let origin = organisms.get(hunter_index)?.position;
    organisms
        .iter()
        .enumerate()
        .filter(|&(i, other)| i != hunter_index && hunter.eats(other.species))
        .map(|(i, other)| (i, other.position.distance(origin)))
        .filter(|&(_, distance)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Position of the nearest prey within `radius`, for steering.
pub fn sense_prey(
    organisms: &[Organism],
    hunter_index: usize,
    hunter: &Archetype,
    radius: f64,
) -> Option<Vec2> {
    nearest_prey(organisms, hunter_index, hunter, radius)
        .and_then(|i| organisms.get(i))
        .map(|prey| prey.position)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeTable;
    use accretion_types::Species;

    fn spawn(table: &ArchetypeTable, species: Species, x: f64, y: f64) -> Organism {
        Organism::from_archetype(
            table.require(species).unwrap(),
            Vec2::new(x, y),
            Vec2::ZERO,
            100.0,
        )
    }

    #[test]
    fn finds_nearest_eligible_prey() {
        let table = ArchetypeTable::default();
        let organisms = vec![
            spawn(&table, Species::Alga, 40.0, 0.0),
            spawn(&table, Species::Grazer, 0.0, 0.0),
            spawn(&table, Species::Hunter, 5.0, 0.0),
            spawn(&table, Species::Sporeling, 20.0, 0.0),
        ];
        let grazer = table.require(Species::Grazer).unwrap();
        // The hunter is closer but not prey; the sporeling is the nearest prey.
        assert_eq!(nearest_prey(&organisms, 1, grazer, 130.0), Some(3));
        assert_eq!(nearest_prey(&organisms, 1, grazer, 10.0), None);
    }

    #[test]
    fn autotrophs_never_hunt() {
        let table = ArchetypeTable::default();
        let organisms = vec![
            spawn(&table, Species::Alga, 0.0, 0.0),
            spawn(&table, Species::Sporeling, 1.0, 0.0),
        ];
        let alga = table.require(Species::Alga).unwrap();
        assert_eq!(nearest_prey(&organisms, 0, alga, 500.0), None);
    }

    #[test]
    fn hunter_does_not_find_itself() {
        let table = ArchetypeTable::default();
        let organisms = vec![spawn(&table, Species::Hunter, 0.0, 0.0)];
        let hunter = table.require(Species::Hunter).unwrap();
        assert_eq!(sense_prey(&organisms, 0, hunter, 500.0), None);
    }
}
