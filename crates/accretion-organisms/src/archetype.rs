//! Static archetype (recipe) table and block compatibility rules.
//!
//! An [`Archetype`] describes everything shared by every organism of one
//! species: the block recipe that forms it, its body parameters, the gas
//! it breathes and the gas it produces, and which species it eats.
//!
//! The [`ArchetypeTable`] is ordered. The formation engine attempts
//! archetypes in table order each tick, so the order is part of the
//! simulation's behavior.

use accretion_types::{BlockType, Composition, Gas, MembraneShape, Species};

use crate::error::OrganismError;

// ---------------------------------------------------------------------------
// Compatibility
// ---------------------------------------------------------------------------

/// Block types that `block_type` lists as bonding partners.
///
/// The lists are not required to be symmetric; [`are_compatible`] accepts a
/// pair if either side lists the other.
pub const fn partners(block_type: BlockType) -> &'static [BlockType] {
    match block_type {
        BlockType::Nutrient => &[
            BlockType::Carbon,
            BlockType::Protein,
            BlockType::Lipid,
            BlockType::Enzyme,
        ],
        BlockType::Carbon => &[BlockType::Nutrient, BlockType::Lipid, BlockType::Pigment],
        BlockType::Protein => &[BlockType::Nutrient, BlockType::Enzyme, BlockType::Lipid],
        BlockType::Lipid => &[
            BlockType::Carbon,
            BlockType::Protein,
            BlockType::Pigment,
            BlockType::Nutrient,
        ],
        BlockType::Pigment => &[BlockType::Carbon, BlockType::Lipid],
        BlockType::Enzyme => &[BlockType::Protein, BlockType::Nutrient],
    }
}

/// Whether two block types can bond, checked in either direction.
pub fn are_compatible(a: BlockType, b: BlockType) -> bool {
    partners(a).contains(&b) || partners(b).contains(&a)
}

/// The first pair of distinct types in `types` that cannot bond, if any.
pub fn first_incompatible_pair(types: &[BlockType]) -> Option<(BlockType, BlockType)> {
    types.iter().enumerate().find_map(|(i, &a)| {
        types
            .iter()
            .skip(i.saturating_add(1))
            .find(|&&b| a != b && !are_compatible(a, b))
            .map(|&b| (a, b))
    })
}

// ---------------------------------------------------------------------------
// Archetype
// ---------------------------------------------------------------------------

/// The static template for one species.
#[derive(Debug, Clone, PartialEq)]
pub struct Archetype {
    /// The species this archetype forms.
    pub species: Species,
    /// Display name.
    pub name: &'static str,
    /// Blocks consumed to form one organism, and returned on its death.
    pub recipe: Composition,
    /// Body radius in world units.
    pub size: f64,
    /// Top speed before the global speed factor.
    pub max_speed: f64,
    /// Energy spent per tick while active.
    pub metabolism_rate: f64,
    /// Ticks without feeding a fresh organism tolerates (its starting
    /// starvation resistance).
    pub starvation_time: f64,
    /// The gas consumed when breathing.
    pub breathes: Gas,
    /// The gas released when breathing.
    pub produces: Gas,
    /// Species this archetype eats. Empty for primary producers.
    pub prey: Vec<Species>,
    /// Membrane outline, for rendering only.
    pub membrane: MembraneShape,
    /// RGB fill color, for rendering only.
    pub color: [u8; 3],
}

impl Archetype {
    /// Whether this archetype eats `species`.
    pub fn eats(&self, species: Species) -> bool {
        self.prey.contains(&species)
    }

    /// Whether this archetype has no prey.
    pub fn is_autotroph(&self) -> bool {
        self.prey.is_empty()
    }

    /// Radius within which this archetype captures prey.
    pub fn capture_radius(&self, margin: f64) -> f64 {
        self.size + margin
    }

    /// Check parameter ranges and recipe compatibility.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::InvalidArchetype`] for an empty recipe or a
    /// non-positive body parameter, and [`OrganismError::IncompatibleRecipe`]
    /// if two required block types cannot bond.
    pub fn validate(&self) -> Result<(), OrganismError> {
        let invalid = |reason: &str| OrganismError::InvalidArchetype {
            species: self.species,
            reason: reason.to_owned(),
        };
        if self.recipe.is_empty() {
            return Err(invalid("recipe is empty"));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.size) {
            return Err(invalid("size must be positive"));
        }
        if !positive(self.max_speed) {
            return Err(invalid("max speed must be positive"));
        }
        if !positive(self.starvation_time) {
            return Err(invalid("starvation time must be positive"));
        }
        if !self.metabolism_rate.is_finite() || self.metabolism_rate < 0.0 {
            return Err(invalid("metabolism rate must be non-negative"));
        }
        if let Some((first, second)) = first_incompatible_pair(&self.recipe.types()) {
            return Err(OrganismError::IncompatibleRecipe {
                species: self.species,
                first,
                second,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// The ordered list of archetypes the formation engine works through.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeTable {
    archetypes: Vec<Archetype>,
}

impl ArchetypeTable {
    /// Build a table, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::DuplicateSpecies`] if two entries share a
    /// species, or any error from [`Archetype::validate`].
    pub fn new(archetypes: Vec<Archetype>) -> Result<Self, OrganismError> {
        for (i, archetype) in archetypes.iter().enumerate() {
            archetype.validate()?;
            if archetypes
                .iter()
                .take(i)
                .any(|earlier| earlier.species == archetype.species)
            {
                return Err(OrganismError::DuplicateSpecies(archetype.species));
            }
        }
        Ok(Self { archetypes })
    }

    /// The archetype for a species, if registered.
    pub fn get(&self, species: Species) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.species == species)
    }

    /// The archetype for a species.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::UnknownSpecies`] if the species has no entry.
    pub fn require(&self, species: Species) -> Result<&Archetype, OrganismError> {
        self.get(species)
            .ok_or(OrganismError::UnknownSpecies(species))
    }

    /// Archetypes in formation order.
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// Number of archetypes.
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

impl Default for ArchetypeTable {
    /// The four reference archetypes: one producer, one saprophyte, one
    /// grazer, one hunter.
    fn default() -> Self {
        Self {
            archetypes: vec![
                Archetype {
                    species: Species::Alga,
                    name: "Alga",
                    recipe: Composition::from_pairs(&[
                        (BlockType::Carbon, 2),
                        (BlockType::Pigment, 2),
                        (BlockType::Lipid, 1),
                    ]),
                    size: 6.0,
                    max_speed: 0.6,
                    metabolism_rate: 0.08,
                    starvation_time: 400.0,
                    breathes: Gas::CarbonDioxide,
                    produces: Gas::Oxygen,
                    prey: Vec::new(),
                    membrane: MembraneShape::Round,
                    color: [72, 190, 96],
                },
                Archetype {
                    species: Species::Sporeling,
                    name: "Sporeling",
                    recipe: Composition::from_pairs(&[
                        (BlockType::Nutrient, 2),
                        (BlockType::Carbon, 2),
                        (BlockType::Lipid, 1),
                    ]),
                    size: 5.0,
                    max_speed: 0.8,
                    metabolism_rate: 0.10,
                    starvation_time: 350.0,
                    breathes: Gas::Oxygen,
                    produces: Gas::CarbonDioxide,
                    prey: Vec::new(),
                    membrane: MembraneShape::Lobed,
                    color: [196, 170, 88],
                },
                Archetype {
                    species: Species::Grazer,
                    name: "Grazer",
                    recipe: Composition::from_pairs(&[
                        (BlockType::Protein, 2),
                        (BlockType::Nutrient, 2),
                        (BlockType::Lipid, 1),
                    ]),
                    size: 7.0,
                    max_speed: 1.2,
                    metabolism_rate: 0.12,
                    starvation_time: 300.0,
                    breathes: Gas::Oxygen,
                    produces: Gas::CarbonDioxide,
                    prey: vec![Species::Alga, Species::Sporeling],
                    membrane: MembraneShape::Elongated,
                    color: [90, 140, 220],
                },
                Archetype {
                    species: Species::Hunter,
                    name: "Hunter",
                    recipe: Composition::from_pairs(&[
                        (BlockType::Protein, 3),
                        (BlockType::Enzyme, 2),
                        (BlockType::Nutrient, 1),
                    ]),
                    size: 9.0,
                    max_speed: 1.6,
                    metabolism_rate: 0.16,
                    starvation_time: 350.0,
                    breathes: Gas::Oxygen,
                    produces: Gas::CarbonDioxide,
                    prey: vec![Species::Grazer],
                    membrane: MembraneShape::Spiked,
                    color: [210, 70, 70],
                },
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_is_either_direction() {
        assert!(are_compatible(BlockType::Pigment, BlockType::Carbon));
        assert!(are_compatible(BlockType::Carbon, BlockType::Pigment));
        assert!(are_compatible(BlockType::Enzyme, BlockType::Nutrient));
        assert!(!are_compatible(BlockType::Pigment, BlockType::Enzyme));
        assert!(!are_compatible(BlockType::Pigment, BlockType::Protein));
    }

    #[test]
    fn incompatible_pair_found() {
        let types = [BlockType::Carbon, BlockType::Pigment, BlockType::Enzyme];
        assert_eq!(
            first_incompatible_pair(&types),
            Some((BlockType::Carbon, BlockType::Enzyme))
        );
        assert_eq!(
            first_incompatible_pair(&[BlockType::Protein, BlockType::Enzyme]),
            None
        );
    }

    #[test]
    fn default_table_is_valid_and_ordered() {
        let table = ArchetypeTable::default();
        assert_eq!(table.len(), Species::COUNT);
        for archetype in table.iter() {
            assert!(archetype.validate().is_ok(), "{} invalid", archetype.name);
        }
        let order: Vec<Species> = table.iter().map(|a| a.species).collect();
        assert_eq!(order, Species::ALL.to_vec());
    }

    #[test]
    fn breathing_pairs_are_complementary() {
        for archetype in ArchetypeTable::default().iter() {
            assert_eq!(archetype.breathes.complement(), archetype.produces);
        }
    }

    #[test]
    fn table_rejects_duplicates() {
        let alga = ArchetypeTable::default().require(Species::Alga).unwrap().clone();
        let result = ArchetypeTable::new(vec![alga.clone(), alga]);
        assert!(matches!(
            result,
            Err(OrganismError::DuplicateSpecies(Species::Alga))
        ));
    }

    #[test]
    fn table_rejects_incompatible_recipe() {
        let mut hunter = ArchetypeTable::default()
            .require(Species::Hunter)
            .unwrap()
            .clone();
        hunter.recipe.add(BlockType::Pigment, 1);
        let result = ArchetypeTable::new(vec![hunter]);
        assert!(matches!(
            result,
            Err(OrganismError::IncompatibleRecipe { .. })
        ));
    }

    #[test]
    fn require_missing_species() {
        let table = ArchetypeTable::new(Vec::new()).unwrap();
        assert!(table.is_empty());
        assert!(matches!(
            table.require(Species::Grazer),
            Err(OrganismError::UnknownSpecies(Species::Grazer))
        ));
    }

    #[test]
    fn prey_relations() {
        let table = ArchetypeTable::default();
        let grazer = table.require(Species::Grazer).unwrap();
        assert!(grazer.eats(Species::Alga));
        assert!(!grazer.eats(Species::Hunter));
        assert!(table.require(Species::Alga).unwrap().is_autotroph());
    }
}
