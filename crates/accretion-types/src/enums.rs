//! Enumeration types for the Accretion simulation.
//!
//! The block catalog and the species list are closed enums so that every
//! lookup table in the workspace (compositions, recipes, compatibility) can
//! be a dense array indexed by enum value rather than an open-ended map.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// The kind of an undifferentiated building block.
///
/// Free blocks of these types drift in the world; organisms are assembled
/// from fixed counts of them and release them again on death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BlockType {
    /// General-purpose nutrient granule.
    Nutrient,
    /// Carbon skeleton fragment.
    Carbon,
    /// Protein chain.
    Protein,
    /// Lipid droplet, the membrane-forming block.
    Lipid,
    /// Light-harvesting pigment used by primary producers.
    Pigment,
    /// Catalytic enzyme used by predators.
    Enzyme,
}

impl BlockType {
    /// Number of block types in the catalog.
    pub const COUNT: usize = 6;

    /// Every block type, in catalog order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nutrient,
        Self::Carbon,
        Self::Protein,
        Self::Lipid,
        Self::Pigment,
        Self::Enzyme,
    ];

    /// Dense index of this block type into per-type arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a block type by dense index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl core::fmt::Display for BlockType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Nutrient => "nutrient",
            Self::Carbon => "carbon",
            Self::Protein => "protein",
            Self::Lipid => "lipid",
            Self::Pigment => "pigment",
            Self::Enzyme => "enzyme",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The archetype an organism belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Species {
    /// Slow photosynthetic drifter. Breathes CO2, produces O2.
    Alga,
    /// Small oxygen-breathing saprophyte with no prey.
    Sporeling,
    /// Mid-sized grazer feeding on algae and sporelings.
    Grazer,
    /// Fast predator feeding on grazers.
    Hunter,
}

impl Species {
    /// Number of species.
    pub const COUNT: usize = 4;

    /// Every species, in table order.
    pub const ALL: [Self; Self::COUNT] = [Self::Alga, Self::Sporeling, Self::Grazer, Self::Hunter];

    /// Dense index of this species into per-species arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Alga => "alga",
            Self::Sporeling => "sporeling",
            Self::Grazer => "grazer",
            Self::Hunter => "hunter",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Gases
// ---------------------------------------------------------------------------

/// One of the two gases tracked by the gas field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Gas {
    /// Molecular oxygen.
    Oxygen,
    /// Carbon dioxide.
    CarbonDioxide,
}

impl Gas {
    /// The other gas.
    pub const fn complement(self) -> Self {
        match self {
            Self::Oxygen => Self::CarbonDioxide,
            Self::CarbonDioxide => Self::Oxygen,
        }
    }
}

// ---------------------------------------------------------------------------
// Organism lifecycle
// ---------------------------------------------------------------------------

/// Behavioral state of a living organism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LifeState {
    /// Moving, feeding and breathing at full metabolism.
    Active,
    /// Dormant: no movement, no predation, metabolism reduced to a fraction.
    Hibernating,
}

/// Cosmetic membrane outline, consumed only by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MembraneShape {
    /// Smooth circle.
    Round,
    /// Circle with soft bulges.
    Lobed,
    /// Circle with sharp protrusions.
    Spiked,
    /// Stretched ellipse.
    Elongated,
}
