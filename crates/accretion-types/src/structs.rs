//! Core value structs shared across the workspace.
//!
//! - [`Vec2`] -- 2D position/velocity in world units (pixels).
//! - [`WorldBounds`] -- the toroidal rectangle blocks and organisms live in.
//! - [`Composition`] -- dense per-[`BlockType`] counts.
//! - [`PopulationStats`] / [`SpeciesStats`] -- per-tick summaries for display.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BlockType, Species};
use crate::ids::RunId;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct a vector from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other` (no wraparound).
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// Rescale to at most `max_len`, preserving direction.
    pub fn clamp_length(self, max_len: f64) -> Self {
        let len = self.length();
        if len > max_len && len > f64::EPSILON {
            self * (max_len / len)
        } else {
            self
        }
    }
}

impl core::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl core::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// ---------------------------------------------------------------------------
// World bounds
// ---------------------------------------------------------------------------

/// The rectangular world, wrapping toroidally at its edges.
///
/// Only blocks and organisms wrap. The gas grid covers the same rectangle
/// but treats its edges as hard boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldBounds {
    /// World width in world units.
    pub width: f64,
    /// World height in world units.
    pub height: f64,
}

impl WorldBounds {
    /// Construct bounds from a width and height.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Wrap a position into `[0, width) x [0, height)`.
    pub fn wrap(self, position: Vec2) -> Vec2 {
        Vec2::new(
            wrap_axis(position.x, self.width),
            wrap_axis(position.y, self.height),
        )
    }

    /// Whether the position lies inside the rectangle.
    pub fn contains(self, position: Vec2) -> bool {
        position.x >= 0.0 && position.x < self.width && position.y >= 0.0 && position.y < self.height
    }
}

/// Wrap a single coordinate toroidally.
fn wrap_axis(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs.
    if wrapped >= extent { 0.0 } else { wrapped }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// A multiset of block types: how many blocks of each type.
///
/// Stored densely, indexed by [`BlockType::index`]. Used both for recipe
/// requirements and for the structural composition of a living organism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Composition([u32; BlockType::COUNT]);

impl Composition {
    /// A composition with no blocks.
    pub const fn empty() -> Self {
        Self([0; BlockType::COUNT])
    }

    /// Build a composition from `(type, count)` pairs. Repeated types add up.
    pub fn from_pairs(pairs: &[(BlockType, u32)]) -> Self {
        let mut composition = Self::empty();
        for &(block_type, count) in pairs {
            composition.add(block_type, count);
        }
        composition
    }

    /// Count of the given block type.
    pub fn get(&self, block_type: BlockType) -> u32 {
        self.0.get(block_type.index()).copied().unwrap_or(0)
    }

    /// Add `count` blocks of the given type (saturating).
    pub fn add(&mut self, block_type: BlockType, count: u32) {
        if let Some(slot) = self.0.get_mut(block_type.index()) {
            *slot = slot.saturating_add(count);
        }
    }

    /// Add every count of `other` into this composition (saturating).
    pub fn merge(&mut self, other: &Self) {
        for (block_type, count) in other.iter() {
            self.add(block_type, count);
        }
    }

    /// Total number of blocks across all types.
    pub fn total(&self) -> u64 {
        self.0
            .iter()
            .fold(0_u64, |acc, &count| acc.saturating_add(u64::from(count)))
    }

    /// Whether no blocks are present.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&count| count == 0)
    }

    /// Iterate the non-zero `(type, count)` entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockType, u32)> + '_ {
        BlockType::ALL
            .into_iter()
            .zip(self.0.iter().copied())
            .filter(|&(_, count)| count > 0)
    }

    /// Block types with a non-zero count, in catalog order.
    pub fn types(&self) -> Vec<BlockType> {
        self.iter().map(|(block_type, _)| block_type).collect()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregate statistics for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesStats {
    /// The species described.
    pub species: Species,
    /// Number of living organisms of this species.
    pub count: u32,
    /// Mean energy (0 when `count` is 0).
    pub mean_energy: f64,
    /// Mean age in ticks (0 when `count` is 0).
    pub mean_age: f64,
    /// Mean mutated starvation resistance (0 when `count` is 0).
    pub mean_starvation_resistance: f64,
    /// Mean mutated metabolism rate (0 when `count` is 0).
    pub mean_metabolism: f64,
}

impl SpeciesStats {
    /// Zeroed statistics for a species with no living members.
    pub const fn empty(species: Species) -> Self {
        Self {
            species,
            count: 0,
            mean_energy: 0.0,
            mean_age: 0.0,
            mean_starvation_resistance: 0.0,
            mean_metabolism: 0.0,
        }
    }
}

/// Read-only summary of the world after a tick, for the display collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationStats {
    /// The run these statistics belong to.
    pub run_id: RunId,
    /// Tick number the summary was taken after.
    pub tick: u64,
    /// Total living organisms.
    pub organism_count: u32,
    /// Mean energy over all organisms (0 when empty).
    pub mean_energy: f64,
    /// Mean age over all organisms (0 when empty).
    pub mean_age: f64,
    /// Number of organisms currently hibernating.
    pub hibernating_count: u32,
    /// Number of free blocks in the pool.
    pub free_block_count: u32,
    /// Number of blocks embedded in living organisms.
    pub embedded_block_count: u64,
    /// Mean oxygen level across the gas grid.
    pub mean_oxygen: f64,
    /// Mean CO2 level across the gas grid.
    pub mean_co2: f64,
    /// Per-species aggregates, one entry per species in table order.
    pub species: Vec<SpeciesStats>,
}
