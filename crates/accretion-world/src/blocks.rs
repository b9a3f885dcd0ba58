//! The pool of free building blocks.
//!
//! Free blocks drift with damped inertia, wrap toroidally at the world
//! edges, and occasionally feel a weak pull toward their neighbours. Blocks
//! leave the pool when the formation engine consumes them and re-enter it
//! when an organism dies or is eaten.
//!
//! A block inside an organism has no identity of its own: it survives only
//! as a count in that organism's [`Composition`]. Every block held by a
//! [`BlockPool`] is therefore free.

use rand::Rng;
use serde::{Deserialize, Serialize};

use accretion_types::{BlockType, Composition, Vec2, WorldBounds};

use crate::chance;

/// Free-block dynamics parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Per-block, per-tick probability of feeling neighbour attraction (default: 0.02).
    #[serde(default = "default_attraction_chance")]
    pub attraction_chance: f64,

    /// Velocity added per attracting neighbour, along the unit vector toward it (default: 0.01).
    #[serde(default = "default_attraction_weight")]
    pub attraction_weight: f64,

    /// Velocity multiplier applied every tick (default: 0.98).
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Per-tick probability of spontaneously generating one block (default: 0.05).
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f64,

    /// Half-width of the position jitter for released blocks (default: 5.0).
    #[serde(default = "default_release_jitter")]
    pub release_jitter: f64,

    /// Half-width of each velocity component for new blocks (default: 0.5).
    #[serde(default = "default_max_initial_speed")]
    pub max_initial_speed: f64,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            attraction_chance: default_attraction_chance(),
            attraction_weight: default_attraction_weight(),
            damping: default_damping(),
            spawn_chance: default_spawn_chance(),
            release_jitter: default_release_jitter(),
            max_initial_speed: default_max_initial_speed(),
        }
    }
}

const fn default_attraction_chance() -> f64 {
    0.02
}

const fn default_attraction_weight() -> f64 {
    0.01
}

const fn default_damping() -> f64 {
    0.98
}

const fn default_spawn_chance() -> f64 {
    0.05
}

const fn default_release_jitter() -> f64 {
    5.0
}

const fn default_max_initial_speed() -> f64 {
    0.5
}

/// A free building block drifting in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingBlock {
    /// Position in world units, always inside the world rectangle.
    pub position: Vec2,
    /// Velocity in world units per tick, before the global speed factor.
    pub velocity: Vec2,
    /// What kind of block this is.
    pub block_type: BlockType,
    /// Ticks since the block entered the pool.
    pub age: u64,
}

/// All free blocks in the world.
#[derive(Debug, Clone)]
pub struct BlockPool {
    bounds: WorldBounds,
    config: BlockConfig,
    blocks: Vec<BuildingBlock>,
}

impl BlockPool {
    /// Create an empty pool for the given world.
    pub const fn new(bounds: WorldBounds, config: BlockConfig) -> Self {
        Self {
            bounds,
            config,
            blocks: Vec::new(),
        }
    }

    /// Replace the pool contents with `count` blocks of uniformly random
    /// type and position.
    pub fn scatter(&mut self, count: usize, rng: &mut impl Rng) {
        self.blocks.clear();
        self.blocks.reserve(count);
        for _ in 0..count {
            let block_type = random_type(rng);
            let position = chance::position_in(rng, self.bounds);
            self.push(block_type, position, rng);
        }
    }

    /// Remove every block.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Advance every block by one tick.
    ///
    /// Attraction reads a snapshot of positions taken before any block
    /// moves, so the result does not depend on iteration order.
    pub fn update(&mut self, attraction_range: f64, speed: f64, rng: &mut impl Rng) {
        let snapshot: Vec<Vec2> = self.blocks.iter().map(|b| b.position).collect();
        let bounds = self.bounds;
        let weight = self.config.attraction_weight;

        for (i, block) in self.blocks.iter_mut().enumerate() {
            if chance::roll(rng, self.config.attraction_chance) {
                let origin = block.position;
                for (j, &other) in snapshot.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let offset = other - origin;
                    let distance = offset.length();
                    if distance >= attraction_range {
                        continue;
                    }
                    if let Some(direction) = offset.normalized() {
                        block.velocity += direction * weight;
                    }
                }
            }

            block.velocity = block.velocity * self.config.damping;
            block.position = bounds.wrap(block.position + block.velocity * speed);
            block.age = block.age.saturating_add(1);
        }
    }

    /// With probability `spawn_chance`, add one block of random type at a
    /// random position. Returns the type spawned, if any.
    pub fn spawn_random(&mut self, rng: &mut impl Rng) -> Option<BlockType> {
        if !chance::roll(rng, self.config.spawn_chance) {
            return None;
        }
        let block_type = random_type(rng);
        let position = chance::position_in(rng, self.bounds);
        self.push(block_type, position, rng);
        tracing::trace!(%block_type, x = position.x, y = position.y, "spawned free block");
        Some(block_type)
    }

    /// Insert `count` blocks of one type scattered around `near`.
    pub fn release(&mut self, block_type: BlockType, count: u32, near: Vec2, rng: &mut impl Rng) {
        for _ in 0..count {
            let offset = chance::jitter(rng, self.config.release_jitter);
            let position = self.bounds.wrap(near + offset);
            self.push(block_type, position, rng);
        }
    }

    /// Release every block of a composition around `near`.
    pub fn release_composition(&mut self, composition: &Composition, near: Vec2, rng: &mut impl Rng) {
        for (block_type, count) in composition.iter() {
            self.release(block_type, count, near, rng);
        }
    }

    /// Remove the blocks at `indices`, highest index first, and return what
    /// was removed.
    ///
    /// Duplicate and out-of-range indices are ignored. The relative order of
    /// the remaining blocks is preserved.
    pub fn remove_descending(&mut self, indices: &[usize]) -> Composition {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        let mut removed = Composition::empty();
        for index in sorted {
            if index < self.blocks.len() {
                let block = self.blocks.remove(index);
                removed.add(block.block_type, 1);
            }
        }
        removed
    }

    /// Indices of blocks within `radius` of `center`, in ascending order.
    ///
    /// Distance is plain Euclidean; the neighbourhood does not wrap.
    pub fn indices_within(&self, center: Vec2, radius: f64) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.position.distance(center) <= radius)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of free blocks of each type.
    pub fn counts_by_type(&self) -> Composition {
        let mut counts = Composition::empty();
        for block in &self.blocks {
            counts.add(block.block_type, 1);
        }
        counts
    }

    /// The block at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&BuildingBlock> {
        self.blocks.get(index)
    }

    /// All free blocks.
    pub fn blocks(&self) -> &[BuildingBlock] {
        &self.blocks
    }

    /// Number of free blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The world rectangle blocks wrap within.
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// The dynamics parameters in use.
    pub const fn config(&self) -> &BlockConfig {
        &self.config
    }

    /// Append a block with a small random velocity.
    fn push(&mut self, block_type: BlockType, position: Vec2, rng: &mut impl Rng) {
        let velocity = chance::jitter(rng, self.config.max_initial_speed);
        self.blocks.push(BuildingBlock {
            position,
            velocity,
            block_type,
            age: 0,
        });
    }

    /// Insert a motionless block at an exact position.
    ///
    /// Lets callers lay out deterministic arrangements, such as a recipe's
    /// worth of blocks in one spot.
    pub fn insert_at(&mut self, block_type: BlockType, position: Vec2) {
        self.blocks.push(BuildingBlock {
            position: self.bounds.wrap(position),
            velocity: Vec2::ZERO,
            block_type,
            age: 0,
        });
    }
}

/// A block type drawn uniformly from the catalog.
fn random_type(rng: &mut impl Rng) -> BlockType {
    let index = rng.random_range(0..BlockType::COUNT);
    BlockType::from_index(index).unwrap_or(BlockType::Nutrient)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn pool() -> BlockPool {
        BlockPool::new(WorldBounds::new(200.0, 100.0), BlockConfig::default())
    }

    #[test]
    fn scatter_replaces_contents() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut p = pool();
        p.scatter(50, &mut rng);
        assert_eq!(p.len(), 50);
        p.scatter(10, &mut rng);
        assert_eq!(p.len(), 10);
        assert!(p.blocks().iter().all(|b| p.bounds().contains(b.position)));
    }

    #[test]
    fn update_wraps_and_ages() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut p = pool();
        p.insert_at(BlockType::Carbon, Vec2::new(199.5, 0.2));
        if let Some(block) = p.blocks.first_mut() {
            block.velocity = Vec2::new(2.0, -1.0);
        }
        p.update(40.0, 1.0, &mut rng);
        let block = p.get(0).unwrap();
        assert!(p.bounds().contains(block.position));
        assert!(block.position.x < 10.0);
        assert!(block.position.y > 90.0);
        assert_eq!(block.age, 1);
    }

    #[test]
    fn update_preserves_count_and_types() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut p = pool();
        p.scatter(80, &mut rng);
        let before = p.counts_by_type();
        for _ in 0..20 {
            p.update(40.0, 1.0, &mut rng);
        }
        assert_eq!(p.counts_by_type(), before);
    }

    #[test]
    fn attraction_pulls_blocks_together() {
        let mut rng = SmallRng::seed_from_u64(4);
        let config = BlockConfig {
            attraction_chance: 1.0,
            damping: 1.0,
            ..BlockConfig::default()
        };
        let mut p = BlockPool::new(WorldBounds::new(200.0, 100.0), config);
        p.insert_at(BlockType::Lipid, Vec2::new(50.0, 50.0));
        p.insert_at(BlockType::Lipid, Vec2::new(60.0, 50.0));
        p.update(40.0, 1.0, &mut rng);
        let left = p.get(0).map_or(0.0, |b| b.velocity.x);
        let right = p.get(1).map_or(0.0, |b| b.velocity.x);
        assert!(left > 0.0);
        assert!(right < 0.0);
        assert!((left + right).abs() < 1e-12);
    }

    #[test]
    fn spawn_random_respects_chance() {
        let mut rng = SmallRng::seed_from_u64(5);
        let never = BlockConfig {
            spawn_chance: 0.0,
            ..BlockConfig::default()
        };
        let mut p = BlockPool::new(WorldBounds::new(100.0, 100.0), never);
        assert!(p.spawn_random(&mut rng).is_none());
        assert!(p.is_empty());

        let always = BlockConfig {
            spawn_chance: 1.0,
            ..BlockConfig::default()
        };
        let mut p = BlockPool::new(WorldBounds::new(100.0, 100.0), always);
        assert!(p.spawn_random(&mut rng).is_some());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn release_places_blocks_near_point() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut p = pool();
        let near = Vec2::new(100.0, 50.0);
        p.release(BlockType::Enzyme, 4, near, &mut rng);
        assert_eq!(p.counts_by_type().get(BlockType::Enzyme), 4);
        for block in p.blocks() {
            assert!((block.position.x - near.x).abs() <= 5.0);
            assert!((block.position.y - near.y).abs() <= 5.0);
        }
    }

    #[test]
    fn remove_descending_preserves_order() {
        let mut p = pool();
        let order = [
            BlockType::Nutrient,
            BlockType::Carbon,
            BlockType::Protein,
            BlockType::Lipid,
            BlockType::Pigment,
        ];
        for (i, block_type) in order.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64;
            p.insert_at(*block_type, Vec2::new(x, 0.0));
        }
        let removed = p.remove_descending(&[1, 3, 3, 99]);
        assert_eq!(removed.total(), 2);
        assert_eq!(removed.get(BlockType::Carbon), 1);
        assert_eq!(removed.get(BlockType::Lipid), 1);
        let remaining: Vec<BlockType> = p.blocks().iter().map(|b| b.block_type).collect();
        assert_eq!(
            remaining,
            vec![BlockType::Nutrient, BlockType::Protein, BlockType::Pigment]
        );
    }

    #[test]
    fn indices_within_is_ascending() {
        let mut p = pool();
        p.insert_at(BlockType::Carbon, Vec2::new(10.0, 10.0));
        p.insert_at(BlockType::Carbon, Vec2::new(150.0, 10.0));
        p.insert_at(BlockType::Carbon, Vec2::new(15.0, 12.0));
        assert_eq!(p.indices_within(Vec2::new(10.0, 10.0), 32.0), vec![0, 2]);
    }
}
