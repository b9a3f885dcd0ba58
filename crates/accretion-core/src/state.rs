//! The complete mutable world passed through the tick cycle.
//!
//! [`WorldState`] owns every subsystem (gas field, block pool, organism
//! registry, block ledger, clock) together with the seeded random number
//! generator that all of them draw from. A state is built from a validated
//! [`SimulationConfig`] and can be reset to a fresh run at any time.

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use accretion_ledger::{BlockCensus, BlockLedger};
use accretion_organisms::{ArchetypeTable, Organism, OrganismError, OrganismRegistry};
use accretion_types::{OrganismId, PopulationStats, RunId, Species, Vec2, WorldBounds};
use accretion_world::{BlockPool, GasField, WorldError};

use crate::clock::WorldClock;
use crate::config::{ConfigError, SimulationConfig};
use crate::stats;

/// Errors that can occur while building a world.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The gas grid could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// The mutable simulation state.
#[derive(Debug)]
pub struct WorldState {
    pub(crate) config: SimulationConfig,
    pub(crate) bounds: WorldBounds,
    pub(crate) run_id: RunId,
    pub(crate) clock: WorldClock,
    pub(crate) gas: GasField,
    pub(crate) pool: BlockPool,
    pub(crate) registry: OrganismRegistry,
    pub(crate) archetypes: ArchetypeTable,
    pub(crate) ledger: BlockLedger,
    pub(crate) rng: ChaCha12Rng,
}

impl WorldState {
    /// Build a world from `config` with the reference archetype table.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Config`] if `config` fails validation and
    /// [`StateError::World`] if the gas grid cannot be built.
    pub fn new(config: SimulationConfig) -> Result<Self, StateError> {
        Self::with_archetypes(config, ArchetypeTable::default())
    }

    /// Build a world from `config` with a custom archetype table.
    ///
    /// # Errors
    ///
    /// See [`WorldState::new`].
    pub fn with_archetypes(
        config: SimulationConfig,
        archetypes: ArchetypeTable,
    ) -> Result<Self, StateError> {
        config.validate()?;
        let bounds = config.world.bounds();
        let gas = GasField::new(bounds, &config.gas)?;
        let pool = BlockPool::new(bounds, config.blocks.clone());
        let rng = ChaCha12Rng::seed_from_u64(config.world.seed);

        let mut state = Self {
            config,
            bounds,
            run_id: RunId::new(),
            clock: WorldClock::new(),
            gas,
            pool,
            registry: OrganismRegistry::new(),
            archetypes,
            ledger: BlockLedger::new(),
            rng,
        };
        state.populate();
        Ok(state)
    }

    /// Start a new run: gas back to baseline, a fresh scatter of free
    /// blocks, no organisms, clock and ledger cleared.
    ///
    /// The generator is reseeded from `world.seed`, so a reset world
    /// replays the same run as a freshly built one.
    pub fn reset(&mut self) {
        self.gas.reset();
        self.registry.clear();
        self.ledger.reset();
        self.clock.reset();
        self.rng = ChaCha12Rng::seed_from_u64(self.config.world.seed);
        self.run_id = RunId::new();
        self.populate();
    }

    fn populate(&mut self) {
        let count = usize::try_from(self.config.world.initial_block_count).unwrap_or(usize::MAX);
        self.pool.scatter(count, &mut self.rng);
        tracing::info!(
            run_id = %self.run_id,
            seed = self.config.world.seed,
            width = self.bounds.width,
            height = self.bounds.height,
            free_blocks = self.pool.len(),
            gas_rows = self.gas.rows(),
            gas_cols = self.gas.cols(),
            "world initialized"
        );
    }

    /// Place a freshly formed organism of `species` at `position`, bypassing
    /// the formation engine.
    ///
    /// The organism's blocks are not taken from the pool. Injection happens
    /// between ticks, so the next tick's opening census already counts them.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::UnknownSpecies`] if the archetype table has
    /// no entry for `species`.
    pub fn spawn_organism(
        &mut self,
        species: Species,
        position: Vec2,
    ) -> Result<OrganismId, OrganismError> {
        let archetype = self.archetypes.require(species)?;
        let organism = Organism::from_archetype(
            archetype,
            self.bounds.wrap(position),
            Vec2::ZERO,
            self.config.behavior.max_energy,
        );
        let id = organism.id;
        self.registry.push(organism);
        Ok(id)
    }

    /// Free and embedded block counts right now.
    pub fn census(&self) -> BlockCensus {
        BlockCensus {
            free: self.pool.counts_by_type(),
            embedded: self.registry.embedded_composition(),
        }
    }

    /// Population and environment summary for the current tick.
    pub fn stats(&self) -> PopulationStats {
        stats::summarize(
            self.run_id,
            self.clock.tick(),
            &self.registry,
            &self.pool,
            &self.gas,
        )
    }

    /// The configuration this world was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// World dimensions.
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Identifier of the current run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Last completed tick (0 before the first tick).
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The gas field.
    pub const fn gas(&self) -> &GasField {
        &self.gas
    }

    /// Mutable gas field, for host-driven perturbations.
    pub const fn gas_mut(&mut self) -> &mut GasField {
        &mut self.gas
    }

    /// The free block pool.
    pub const fn pool(&self) -> &BlockPool {
        &self.pool
    }

    /// Mutable free block pool.
    pub const fn pool_mut(&mut self) -> &mut BlockPool {
        &mut self.pool
    }

    /// The live organisms.
    pub const fn registry(&self) -> &OrganismRegistry {
        &self.registry
    }

    /// Mutable organism registry.
    pub const fn registry_mut(&mut self) -> &mut OrganismRegistry {
        &mut self.registry
    }

    /// The archetype table formation draws from.
    pub const fn archetypes(&self) -> &ArchetypeTable {
        &self.archetypes
    }

    /// The block ledger.
    pub const fn ledger(&self) -> &BlockLedger {
        &self.ledger
    }
}
