//! Tick cycle: the five-phase update that drives the Accretion simulation.
//!
//! Each tick runs these phases in order against one [`WorldState`]:
//!
//! 1. **Gas** -- one diffusion step of the oxygen/CO2 grid.
//! 2. **Blocks** -- free blocks drift, attract, wrap, and age; with a small
//!    chance one new block is spawned.
//! 3. **Formation** -- at most one organism assembles from nearby free
//!    blocks.
//! 4. **Organisms** -- every organism breathes, moves, feeds, reproduces,
//!    ages, and possibly dies, releasing its blocks.
//! 5. **Ledger** -- the block census taken before phase 1 is checked
//!    against the census after phase 4 and the flows posted in between.
//!
//! A conservation failure is logged at `warn` and reported in the
//! [`TickSummary`]; it never aborts the run. The tick is deterministic given
//! the state and the seeded generator it carries.

use accretion_ledger::{ConservationResult, FlowKind, LedgerError};
use accretion_organisms::{UpdateContext, try_form};
use accretion_types::{BlockType, OrganismId, Species};
use tracing::{debug, warn};

use crate::clock::ClockError;
use crate::state::WorldState;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The block ledger rejected a posting.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Type of the block spawned this tick, if any.
    pub spawned: Option<BlockType>,
    /// The organism formed this tick, if any.
    pub formed: Option<(OrganismId, Species)>,
    /// Children born.
    pub births: u32,
    /// Deaths from starvation.
    pub starvations: u32,
    /// Deaths from predation.
    pub predations: u32,
    /// Organisms that entered hibernation.
    pub hibernated: u32,
    /// Organisms that woke from hibernation.
    pub woke: u32,
    /// Organisms skipped because they were off the gas grid.
    pub skipped: u32,
    /// Living organisms at end of tick.
    pub organism_count: u32,
    /// Free blocks at end of tick.
    pub free_block_count: u32,
    /// Whether the block ledger balanced.
    pub balanced: bool,
}

/// Execute a single tick.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter would overflow and
/// [`TickError::Ledger`] if a ledger posting is rejected.
pub fn run_tick(state: &mut WorldState) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;
    let before = state.census();
    state.ledger.begin_tick(tick, before)?;

    let world = &state.config.world;

    // --- Phase 1: Gas ---
    state.gas.diffuse();

    // --- Phase 2: Blocks ---
    state
        .pool
        .update(world.attraction_range, world.global_speed, &mut state.rng);
    let spawned = state.pool.spawn_random(&mut state.rng);
    if let Some(block_type) = spawned {
        state.ledger.record_spawn(block_type)?;
    }

    // --- Phase 3: Formation ---
    let mut formed = None;
    if let Some(outcome) = try_form(
        &mut state.pool,
        &state.archetypes,
        &state.config.formation,
        state.config.behavior.max_energy,
        &mut state.rng,
    ) {
        state
            .ledger
            .record_composition(FlowKind::Formation, &outcome.consumed)?;
        formed = Some((outcome.organism.id, outcome.organism.species));
        state.registry.push(outcome.organism);
    }

    // --- Phase 4: Organisms ---
    let mut ctx = UpdateContext {
        gas: &mut state.gas,
        pool: &mut state.pool,
        archetypes: &state.archetypes,
        config: &state.config.behavior,
        bounds: state.bounds,
        speed: world.global_speed,
    };
    let report = state.registry.update_all(&mut ctx, &mut state.rng);
    state
        .ledger
        .record_composition(FlowKind::Release, &report.released())?;
    state
        .ledger
        .record_composition(FlowKind::Reproduction, &report.reproduced())?;

    // --- Phase 5: Ledger ---
    let after = state.census();
    let balanced = match state.ledger.close_tick(&after)? {
        ConservationResult::Balanced => true,
        ConservationResult::Anomaly(anomaly) => {
            warn!(
                tick,
                imbalances = anomaly.imbalances.len(),
                total_anomalies = state.ledger.anomaly_count(),
                "{anomaly}"
            );
            false
        }
    };

    let starvations = report.deaths_by_starvation();
    let summary = TickSummary {
        tick,
        spawned,
        formed,
        births: saturating_u32(report.births.len()),
        starvations: saturating_u32(starvations),
        predations: saturating_u32(report.deaths.len().saturating_sub(starvations)),
        hibernated: report.hibernated,
        woke: report.woke,
        skipped: report.skipped,
        organism_count: saturating_u32(state.registry.len()),
        free_block_count: saturating_u32(state.pool.len()),
        balanced,
    };

    debug!(
        tick,
        organisms = summary.organism_count,
        free_blocks = summary.free_block_count,
        births = summary.births,
        starvations = summary.starvations,
        predations = summary.predations,
        formed = summary.formed.is_some(),
        "tick complete"
    );

    Ok(summary)
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use accretion_types::Vec2;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.width = 200.0;
        config.world.height = 200.0;
        config.world.initial_block_count = 60;
        config
    }

    #[test]
    fn tick_advances_clock() {
        let mut state = WorldState::new(quiet_config()).unwrap();
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(state.tick(), 1);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 2);
    }

    #[test]
    fn ledger_balances_over_many_ticks() {
        let mut config = quiet_config();
        config.blocks.spawn_chance = 0.5;
        config.formation.attempt_chance = 0.05;
        let mut state = WorldState::new(config).unwrap();
        state.spawn_organism(Species::Grazer, Vec2::new(50.0, 50.0)).unwrap();
        state.spawn_organism(Species::Hunter, Vec2::new(60.0, 50.0)).unwrap();

        for _ in 0..300 {
            let summary = run_tick(&mut state).unwrap();
            assert!(summary.balanced, "tick {} unbalanced", summary.tick);
        }
        assert_eq!(state.ledger().anomaly_count(), 0);
        assert_eq!(state.ledger().open_tick(), None);
    }

    #[test]
    fn spawn_is_posted_to_ledger() {
        let mut config = quiet_config();
        config.blocks.spawn_chance = 1.0;
        config.formation.attempt_chance = 0.0;
        let mut state = WorldState::new(config).unwrap();

        let summary = run_tick(&mut state).unwrap();
        assert!(summary.spawned.is_some());
        assert_eq!(summary.free_block_count, 61);
        let spawned = state.ledger().lifetime_totals().get(FlowKind::Spawn).total();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn tampering_between_postings_is_an_anomaly() {
        let mut config = quiet_config();
        config.blocks.spawn_chance = 0.0;
        config.formation.attempt_chance = 0.0;
        let mut state = WorldState::new(config).unwrap();

        // Open a tick by hand, then remove a block without posting a flow.
        let before = state.census();
        state.ledger.begin_tick(99, before).unwrap();
        let _ = state.pool.remove_descending(&[0]);
        let after = state.census();
        let result = state.ledger.close_tick(&after).unwrap();
        assert!(matches!(result, ConservationResult::Anomaly(_)));
        assert_eq!(state.ledger().anomaly_count(), 1);

        // Ordinary ticks still run afterwards.
        assert!(run_tick(&mut state).unwrap().balanced);
    }
}
