//! Tick callback that logs population stats at a fixed interval.

use accretion_core::runner::TickCallback;
use accretion_core::{TickSummary, WorldState};
use tracing::{debug, info};

/// Logs the [`WorldState::stats`] summary every `interval` ticks.
pub struct StatsLogger {
    interval: u64,
}

impl StatsLogger {
    /// Log every `interval` ticks; 0 disables logging.
    pub const fn new(interval: u64) -> Self {
        Self { interval }
    }

    fn is_due(&self, tick: u64) -> bool {
        tick.checked_rem(self.interval) == Some(0)
    }
}

impl TickCallback for StatsLogger {
    fn on_tick(&mut self, summary: &TickSummary, state: &WorldState) {
        if !self.is_due(summary.tick) {
            return;
        }
        let stats = state.stats();
        info!(
            tick = stats.tick,
            organisms = stats.organism_count,
            hibernating = stats.hibernating_count,
            mean_energy = stats.mean_energy,
            mean_age = stats.mean_age,
            free_blocks = stats.free_block_count,
            embedded_blocks = stats.embedded_block_count,
            mean_oxygen = stats.mean_oxygen,
            mean_co2 = stats.mean_co2,
            ledger_anomalies = state.ledger().anomaly_count(),
            "Population stats"
        );
        match serde_json::to_string(&stats.species) {
            Ok(species) => debug!(tick = stats.tick, %species, "Species breakdown"),
            Err(e) => debug!(tick = stats.tick, error = %e, "Species breakdown unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_on_multiples_of_interval() {
        let logger = StatsLogger::new(100);
        assert!(!logger.is_due(1));
        assert!(!logger.is_due(99));
        assert!(logger.is_due(100));
        assert!(logger.is_due(300));
    }

    #[test]
    fn zero_interval_never_logs() {
        let logger = StatsLogger::new(0);
        assert!(!logger.is_due(0));
        assert!(!logger.is_due(100));
    }
}
