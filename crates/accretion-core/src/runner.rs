//! Simulation loop runner with host controls.
//!
//! [`run_simulation`] drives [`run_tick`](crate::tick::run_tick) in a loop
//! with support for:
//!
//! - **Bounded runs**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Start/pause**: the host toggles [`HostControl::set_running`]
//! - **Variable tick speed**: the interval is re-read before every sleep
//! - **Clean stop**: [`HostControl::request_stop`] ends the loop between ticks

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::operator::{HostControl, RunEndReason};
use crate::state::WorldState;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations receive the tick summary and read access to the whole
/// world, for logging stats or handing frames to a display.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &WorldState);
}

/// A tick callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &WorldState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    state: &mut WorldState,
    control: &Arc<HostControl>,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        run_id = %state.run_id(),
        max_ticks = control.max_ticks(),
        max_real_time_seconds = control.max_real_time_seconds(),
        tick_interval_ms = control.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        if !control.is_running() && !control.is_stop_requested() {
            info!("Simulation paused, waiting for host");
            control.wait_until_running().await;
            info!("Simulation resumed");
        }

        let end_reason = if control.is_stop_requested() {
            info!("Host stop requested");
            Some(RunEndReason::OperatorStop)
        } else if control.time_limit_reached() {
            info!(
                max_seconds = control.max_real_time_seconds(),
                elapsed = control.elapsed_seconds(),
                "Real-time limit reached"
            );
            Some(RunEndReason::MaxRealTimeReached)
        } else {
            None
        };
        if let Some(reason) = end_reason {
            control.set_end_reason(reason).await;
            return Ok(RunResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, state);

        // run_tick advances the clock first, so summary.tick is the tick
        // that just completed.
        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            let reason = RunEndReason::MaxTicksReached;
            control.set_end_reason(reason).await;
            return Ok(RunResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log how a run ended.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            organisms = summary.organism_count,
            free_blocks = summary.free_block_count,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{RunConfig, SimulationConfig};

    fn make_state() -> WorldState {
        let mut config = SimulationConfig::default();
        config.world.width = 120.0;
        config.world.height = 120.0;
        config.world.initial_block_count = 30;
        WorldState::new(config).unwrap()
    }

    fn run_config(max_ticks: u64) -> RunConfig {
        RunConfig {
            max_ticks,
            max_real_time_seconds: 0,
            tick_interval_ms: 0,
            start_running: true,
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut state = make_state();
        let control = Arc::new(HostControl::new(&run_config(5)));
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, RunEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
        assert_eq!(state.tick(), 5);
        assert_eq!(
            control.end_reason().await,
            Some(RunEndReason::MaxTicksReached)
        );
    }

    #[test]
    fn paused_host_does_not_gate_direct_ticks() {
        let mut state = make_state();
        let control = HostControl::new(&RunConfig {
            start_running: false,
            ..run_config(0)
        });

        for _ in 0..3 {
            crate::tick::run_tick(&mut state).unwrap();
        }

        assert!(!control.is_running());
        assert_eq!(state.tick(), 3);
    }

    #[tokio::test]
    async fn operator_stop_before_first_tick() {
        let mut state = make_state();
        let control = Arc::new(HostControl::new(&run_config(0)));
        control.request_stop();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, RunEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn stop_while_paused_ends_cleanly() {
        let mut state = make_state();
        let control = Arc::new(HostControl::new(&RunConfig {
            start_running: false,
            ..run_config(0)
        }));
        let stopper = {
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                control.request_stop();
            })
        };
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();
        stopper.await.unwrap();

        assert_eq!(result.end_reason, RunEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn callback_can_stop_the_run() {
        struct StopAfter {
            remaining: u32,
            control: Arc<HostControl>,
        }
        impl TickCallback for StopAfter {
            fn on_tick(&mut self, _summary: &TickSummary, _state: &WorldState) {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.control.request_stop();
                }
            }
        }

        let mut state = make_state();
        let control = Arc::new(HostControl::new(&run_config(0)));
        let mut cb = StopAfter {
            remaining: 3,
            control: Arc::clone(&control),
        };

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, RunEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(3));
    }
}
