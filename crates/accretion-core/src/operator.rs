//! Host run-control shared between the tick loop and the host.
//!
//! The host (a display front end, a CLI, a signal handler) can start and
//! pause the loop, change its tick interval, and request a clean stop, all
//! without locks on the tick loop's hot path.
//!
//! # Architecture
//!
//! Control flags are [`std::sync::atomic`] values inside a [`HostControl`]
//! that is shared behind an [`Arc`](std::sync::Arc). A [`Notify`] wakes
//! the loop when it is waiting for the host to resume.
//!
//! The pause flag is host-side only. [`WorldState`](crate::WorldState) and
//! [`run_tick`](crate::run_tick) hold no running state; only
//! [`run_simulation`](crate::run_simulation) consults a [`HostControl`],
//! and a host that drives `run_tick` itself never needs one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::RunConfig;

/// Reason why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// The host requested a stop.
    OperatorStop,
}

/// Shared host control state.
#[derive(Debug)]
pub struct HostControl {
    /// Whether the loop should execute ticks.
    running: AtomicBool,

    /// Wakes the loop when it is resumed or stopped while paused.
    wake: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time the control was created.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<RunEndReason>>,
}

impl HostControl {
    /// Create control state from the run configuration.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            running: AtomicBool::new(config.start_running),
            wake: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(config.tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: config.max_ticks,
            max_real_time_seconds: config.max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Whether the loop should be executing ticks.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start or pause the loop.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
        if running {
            self.wake.notify_one();
        }
    }

    /// Wait until the loop is running or a stop has been requested.
    ///
    /// Returns immediately if already running.
    pub async fn wait_until_running(&self) {
        while !self.is_running() && !self.is_stop_requested() {
            self.wake.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. Wakes a paused loop so it can exit.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the run ended.
    pub async fn set_end_reason(&self, reason: RunEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// The reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<RunEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval and return the previous one. 0 runs ticks
    /// back to back.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Whether `max_real_time_seconds > 0` and that many seconds have
    /// elapsed since start.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds elapsed since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // A clock step backwards reads as zero elapsed.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// The configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// The configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}
