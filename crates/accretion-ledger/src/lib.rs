//! Block-mass ledger for the Accretion simulation.
//!
//! Every building block in the world is either free (drifting in the block
//! pool) or embedded (a count inside some organism's composition). Blocks
//! change side only through a small set of flows, and only two flows create
//! blocks from nothing. The ledger records every flow posted during a tick
//! and checks the census against them when the tick closes.
//!
//! # Flows
//!
//! | Kind | Free side | Embedded side |
//! |------|-----------|---------------|
//! | Formation | − | + |
//! | Release (death, predation) | + | − |
//! | Spawn (spontaneous generation) | + | |
//! | Reproduction (child composition) | | + |
//!
//! # Conservation Law
//!
//! For every tick T and every block type B:
//!
//! ```text
//! free_after     = free_before     − formed + released + spawned
//! embedded_after = embedded_before + formed − released + reproduced
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics and
//! never halts the simulation; anomalies are returned for the caller to log.
//!
//! # Modules
//!
//! - [`conservation`] -- Census comparison and anomaly detection.
//! - [`ledger`] -- The [`BlockLedger`]: per-tick flow log with recording methods.
//!
//! # Usage
//!
//! ```
//! use accretion_ledger::{BlockCensus, BlockLedger, ConservationResult};
//! use accretion_types::{BlockType, Composition};
//!
//! let mut ledger = BlockLedger::new();
//! let before = BlockCensus {
//!     free: Composition::from_pairs(&[(BlockType::Carbon, 3)]),
//!     embedded: Composition::empty(),
//! };
//! ledger.begin_tick(1, before).ok();
//!
//! // Two carbon blocks go into a new organism.
//! ledger.record_formation(BlockType::Carbon, 2).ok();
//!
//! let after = BlockCensus {
//!     free: Composition::from_pairs(&[(BlockType::Carbon, 1)]),
//!     embedded: Composition::from_pairs(&[(BlockType::Carbon, 2)]),
//! };
//! let result = ledger.close_tick(&after);
//! assert!(matches!(result, Ok(ConservationResult::Balanced)));
//! ```

pub mod conservation;
pub mod ledger;

// Re-export primary types at crate root.
pub use conservation::{ConservationResult, verify_conservation};
pub use ledger::{BlockFlow, BlockLedger, FlowKind, FlowTotals};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use accretion_types::{BlockType, Composition};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger flows.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Quantity must be strictly positive.
    #[error("ledger flow quantity must be non-zero")]
    ZeroQuantity,

    /// A flow was posted, or a tick closed, while no tick was open.
    #[error("no tick is open on the ledger")]
    NoOpenTick,

    /// A new tick was opened before the previous one was closed.
    #[error("tick {open} is still open, cannot begin tick {requested}")]
    TickStillOpen {
        /// The tick that is currently open.
        open: u64,
        /// The tick the caller tried to open.
        requested: u64,
    },
}

// ---------------------------------------------------------------------------
// Census
// ---------------------------------------------------------------------------

/// Which side of the free/embedded split a quantity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Blocks drifting in the pool.
    Free,
    /// Blocks inside living organisms.
    Embedded,
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

/// A snapshot count of every block in the world, by side and type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCensus {
    /// Free blocks per type.
    pub free: Composition,
    /// Embedded blocks per type, summed over all living organisms.
    pub embedded: Composition,
}

impl BlockCensus {
    /// Total blocks on both sides.
    pub fn total(&self) -> u64 {
        self.free.total().saturating_add(self.embedded.total())
    }

    /// The count for one side and type.
    pub fn get(&self, side: Side, block_type: BlockType) -> u32 {
        match side {
            Side::Free => self.free.get(block_type),
            Side::Embedded => self.embedded.get(block_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation detected when closing a tick.
///
/// Each imbalance maps `(side, block type)` to the `(expected, actual)`
/// count. `expected` is signed: a corrupted flow log can predict a
/// negative count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// Per-side, per-type imbalance: (`expected`, `actual`).
    pub imbalances: BTreeMap<(Side, BlockType), (i64, i64)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
