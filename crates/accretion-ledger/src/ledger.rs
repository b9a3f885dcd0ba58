//! The block ledger: a per-tick log of every block flow.
//!
//! The [`BlockLedger`] opens a tick with a census, accepts flow postings
//! while the tick runs, and closes the tick by checking a second census
//! against the posted flows. Closed flows are folded into lifetime totals
//! and the per-tick log is cleared, so memory stays bounded however long
//! the simulation runs.

use serde::{Deserialize, Serialize};

use accretion_types::{BlockType, Composition};

use crate::conservation::{ConservationResult, verify_conservation};
use crate::{BlockCensus, LedgerError};

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// The category of a block flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    /// Free blocks consumed by the formation engine.
    Formation,
    /// Embedded blocks returned to the pool by death or predation.
    Release,
    /// A free block created by spontaneous generation.
    Spawn,
    /// Embedded blocks created for a child organism.
    Reproduction,
}

impl core::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Formation => "formation",
            Self::Release => "release",
            Self::Spawn => "spawn",
            Self::Reproduction => "reproduction",
        };
        write!(f, "{name}")
    }
}

/// One recorded movement of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFlow {
    /// Tick the flow was posted in.
    pub tick: u64,
    /// What kind of movement this is.
    pub kind: FlowKind,
    /// The block type moved.
    pub block_type: BlockType,
    /// How many blocks moved. Always positive.
    pub quantity: u32,
}

/// Flow quantities summed per kind and block type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTotals {
    /// Blocks moved free to embedded.
    pub formed: Composition,
    /// Blocks moved embedded to free.
    pub released: Composition,
    /// Blocks created on the free side.
    pub spawned: Composition,
    /// Blocks created on the embedded side.
    pub reproduced: Composition,
}

impl FlowTotals {
    /// Sum a slice of flows.
    pub fn from_flows(flows: &[BlockFlow]) -> Self {
        let mut totals = Self::default();
        for flow in flows {
            totals.add(flow.kind, flow.block_type, flow.quantity);
        }
        totals
    }

    /// Add a quantity under one kind.
    pub fn add(&mut self, kind: FlowKind, block_type: BlockType, quantity: u32) {
        self.slot_mut(kind).add(block_type, quantity);
    }

    /// Fold another set of totals into this one.
    pub fn merge(&mut self, other: &Self) {
        self.formed.merge(&other.formed);
        self.released.merge(&other.released);
        self.spawned.merge(&other.spawned);
        self.reproduced.merge(&other.reproduced);
    }

    /// The per-type totals for one kind.
    pub const fn get(&self, kind: FlowKind) -> &Composition {
        match kind {
            FlowKind::Formation => &self.formed,
            FlowKind::Release => &self.released,
            FlowKind::Spawn => &self.spawned,
            FlowKind::Reproduction => &self.reproduced,
        }
    }

    const fn slot_mut(&mut self, kind: FlowKind) -> &mut Composition {
        match kind {
            FlowKind::Formation => &mut self.formed,
            FlowKind::Release => &mut self.released,
            FlowKind::Spawn => &mut self.spawned,
            FlowKind::Reproduction => &mut self.reproduced,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// State of the tick currently being recorded.
#[derive(Debug, Clone, Copy)]
struct OpenTick {
    tick: u64,
    before: BlockCensus,
}

/// The block ledger for one simulation run.
///
/// Every block movement -- formation, release, spawn, reproduction --
/// produces one [`BlockFlow`] posted while a tick is open.
#[derive(Debug, Default)]
pub struct BlockLedger {
    /// The tick being recorded, if any.
    open: Option<OpenTick>,
    /// Flows posted in the open tick, in insertion order.
    entries: Vec<BlockFlow>,
    /// Sum of all flows in closed ticks.
    lifetime: FlowTotals,
    /// Number of closed ticks that produced an anomaly.
    anomaly_count: u64,
}

impl BlockLedger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            open: None,
            entries: Vec::new(),
            lifetime: FlowTotals {
                formed: Composition::empty(),
                released: Composition::empty(),
                spawned: Composition::empty(),
                reproduced: Composition::empty(),
            },
            anomaly_count: 0,
        }
    }

    /// Open a tick with the census taken before any update runs.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TickStillOpen`] if the previous tick was
    /// never closed.
    pub fn begin_tick(&mut self, tick: u64, before: BlockCensus) -> Result<(), LedgerError> {
        if let Some(open) = self.open {
            return Err(LedgerError::TickStillOpen {
                open: open.tick,
                requested: tick,
            });
        }
        self.entries.clear();
        self.open = Some(OpenTick { tick, before });
        Ok(())
    }

    /// Record a flow in the open tick.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroQuantity`] for a zero quantity and
    /// [`LedgerError::NoOpenTick`] if no tick is open.
    pub fn record(
        &mut self,
        kind: FlowKind,
        block_type: BlockType,
        quantity: u32,
    ) -> Result<&BlockFlow, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::ZeroQuantity);
        }
        let open = self.open.ok_or(LedgerError::NoOpenTick)?;
        self.entries.push(BlockFlow {
            tick: open.tick,
            kind,
            block_type,
            quantity,
        });
        self.entries.last().ok_or(LedgerError::NoOpenTick)
    }

    /// Record one flow per non-zero entry of a composition.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoOpenTick`] if no tick is open. An empty
    /// composition records nothing and succeeds.
    pub fn record_composition(
        &mut self,
        kind: FlowKind,
        composition: &Composition,
    ) -> Result<(), LedgerError> {
        for (block_type, count) in composition.iter() {
            self.record(kind, block_type, count)?;
        }
        Ok(())
    }

    /// Record free blocks consumed by formation.
    ///
    /// # Errors
    ///
    /// See [`BlockLedger::record`].
    pub fn record_formation(
        &mut self,
        block_type: BlockType,
        quantity: u32,
    ) -> Result<&BlockFlow, LedgerError> {
        self.record(FlowKind::Formation, block_type, quantity)
    }

    /// Record embedded blocks released into the pool.
    ///
    /// # Errors
    ///
    /// See [`BlockLedger::record`].
    pub fn record_release(
        &mut self,
        block_type: BlockType,
        quantity: u32,
    ) -> Result<&BlockFlow, LedgerError> {
        self.record(FlowKind::Release, block_type, quantity)
    }

    /// Record a spontaneously generated free block.
    ///
    /// # Errors
    ///
    /// See [`BlockLedger::record`].
    pub fn record_spawn(&mut self, block_type: BlockType) -> Result<&BlockFlow, LedgerError> {
        self.record(FlowKind::Spawn, block_type, 1)
    }

    /// Record embedded blocks created for a child organism.
    ///
    /// # Errors
    ///
    /// See [`BlockLedger::record`].
    pub fn record_reproduction(
        &mut self,
        block_type: BlockType,
        quantity: u32,
    ) -> Result<&BlockFlow, LedgerError> {
        self.record(FlowKind::Reproduction, block_type, quantity)
    }

    /// Close the open tick, verifying `after` against the opening census
    /// and the posted flows.
    ///
    /// The tick is closed whether or not it balanced.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoOpenTick`] if no tick is open.
    pub fn close_tick(&mut self, after: &BlockCensus) -> Result<ConservationResult, LedgerError> {
        let open = self.open.take().ok_or(LedgerError::NoOpenTick)?;
        let totals = FlowTotals::from_flows(&self.entries);
        let result = verify_conservation(open.tick, &open.before, after, &totals);
        if matches!(result, ConservationResult::Anomaly(_)) {
            self.anomaly_count = self.anomaly_count.saturating_add(1);
        }
        self.lifetime.merge(&totals);
        self.entries.clear();
        Ok(result)
    }

    /// Drop any open tick and all totals.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The tick currently open, if any.
    pub fn open_tick(&self) -> Option<u64> {
        self.open.map(|open| open.tick)
    }

    /// Flows posted in the open tick.
    pub fn entries(&self) -> &[BlockFlow] {
        &self.entries
    }

    /// Sum of all flows in closed ticks.
    pub const fn lifetime_totals(&self) -> &FlowTotals {
        &self.lifetime
    }

    /// Number of closed ticks that failed the conservation check.
    pub const fn anomaly_count(&self) -> u64 {
        self.anomaly_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census(free: &[(BlockType, u32)], embedded: &[(BlockType, u32)]) -> BlockCensus {
        BlockCensus {
            free: Composition::from_pairs(free),
            embedded: Composition::from_pairs(embedded),
        }
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = BlockLedger::new();
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.open_tick(), None);
        assert_eq!(ledger.anomaly_count(), 0);
    }

    #[test]
    fn record_requires_open_tick() {
        let mut ledger = BlockLedger::new();
        let result = ledger.record_spawn(BlockType::Carbon);
        assert!(matches!(result, Err(LedgerError::NoOpenTick)));
    }

    #[test]
    fn zero_quantity_rejected() {
        let mut ledger = BlockLedger::new();
        assert!(ledger.begin_tick(1, BlockCensus::default()).is_ok());
        let result = ledger.record_formation(BlockType::Lipid, 0);
        assert!(matches!(result, Err(LedgerError::ZeroQuantity)));
    }

    #[test]
    fn double_open_rejected() {
        let mut ledger = BlockLedger::new();
        assert!(ledger.begin_tick(1, BlockCensus::default()).is_ok());
        let result = ledger.begin_tick(2, BlockCensus::default());
        assert!(matches!(
            result,
            Err(LedgerError::TickStillOpen {
                open: 1,
                requested: 2
            })
        ));
    }

    #[test]
    fn formation_then_death_balances() {
        let mut ledger = BlockLedger::new();
        let before = census(&[(BlockType::Protein, 5)], &[]);
        assert!(ledger.begin_tick(7, before).is_ok());
        assert!(ledger.record_formation(BlockType::Protein, 3).is_ok());
        assert!(ledger.record_release(BlockType::Protein, 3).is_ok());
        let after = census(&[(BlockType::Protein, 5)], &[]);
        let result = ledger.close_tick(&after);
        assert!(matches!(result, Ok(ConservationResult::Balanced)));
        assert_eq!(ledger.lifetime_totals().formed.get(BlockType::Protein), 3);
        assert_eq!(ledger.lifetime_totals().released.get(BlockType::Protein), 3);
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.open_tick(), None);
    }

    #[test]
    fn reproduction_adds_embedded_mass() {
        let mut ledger = BlockLedger::new();
        let parent = Composition::from_pairs(&[(BlockType::Carbon, 2), (BlockType::Pigment, 2)]);
        let before = BlockCensus {
            free: Composition::empty(),
            embedded: parent,
        };
        assert!(ledger.begin_tick(1, before).is_ok());
        assert!(ledger.record_composition(FlowKind::Reproduction, &parent).is_ok());
        assert_eq!(ledger.entries().len(), 2);
        let mut embedded = parent;
        embedded.merge(&parent);
        let after = BlockCensus {
            free: Composition::empty(),
            embedded,
        };
        let result = ledger.close_tick(&after);
        assert!(matches!(result, Ok(ConservationResult::Balanced)));
    }

    #[test]
    fn unposted_change_is_counted_as_anomaly() {
        let mut ledger = BlockLedger::new();
        let before = census(&[(BlockType::Enzyme, 4)], &[]);
        assert!(ledger.begin_tick(3, before).is_ok());
        let after = census(&[(BlockType::Enzyme, 3)], &[]);
        let result = ledger.close_tick(&after);
        assert!(matches!(result, Ok(ConservationResult::Anomaly(_))));
        assert_eq!(ledger.anomaly_count(), 1);

        // The ledger stays usable after an anomaly.
        assert!(ledger.begin_tick(4, after).is_ok());
    }

    #[test]
    fn flows_serialize_to_json() {
        let flow = BlockFlow {
            tick: 9,
            kind: FlowKind::Spawn,
            block_type: BlockType::Nutrient,
            quantity: 1,
        };
        let json = serde_json::to_string(&flow).ok();
        assert!(json.is_some());
        let json = json.unwrap_or_default();
        assert!(json.contains("\"Spawn\""));
        assert!(json.contains("\"Nutrient\""));
    }
}
