//! Conservation law verification for the block ledger.
//!
//! Movement, damping, breathing and hibernation never change how many
//! blocks exist or which side they are on. Only posted flows may. For each
//! block type the check predicts the closing census from the opening census
//! and the tick's flow totals:
//!
//! ```text
//! free_after     = free_before     − formed + released + spawned
//! embedded_after = embedded_before + formed − released + reproduced
//! ```
//!
//! Any type whose actual count differs from the prediction, on either side,
//! is reported in a [`LedgerAnomaly`].

use std::collections::BTreeMap;

use accretion_types::BlockType;

use crate::ledger::FlowTotals;
use crate::{BlockCensus, LedgerAnomaly, Side};

/// The result of a conservation check for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every block is accounted for.
    Balanced,
    /// One or more block types changed without a matching flow.
    Anomaly(LedgerAnomaly),
}

/// Verify the conservation law for one tick.
///
/// `before` and `after` are censuses taken at the start and end of the
/// tick; `flows` is the sum of every flow posted in between.
pub fn verify_conservation(
    tick: u64,
    before: &BlockCensus,
    after: &BlockCensus,
    flows: &FlowTotals,
) -> ConservationResult {
    let mut imbalances: BTreeMap<(Side, BlockType), (i64, i64)> = BTreeMap::new();

    for block_type in BlockType::ALL {
        let formed = i64::from(flows.formed.get(block_type));
        let released = i64::from(flows.released.get(block_type));
        let spawned = i64::from(flows.spawned.get(block_type));
        let reproduced = i64::from(flows.reproduced.get(block_type));

        let free_before = i64::from(before.free.get(block_type));
        let embedded_before = i64::from(before.embedded.get(block_type));

        // Every operand fits in u32, so the sums cannot leave i64.
        let Some(free_expected) = free_before
            .checked_sub(formed)
            .and_then(|v| v.checked_add(released))
            .and_then(|v| v.checked_add(spawned))
        else {
            return overflow_anomaly(tick, Side::Free, block_type);
        };
        let Some(embedded_expected) = embedded_before
            .checked_add(formed)
            .and_then(|v| v.checked_sub(released))
            .and_then(|v| v.checked_add(reproduced))
        else {
            return overflow_anomaly(tick, Side::Embedded, block_type);
        };

        let free_actual = i64::from(after.free.get(block_type));
        let embedded_actual = i64::from(after.embedded.get(block_type));

        if free_actual != free_expected {
            imbalances.insert((Side::Free, block_type), (free_expected, free_actual));
        }
        if embedded_actual != embedded_expected {
            imbalances.insert(
                (Side::Embedded, block_type),
                (embedded_expected, embedded_actual),
            );
        }
    }

    if imbalances.is_empty() {
        ConservationResult::Balanced
    } else {
        let detail = imbalances
            .iter()
            .map(|((side, block_type), (expected, actual))| {
                format!("{side} {block_type}: expected {expected}, found {actual}")
            })
            .collect::<Vec<_>>()
            .join("; ");
        ConservationResult::Anomaly(LedgerAnomaly {
            tick,
            imbalances,
            message: format!("BLOCK_LEDGER_ANOMALY at tick {tick}: {detail}"),
        })
    }
}

/// Construct an anomaly result for arithmetic overflow during prediction.
fn overflow_anomaly(tick: u64, side: Side, block_type: BlockType) -> ConservationResult {
    let mut imbalances = BTreeMap::new();
    imbalances.insert((side, block_type), (0, 0));
    ConservationResult::Anomaly(LedgerAnomaly {
        tick,
        imbalances,
        message: format!(
            "BLOCK_LEDGER_ANOMALY at tick {tick}: arithmetic overflow predicting {side} {block_type}",
        ),
    })
}
