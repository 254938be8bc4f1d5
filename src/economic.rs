//! Block subsidy schedule
//!
//! The subsidy is the base reward only. Fees are accumulated separately by
//! the commitment algorithm through per-transaction input/output sums.

use crate::constants::*;
use crate::types::Natural;

/// Subsidy for a block at the given height. Halves every `HALVING_INTERVAL`
/// blocks and reaches zero after 64 halvings.
pub fn get_block_subsidy(height: Natural) -> Natural {
    let halvings = height / HALVING_INTERVAL;
    if halvings >= 64 {
        return 0;
    }
    INITIAL_SUBSIDY >> halvings
}
