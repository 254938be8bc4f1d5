//! Transaction sanity and finality checks
//!
//! Used outside block commitment, e.g. before a transaction is considered
//! for inclusion. The batch entry point is advisory: every transaction is
//! checked even after a failure.

use std::collections::HashSet;

use crate::constants::*;
use crate::error::{CommitError, Result};
use crate::types::{hex_hash, Natural, Transaction};
use crate::verify_pool::BoundedVerifierPool;

/// Structural self-consistency check.
pub fn check_transaction(tx: &Transaction) -> Result<()> {
    if tx.inputs.is_empty() {
        return Err(CommitError::MalformedTransaction("no inputs".to_string()));
    }
    if tx.outputs.is_empty() {
        return Err(CommitError::MalformedTransaction("no outputs".to_string()));
    }

    let mut value_total: Natural = 0;
    for output in &tx.outputs {
        if output.value > MAX_MONEY {
            return Err(CommitError::MalformedTransaction(format!(
                "output value {} above money range",
                output.value
            )));
        }
        value_total = value_total
            .checked_add(output.value)
            .ok_or(CommitError::AmountOverflow)?;
        if value_total > MAX_MONEY {
            return Err(CommitError::MalformedTransaction(
                "output total above money range".to_string(),
            ));
        }
    }

    if tx.is_coinbase() {
        let script_len = tx.inputs[0].script_sig.len();
        if !(COINBASE_SCRIPT_MIN..=COINBASE_SCRIPT_MAX).contains(&script_len) {
            return Err(CommitError::CoinbaseScriptLength(script_len));
        }
    } else {
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            if input.prevout.is_null() {
                return Err(CommitError::MalformedTransaction(
                    "null input reference".to_string(),
                ));
            }
            if !seen.insert(input.prevout) {
                return Err(CommitError::MalformedTransaction(format!(
                    "duplicate input {}",
                    input.prevout
                )));
            }
        }
    }

    Ok(())
}

impl Transaction {
    /// Whether the transaction is eligible for inclusion at the given height
    /// and block time. A lock time below `LOCKTIME_THRESHOLD` is a height,
    /// above it a timestamp; either way, final sequence numbers on every
    /// input override an unexpired lock time.
    pub fn is_final(&self, height: Natural, block_time: u32) -> bool {
        if self.lock_time == 0 {
            return true;
        }
        let cutoff = if self.lock_time < LOCKTIME_THRESHOLD {
            height
        } else {
            block_time as Natural
        };
        if (self.lock_time as Natural) < cutoff {
            return true;
        }
        self.inputs.iter().all(|input| input.sequence == SEQUENCE_FINAL)
    }
}

/// Concurrently check a batch of transactions for structural consistency and
/// finality. Returns true only if every transaction passes both checks; all
/// transactions are checked regardless of earlier failures.
pub fn check_transactions_batch(
    txs: &[Transaction],
    height: Natural,
    block_time: u32,
    workers: usize,
) -> bool {
    let pool = BoundedVerifierPool::new(workers);
    let mut ok = true;
    std::thread::scope(|scope| {
        pool.prime();
        for tx in txs {
            if !pool.take() {
                ok = false;
            }
            pool.launch(scope, move || {
                if let Err(e) = check_transaction(tx) {
                    log::debug!("tx {} failed sanity check: {}", hex_hash(&tx.hash), e);
                    return false;
                }
                tx.is_final(height, block_time)
            });
        }
        if !pool.drain() {
            ok = false;
        }
    });
    ok
}
