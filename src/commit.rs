//! Per-block transaction commitment
//!
//! Folds one block's transactions into a ledger delta while enforcing the
//! monetary and scripting rules: intra-block double-spend detection,
//! coinbase shape, per-transaction and per-block "outputs do not exceed
//! inputs", and parallel script verification through the bounded pool.

use std::collections::HashMap;

use crate::chain::Chain;
use crate::constants::*;
use crate::economic::get_block_subsidy;
use crate::error::{CommitError, Result};
use crate::types::{hex_hash, Block, BlockChanges, Hash, Natural, OutPoint, UtxoRecord};
use crate::verify_pool::BoundedVerifierPool;

/// Outputs created by this block, resolvable by its own transactions before
/// they reach the ledger. A slot is nulled once spent.
type BlockOutputs = HashMap<Hash, Vec<Option<UtxoRecord>>>;

fn pick_block_output(block_outs: &mut BlockOutputs, prevout: &OutPoint) -> Result<UtxoRecord> {
    let slots = block_outs
        .get_mut(&prevout.hash)
        .ok_or(CommitError::UnknownInput(*prevout))?;
    let slot = slots
        .get_mut(prevout.index as usize)
        .ok_or(CommitError::OutputIndexOutOfRange(*prevout))?;
    slot.take().ok_or(CommitError::OutputAlreadySpent(*prevout))
}

impl Chain {
    /// Validate the block's transactions at the given height and compute the
    /// ledger delta. Nothing is written: the caller applies the returned
    /// delta only after deciding the block advances the tip.
    pub fn commit_block_transactions(&self, block: &Block, height: Natural) -> Result<BlockChanges> {
        let mut changes = BlockChanges::new(height);
        changes.last_known_height = block.last_known_height;

        let mut block_outs: BlockOutputs = HashMap::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            let outs = tx
                .outputs
                .iter()
                .map(|out| {
                    Some(UtxoRecord {
                        value: out.value,
                        script_pubkey: out.script_pubkey.clone(),
                        height,
                    })
                })
                .collect();
            block_outs.insert(tx.hash, outs);
        }

        let legacy_rule_active = block.timestamp() >= BIP16_SWITCH_TIME;
        let pool = BoundedVerifierPool::new(self.config.verify_workers);
        let verifier = &*self.verifier;

        // The subsidy seeds the input side; fees enter through the
        // per-transaction sums below.
        let mut block_in_total = get_block_subsidy(height);
        let mut block_out_total: Natural = 0;

        std::thread::scope(|scope| -> Result<()> {
            for (i, tx) in block.transactions.iter().enumerate() {
                let mut tx_in_total: Natural = 0;
                let mut tx_out_total: Natural = 0;

                if i == 0 {
                    // Coinbase inputs resolve against nothing; only the
                    // unlocking-script length is checked.
                    let script_len = tx
                        .inputs
                        .first()
                        .map(|inp| inp.script_sig.len())
                        .unwrap_or(0);
                    if !(COINBASE_SCRIPT_MIN..=COINBASE_SCRIPT_MAX).contains(&script_len) {
                        return Err(CommitError::CoinbaseScriptLength(script_len));
                    }
                } else {
                    let tx_trusted = block.trusted
                        || self
                            .oracle
                            .as_ref()
                            .map_or(false, |oracle| oracle.is_pretrusted(&tx.hash));

                    pool.prime();
                    let mut scripts_ok = true;
                    let mut input_err: Option<CommitError> = None;

                    for (j, inp) in tx.inputs.iter().enumerate() {
                        if changes.deleted.contains_key(&inp.prevout) {
                            input_err = Some(CommitError::DoubleSpend(inp.prevout));
                            break;
                        }

                        let record;
                        let from_ledger;
                        match self.ledger.lookup(&inp.prevout) {
                            Some(found) => {
                                record = found;
                                from_ledger = true;
                            }
                            None => match pick_block_output(&mut block_outs, &inp.prevout) {
                                Ok(found) => {
                                    record = found;
                                    from_ledger = false;
                                }
                                Err(e) => {
                                    input_err = Some(e);
                                    break;
                                }
                            },
                        }

                        if !pool.take() {
                            scripts_ok = false;
                            break;
                        }
                        if tx_trusted {
                            pool.pass();
                        } else {
                            let script_pubkey = record.script_pubkey.clone();
                            pool.launch(scope, move || {
                                verifier.verify(
                                    &inp.script_sig,
                                    &script_pubkey,
                                    j,
                                    tx,
                                    legacy_rule_active,
                                )
                            });
                        }

                        tx_in_total = match tx_in_total.checked_add(record.value) {
                            Some(total) => total,
                            None => {
                                input_err = Some(CommitError::AmountOverflow);
                                break;
                            }
                        };
                        if from_ledger {
                            changes.deleted.insert(inp.prevout, record);
                        } else {
                            // Created earlier in this block: cancel the
                            // pending add instead of recording a ledger
                            // delete. The output never reaches the ledger.
                            changes.added.remove(&inp.prevout);
                        }
                    }

                    // Outstanding verifications are always drained, even on
                    // an input error, so no slot leaks across transactions.
                    if !pool.drain() {
                        scripts_ok = false;
                    }
                    if let Some(e) = input_err {
                        return Err(e);
                    }
                    if !scripts_ok {
                        return Err(CommitError::ScriptVerification);
                    }
                }

                block_in_total = tx_in_total
                    .checked_add(block_in_total)
                    .ok_or(CommitError::AmountOverflow)?;

                let spent_slots = block_outs.get(&tx.hash);
                for (j, out) in tx.outputs.iter().enumerate() {
                    tx_out_total = tx_out_total
                        .checked_add(out.value)
                        .ok_or(CommitError::AmountOverflow)?;
                    block_out_total = block_out_total
                        .checked_add(out.value)
                        .ok_or(CommitError::AmountOverflow)?;

                    // A slot already nulled here means a forward reference
                    // spent this output before we reached it; skip the add.
                    let spent_in_block = spent_slots
                        .map_or(false, |slots| slots.get(j).map_or(false, |s| s.is_none()));
                    let created = OutPoint {
                        hash: tx.hash,
                        index: j as u32,
                    };
                    if changes.deleted.remove(&created).is_none() && !spent_in_block {
                        changes.added.insert(
                            created,
                            UtxoRecord {
                                value: out.value,
                                script_pubkey: out.script_pubkey.clone(),
                                height,
                            },
                        );
                    }
                }

                if i > 0 && tx_out_total > tx_in_total {
                    return Err(CommitError::TransactionOverspend {
                        spent: tx_out_total,
                        received: tx_in_total,
                        txid: hex_hash(&tx.hash),
                    });
                }
            }

            if block_in_total < block_out_total {
                return Err(CommitError::BlockOverspend {
                    total_out: block_out_total,
                    total_in: block_in_total,
                });
            }
            Ok(())
        })?;

        Ok(changes)
    }
}
