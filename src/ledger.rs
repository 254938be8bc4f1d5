//! Unspent-ledger and block-store collaborator contracts
//!
//! Both are treated as internally-synchronized external resources: the
//! commitment core reads the ledger once per input resolution and writes it
//! exactly once per successfully committed block.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{Block, BlockChanges, Hash, Natural, OutPoint, UtxoRecord};

/// Point lookup and atomic per-block mutation of the unspent-output set.
pub trait UnspentLedger {
    fn lookup(&self, prevout: &OutPoint) -> Option<UtxoRecord>;

    /// Apply a block's delta. All adds and removes become visible together
    /// as observed by subsequent lookups.
    fn commit_block(&self, changes: &BlockChanges, block_hash: &Hash);
}

/// Persistent block storage keyed by height.
pub trait BlockStore {
    fn append(&self, height: Natural, block: &Block);
    fn flush(&self);
}

/// HashMap-backed unspent ledger. A single lock makes each commit atomic
/// with respect to lookups.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    utxos: Mutex<HashMap<OutPoint, UtxoRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    /// Seed an output directly, bypassing block commitment.
    pub fn insert(&self, prevout: OutPoint, record: UtxoRecord) {
        self.utxos
            .lock()
            .expect("ledger lock poisoned")
            .insert(prevout, record);
    }

    pub fn len(&self) -> usize {
        self.utxos.lock().expect("ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnspentLedger for MemoryLedger {
    fn lookup(&self, prevout: &OutPoint) -> Option<UtxoRecord> {
        self.utxos
            .lock()
            .expect("ledger lock poisoned")
            .get(prevout)
            .cloned()
    }

    fn commit_block(&self, changes: &BlockChanges, _block_hash: &Hash) {
        let mut utxos = self.utxos.lock().expect("ledger lock poisoned");
        for prevout in changes.deleted.keys() {
            utxos.remove(prevout);
        }
        for (prevout, record) in &changes.added {
            utxos.insert(*prevout, record.clone());
        }
    }
}
