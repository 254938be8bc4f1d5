#![allow(dead_code)]

//! Shared mock collaborators and builders for the integration suites.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chain_commit::*;

/// Script-sig marker the test verifier rejects.
pub const BAD_SCRIPT: &[u8] = &[0xde, 0xad];

/// Verifier that fails exactly the inputs carrying `BAD_SCRIPT`.
pub struct MarkerVerifier;

impl ScriptVerifier for MarkerVerifier {
    fn verify(
        &self,
        script_sig: &[u8],
        _script_pubkey: &[u8],
        _input_index: usize,
        _tx: &Transaction,
        _legacy_rule_active: bool,
    ) -> bool {
        script_sig != BAD_SCRIPT
    }
}

/// Block store recording every append and flush.
#[derive(Default)]
pub struct RecordingStore {
    pub appended: Mutex<Vec<(Natural, Hash, bool)>>,
    pub flushes: Mutex<usize>,
}

impl BlockStore for RecordingStore {
    fn append(&self, height: Natural, block: &Block) {
        self.appended
            .lock()
            .unwrap()
            .push((height, block.hash(), block.trusted));
    }

    fn flush(&self) {
        *self.flushes.lock().unwrap() += 1;
    }
}

/// Reorg sink recording every switch request.
#[derive(Default)]
pub struct CountingReorg {
    pub switches: Mutex<Vec<Hash>>,
}

impl Reorg for CountingReorg {
    fn switch_to(&self, hash: &Hash) {
        self.switches.lock().unwrap().push(*hash);
    }
}

/// Oracle trusting a fixed set of transaction hashes.
#[derive(Default)]
pub struct SetOracle {
    pub trusted: HashSet<Hash>,
}

impl TrustedTxOracle for SetOracle {
    fn is_pretrusted(&self, txid: &Hash) -> bool {
        self.trusted.contains(txid)
    }
}

pub struct TestHarness {
    pub chain: Chain,
    pub ledger: Arc<MemoryLedger>,
    pub store: Arc<RecordingStore>,
    pub reorg: Arc<CountingReorg>,
    pub genesis: Hash,
}

pub fn harness() -> TestHarness {
    let genesis_block = Block::new(Block::header_bytes(1, &[0; 32], &[0; 32], 0, 0, 0), vec![]);
    let genesis = genesis_block.hash();
    let ledger = Arc::new(MemoryLedger::new());
    let store = Arc::new(RecordingStore::default());
    let reorg = Arc::new(CountingReorg::default());
    let chain = Chain::new(
        genesis,
        genesis_block.header,
        ledger.clone(),
        store.clone(),
        Arc::new(MarkerVerifier),
        reorg.clone(),
        ChainConfig {
            verify_workers: 2,
            do_not_sync: false,
        },
    );
    TestHarness {
        chain,
        ledger,
        store,
        reorg,
        genesis,
    }
}

/// Coinbase paying `values`; `tag` varies the txid.
pub fn coinbase(values: &[Natural], tag: u8) -> Transaction {
    Transaction::new(
        1,
        vec![TxInput {
            prevout: OutPoint::null(),
            script_sig: vec![tag, 0x51],
            sequence: SEQUENCE_FINAL,
        }],
        values
            .iter()
            .map(|&value| TxOutput {
                value,
                script_pubkey: vec![0x51],
            })
            .collect(),
        0,
    )
}

/// Transaction spending `prevouts` into outputs of `values`, every input
/// carrying `script_sig`.
pub fn spend(prevouts: &[OutPoint], values: &[Natural], script_sig: &[u8]) -> Transaction {
    Transaction::new(
        1,
        prevouts
            .iter()
            .map(|&prevout| TxInput {
                prevout,
                script_sig: script_sig.to_vec(),
                sequence: SEQUENCE_FINAL,
            })
            .collect(),
        values
            .iter()
            .map(|&value| TxOutput {
                value,
                script_pubkey: vec![0x52],
            })
            .collect(),
        0,
    )
}

pub fn build_block(parent: &Hash, timestamp: u32, transactions: Vec<Transaction>) -> Block {
    Block::new(
        Block::header_bytes(1, parent, &[0; 32], timestamp, 0x1d00ffff, 0),
        transactions,
    )
}

/// Seed an unspent output and return its reference.
pub fn seed_utxo(ledger: &MemoryLedger, tag: u8, value: Natural) -> OutPoint {
    let prevout = OutPoint {
        hash: [tag; 32],
        index: 0,
    };
    ledger.insert(
        prevout,
        UtxoRecord {
            value,
            script_pubkey: vec![0x51],
            height: 0,
        },
    );
    prevout
}
