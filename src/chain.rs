//! Block acceptance controller
//!
//! Decides whether a newly received block extends the active chain (commit
//! its transactions and advance the tip) or joins a side branch (store it
//! and, if it is now the tallest known branch, request a chain switch).

use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::constants::DEFAULT_VERIFY_WORKERS;
use crate::error::Result;
use crate::index::{BlockIndex, BlockTreeNode};
use crate::ledger::{BlockStore, UnspentLedger};
use crate::script::{ScriptVerifier, TrustedTxOracle};
use crate::types::{hex_hash, Block, Hash, Natural};

/// Chain-reorganization collaborator, invoked fire-and-forget when a side
/// branch outgrows the active tip. Its success or failure is not this
/// controller's concern.
pub trait Reorg: Send + Sync {
    fn switch_to(&self, hash: &Hash);
}

pub struct ChainConfig {
    /// Worker budget for parallel script verification.
    pub verify_workers: usize,
    /// Defer block-store flushing to the caller.
    pub do_not_sync: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            verify_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_VERIFY_WORKERS),
            do_not_sync: false,
        }
    }
}

pub struct Chain {
    pub(crate) config: ChainConfig,
    pub(crate) index: Mutex<BlockIndex>,
    pub(crate) tip: Hash,
    pub(crate) ledger: Arc<dyn UnspentLedger>,
    pub(crate) store: Arc<dyn BlockStore>,
    pub(crate) verifier: Arc<dyn ScriptVerifier>,
    pub(crate) oracle: Option<Arc<dyn TrustedTxOracle>>,
    pub(crate) reorg: Arc<dyn Reorg>,
}

impl Chain {
    pub fn new(
        genesis: Hash,
        genesis_header: [u8; crate::constants::HEADER_SIZE],
        ledger: Arc<dyn UnspentLedger>,
        store: Arc<dyn BlockStore>,
        verifier: Arc<dyn ScriptVerifier>,
        reorg: Arc<dyn Reorg>,
        config: ChainConfig,
    ) -> Self {
        Chain {
            config,
            index: Mutex::new(BlockIndex::with_genesis(genesis, genesis_header)),
            tip: genesis,
            ledger,
            store,
            verifier,
            oracle: None,
            reorg,
        }
    }

    /// Wire in a pre-verification oracle; transactions it reports as already
    /// verified skip script checks during commitment.
    pub fn with_trusted_oracle(mut self, oracle: Arc<dyn TrustedTxOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn tip(&self) -> Hash {
        self.tip
    }

    pub fn tip_height(&self) -> Natural {
        let index = self.index.lock().expect("block index lock poisoned");
        index
            .get(&self.tip)
            .expect("tip not in index")
            .height
    }

    /// Integrate a block whose parent is already indexed.
    ///
    /// If the block extends the current tip, its transactions are committed
    /// and, on success, the block is persisted as trusted, the ledger delta
    /// is applied, and the tip advances. On a consensus rejection the
    /// structural insert is rolled back and the index is left exactly as it
    /// was. A block extending a side branch is persisted without commitment;
    /// if its branch is now taller than the tip, a chain switch is requested.
    ///
    /// Presenting a block with an unknown parent is a caller bug and panics.
    pub fn accept_block(&mut self, block: &mut Block) -> Result<()> {
        let hash = block.hash();
        let parent_hash = block.parent_hash();

        let (parent_is_tip, height) = {
            let mut index = self.index.lock().expect("block index lock poisoned");
            let parent = index
                .get(&parent_hash)
                .unwrap_or_else(|| panic!("parent block not in index: {}", hex_hash(&parent_hash)));
            let height = parent.height + 1;
            index.link(BlockTreeNode {
                hash,
                parent: Some(parent_hash),
                children: Vec::new(),
                height,
                tx_count: block.transactions.len() as u32,
                header: block.header,
            });
            (parent_hash == self.tip, height)
        };

        if parent_is_tip {
            match self.commit_block_transactions(block, height) {
                Err(e) => {
                    warn!(
                        "block {} at height {} rejected: {}",
                        hex_hash(&hash),
                        height,
                        e
                    );
                    let mut index = self.index.lock().expect("block index lock poisoned");
                    index.unlink(&hash);
                    Err(e)
                }
                Ok(changes) => {
                    // Scripts are verified; never re-verify this block.
                    block.trusted = true;
                    self.store.append(height, block);
                    self.ledger.commit_block(&changes, &hash);
                    if !self.config.do_not_sync {
                        self.store.flush();
                    }
                    self.tip = hash;
                    Ok(())
                }
            }
        } else {
            // Side branch: persist without commitment, not yet trusted.
            self.store.append(height, block);
            if height > self.tip_height() {
                debug!(
                    "side branch {} at height {} taller than tip, requesting chain switch",
                    hex_hash(&hash),
                    height
                );
                self.reorg.switch_to(&hash);
            }
            Ok(())
        }
    }
}
