//! # chain-commit
//!
//! Block-acceptance and transaction-commitment core for a full node: the
//! component that decides whether a received block joins the locally tracked
//! chain, mutates the unspent-output ledger accordingly, and enforces the
//! monetary and scripting rules along the way.
//!
//! ## Architecture
//!
//! - [`Chain`] — acceptance controller over an in-memory block tree
//!   ([`BlockIndex`]); commits tip-extending blocks, stores side branches,
//!   and requests chain switches when a branch outgrows the tip.
//! - `Chain::commit_block_transactions` — the per-block commitment
//!   algorithm producing a [`BlockChanges`] ledger delta.
//! - [`BoundedVerifierPool`] — bounded-concurrency script verification with
//!   strict token accounting.
//! - [`check_transactions_batch`] — standalone concurrent sanity/finality
//!   checks for mempool-style admission.
//!
//! Storage, the script interpreter, and reorganization are external
//! collaborators consumed through the [`UnspentLedger`], [`BlockStore`],
//! [`ScriptVerifier`], [`TrustedTxOracle`], and [`Reorg`] traits.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use chain_commit::*;
//!
//! struct NullStore;
//! impl BlockStore for NullStore {
//!     fn append(&self, _height: Natural, _block: &Block) {}
//!     fn flush(&self) {}
//! }
//!
//! struct AcceptAll;
//! impl ScriptVerifier for AcceptAll {
//!     fn verify(&self, _sig: &[u8], _pk: &[u8], _idx: usize,
//!               _tx: &Transaction, _legacy: bool) -> bool {
//!         true
//!     }
//! }
//!
//! struct NoReorg;
//! impl Reorg for NoReorg {
//!     fn switch_to(&self, _hash: &Hash) {}
//! }
//!
//! let genesis = Block::new(Block::header_bytes(1, &[0; 32], &[0; 32], 0, 0, 0), vec![]);
//! let mut chain = Chain::new(
//!     genesis.hash(),
//!     genesis.header,
//!     Arc::new(MemoryLedger::new()),
//!     Arc::new(NullStore),
//!     Arc::new(AcceptAll),
//!     Arc::new(NoReorg),
//!     ChainConfig::default(),
//! );
//!
//! let coinbase = Transaction::new(
//!     1,
//!     vec![TxInput { prevout: OutPoint::null(), script_sig: vec![0; 10], sequence: 0xffffffff }],
//!     vec![TxOutput { value: get_block_subsidy(1), script_pubkey: vec![0x51] }],
//!     0,
//! );
//! let mut block = Block::new(
//!     Block::header_bytes(1, &genesis.hash(), &[0; 32], 1, 0, 0),
//!     vec![coinbase],
//! );
//! chain.accept_block(&mut block).unwrap();
//! assert_eq!(chain.tip_height(), 1);
//! ```

pub mod chain;
pub mod commit;
pub mod constants;
pub mod economic;
pub mod error;
pub mod index;
pub mod ledger;
pub mod script;
pub mod transaction;
pub mod types;
pub mod verify_pool;

// Re-export commonly used items
pub use chain::{Chain, ChainConfig, Reorg};
pub use constants::*;
pub use economic::get_block_subsidy;
pub use error::{CommitError, Result};
pub use index::{BlockIndex, BlockTreeNode};
pub use ledger::{BlockStore, MemoryLedger, UnspentLedger};
pub use script::{ScriptVerifier, TrustedTxOracle};
pub use transaction::{check_transaction, check_transactions_batch};
pub use types::*;
pub use verify_pool::BoundedVerifierPool;
