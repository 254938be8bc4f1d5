//! Error types for block commitment
//!
//! Every variant is a consensus rejection: the offending block is rolled back
//! and the node keeps running. Internal-consistency violations (verifier-pool
//! token imbalance, unknown parent on accept) panic instead, since accounting
//! that cannot be trusted must not continue.

use thiserror::Error;

use crate::types::OutPoint;

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("coinbase script has a wrong length: {0}")]
    CoinbaseScriptLength(usize),

    #[error("input {0} spent more than once in the same block")]
    DoubleSpend(OutPoint),

    #[error("unknown input: {0}")]
    UnknownInput(OutPoint),

    #[error("output index out of range: {0}")]
    OutputIndexOutOfRange(OutPoint),

    #[error("output already spent: {0}")]
    OutputAlreadySpent(OutPoint),

    #[error("script verification failed")]
    ScriptVerification,

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error(
        "more spent ({:.8}) than received ({:.8}) in tx {txid}",
        *spent as f64 / 1e8,
        *received as f64 / 1e8
    )]
    TransactionOverspend {
        spent: u64,
        received: u64,
        txid: String,
    },

    #[error("block out:{total_out} > in:{total_in}")]
    BlockOverspend { total_out: u64, total_in: u64 },

    #[error("value sum overflow")]
    AmountOverflow,
}

pub type Result<T> = std::result::Result<T, CommitError>;
