//! Script-verification collaborator contracts

use crate::types::{Hash, Transaction};

/// External script interpreter, treated as a pure function.
///
/// `legacy_rule_active` carries the time-activated evaluation rule flag
/// (the block timestamp compared against `BIP16_SWITCH_TIME`). Implementors
/// must be thread-safe: the verification pool calls this from workers.
pub trait ScriptVerifier: Send + Sync {
    fn verify(
        &self,
        script_sig: &[u8],
        script_pubkey: &[u8],
        input_index: usize,
        tx: &Transaction,
        legacy_rule_active: bool,
    ) -> bool;
}

/// Optional oracle reporting transactions whose scripts were already
/// verified elsewhere (e.g. on mempool admission). Pretrusted transactions
/// skip script verification but keep all ledger bookkeeping.
pub trait TrustedTxOracle: Send + Sync {
    fn is_pretrusted(&self, txid: &Hash) -> bool;
}
