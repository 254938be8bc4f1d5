//! Core types for block commitment

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

use crate::constants::HEADER_SIZE;

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Reference to a spendable output: (transaction hash, output index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// The null reference used by coinbase inputs; resolvable against no ledger.
    pub fn null() -> Self {
        OutPoint {
            hash: [0u8; 32],
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash == [0u8; 32] && self.index == u32::MAX
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.hash {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ":{}", self.index)
    }
}

/// Transaction input: prior-output reference plus unlocking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Transaction output: value in atomic units plus locking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Natural,
    pub script_pubkey: ByteString,
}

/// Transaction: ordered inputs and outputs plus the identifying hash,
/// computed once at construction as on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(version: u32, inputs: Vec<TxInput>, outputs: Vec<TxOutput>, lock_time: u32) -> Self {
        let mut tx = Transaction {
            hash: [0u8; 32],
            version,
            inputs,
            outputs,
            lock_time,
        };
        tx.hash = tx.compute_hash();
        tx
    }

    /// Double SHA-256 over the canonical byte serialization.
    pub fn compute_hash(&self) -> Hash {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            bytes.extend_from_slice(&input.prevout.hash);
            bytes.extend_from_slice(&input.prevout.index.to_le_bytes());
            bytes.extend_from_slice(&(input.script_sig.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&input.script_sig);
            bytes.extend_from_slice(&input.sequence.to_le_bytes());
        }
        bytes.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            bytes.extend_from_slice(&output.value.to_le_bytes());
            bytes.extend_from_slice(&(output.script_pubkey.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&output.script_pubkey);
        }
        bytes.extend_from_slice(&self.lock_time.to_le_bytes());
        double_sha256(&bytes)
    }

    /// Coinbase: exactly one input whose reference is the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }
}

/// Block: raw 80-byte header plus ordered transactions.
///
/// `trusted` is set by the acceptance controller after a successful commit so
/// the same block's scripts are never re-verified. `last_known_height` is the
/// peer-declared chain height hint carried through to the ledger commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(with = "header_bytes_serde")]
    pub header: [u8; HEADER_SIZE],
    pub transactions: Vec<Transaction>,
    pub last_known_height: Natural,
    pub trusted: bool,
}

impl Block {
    pub fn new(header: [u8; HEADER_SIZE], transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
            last_known_height: 0,
            trusted: false,
        }
    }

    /// Assemble raw header bytes from the standard field layout.
    pub fn header_bytes(
        version: u32,
        parent: &Hash,
        merkle_root: &Hash,
        timestamp: u32,
        bits: u32,
        nonce: u32,
    ) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&version.to_le_bytes());
        header[4..36].copy_from_slice(parent);
        header[36..68].copy_from_slice(merkle_root);
        header[68..72].copy_from_slice(&timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&bits.to_le_bytes());
        header[76..80].copy_from_slice(&nonce.to_le_bytes());
        header
    }

    /// Block identity: double SHA-256 of the raw header.
    pub fn hash(&self) -> Hash {
        double_sha256(&self.header)
    }

    /// Declared parent hash from the header.
    pub fn parent_hash(&self) -> Hash {
        let mut parent = [0u8; 32];
        parent.copy_from_slice(&self.header[4..36]);
        parent
    }

    /// Header timestamp, used for time-activated rule flags.
    pub fn timestamp(&self) -> u32 {
        u32::from_le_bytes([
            self.header[68],
            self.header[69],
            self.header[70],
            self.header[71],
        ])
    }
}

// Header arrays exceed the sizes serde derives for, so they travel as a
// length-checked byte sequence.
mod header_bytes_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::constants::HEADER_SIZE;

    pub fn serialize<S: Serializer>(
        header: &[u8; HEADER_SIZE],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        header.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; HEADER_SIZE], D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            serde::de::Error::custom(format!(
                "header must be {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            ))
        })
    }
}

/// Unspent output record: value, locking script, and owning block height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub value: Natural,
    pub script_pubkey: ByteString,
    pub height: Natural,
}

/// Ledger delta produced by committing one block's transactions.
///
/// `added` holds outputs created by the block and still unspent at its end;
/// `deleted` holds previously-existing outputs the block spends. The maps are
/// disjoint: an output created and spent within the same block reaches neither.
#[derive(Debug, Clone, Default)]
pub struct BlockChanges {
    pub height: Natural,
    pub last_known_height: Natural,
    pub added: HashMap<OutPoint, UtxoRecord>,
    pub deleted: HashMap<OutPoint, UtxoRecord>,
}

impl BlockChanges {
    pub fn new(height: Natural) -> Self {
        BlockChanges {
            height,
            ..Default::default()
        }
    }
}

/// Double SHA-256
pub fn double_sha256(bytes: &[u8]) -> Hash {
    let first = Sha256::digest(bytes);
    let second = Sha256::digest(first);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&second);
    hash
}

/// Hex rendering for hashes in log output
pub fn hex_hash(hash: &Hash) -> String {
    let mut s = String::with_capacity(64);
    for b in hash {
        s.push_str(&format!("{:02x}", b));
    }
    s
}
