//! Consensus constants for block commitment

/// Maximum money supply: 21,000,000 coins in atomic units
pub const MAX_MONEY: u64 = 21_000_000 * 100_000_000;

/// Atomic units per coin
pub const UNITS_PER_COIN: u64 = 100_000_000;

/// Halving interval: 210,000 blocks
pub const HALVING_INTERVAL: u64 = 210_000;

/// Initial block subsidy: 50 coins
pub const INITIAL_SUBSIDY: u64 = 50 * 100_000_000;

/// Minimum coinbase unlocking-script length in bytes (inclusive)
pub const COINBASE_SCRIPT_MIN: usize = 2;

/// Maximum coinbase unlocking-script length in bytes (inclusive)
pub const COINBASE_SCRIPT_MAX: usize = 100;

/// Lock time threshold: lock times below this are block heights, above are timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Sequence number marking an input as final
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Timestamp at which the legacy pay-to-script-hash evaluation rule activates
pub const BIP16_SWITCH_TIME: u32 = 1_333_238_400;

/// Raw block header size in bytes
pub const HEADER_SIZE: usize = 80;

/// Fallback script-verification worker count when parallelism cannot be probed
pub const DEFAULT_VERIFY_WORKERS: usize = 4;
