/// Display ticker for amounts.
pub const CURRENCY: &str = "ZAR";
/// Default leading hex zero digits required of a block hash.
pub const MINING_DIFFICULTY: u32 = 4;
/// Default reward paid to the miner of each sealed block.
pub const MINING_REWARD: u64 = 10;

/// Sentinel previous-hash of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Sender of the zero-value genesis transaction; exempt from the
/// positive-amount rule.
pub const GENESIS_SENDER: &str = "genesis";
/// Recipient of the genesis transaction.
pub const GENESIS_RECIPIENT: &str = "system";
/// Issuer of mining rewards; exempt from the spendable-balance check.
pub const SYSTEM_SENDER: &str = "System";

pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Wallet addresses are the first 16 hex digits of a random SHA-256.
pub const ADDRESS_LEN: usize = 16;
