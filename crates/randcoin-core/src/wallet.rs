use crate::constants::ADDRESS_LEN;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A wallet is nothing but an address: the ledger is unsigned, so there is no
/// key material to hold or protect. Addresses are the truncated hex SHA-256
/// of random bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    address: String,
}

impl Wallet {
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let mut address = hex::encode(Sha256::digest(seed));
        address.truncate(ADDRESS_LEN);
        Self { address }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}
