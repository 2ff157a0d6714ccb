use crate::transaction::{Transaction, TxSnapshot};
use crate::unix_millis;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// A sealed (or about-to-be-sealed) batch of transactions. Fields are
/// crate-private: outside the crate a block is read-only, and inside the
/// crate only the mining search mutates one, before it is appended.
#[derive(Clone, Debug)]
pub struct Block {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) previous_hash: String,
    pub(crate) timestamp: u64,
    pub(crate) nonce: u64,
    pub(crate) hash: String,
}

/// Hash preimage, alphabetical field order. This is the single canonical
/// serializer shared by [`Block::compute_hash`] and the mining fast path.
#[derive(Serialize)]
struct HashPreimage<'a> {
    nonce: u64,
    previous_hash: &'a str,
    timestamp: u64,
    transactions: &'a [TxSnapshot],
}

/// True when the leading `difficulty` characters of a hex hash are all `'0'`.
pub fn meets_target(hash: &str, difficulty: u32) -> bool {
    hash.bytes().take(difficulty as usize).all(|b| b == b'0')
}

impl Block {
    /// Builds a block over the given transactions, stamped with the current
    /// time. The hash is computed immediately at nonce 0.
    pub fn new(transactions: Vec<Transaction>, previous_hash: impl Into<String>) -> Self {
        Self::new_at(transactions, previous_hash, unix_millis())
    }

    /// Builds a block with an explicit timestamp (milliseconds).
    pub fn new_at(
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        let mut block = Self {
            transactions,
            previous_hash: previous_hash.into(),
            timestamp,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Canonical JSON of the block content with the given nonce substituted.
    pub(crate) fn canonical_string(&self, nonce: u64) -> String {
        let snapshots: Vec<TxSnapshot> = self.transactions.iter().map(Transaction::snapshot).collect();
        let preimage = HashPreimage {
            nonce,
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            transactions: &snapshots,
        };
        serde_json::to_string(&preimage).expect("canonical serialization cannot fail")
    }

    /// Recomputes the content hash from the current fields. Pure; used by
    /// chain verification to re-assert that the stored hash still matches.
    pub fn compute_hash(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_string(self.nonce)))
    }

    /// Increments the nonce and rehashes until the hash carries `difficulty`
    /// leading hex zeros. Unbounded in the worst case; difficulty 0 returns
    /// immediately.
    ///
    /// The canonical JSON is serialized once and the changing nonce spliced
    /// into a fixed prefix/suffix, so the loop never re-serializes the
    /// transaction list. Equivalence with [`Block::compute_hash`] is pinned
    /// by test against vectors derived from the full serializer.
    pub fn mine(&mut self, difficulty: u32) {
        if meets_target(&self.hash, difficulty) {
            return;
        }
        let template = self.canonical_string(0);
        let (prefix, suffix) = split_at_nonce(&template);
        loop {
            self.nonce += 1;
            let preimage = format!("{prefix}{}{suffix}", self.nonce);
            self.hash = hex::encode(Sha256::digest(preimage.as_bytes()));
            if meets_target(&self.hash, difficulty) {
                return;
            }
        }
    }
}

/// Splits canonical JSON around the digits of `"nonce":0` so successive
/// nonces can be spliced in without re-serializing.
pub(crate) fn split_at_nonce(template: &str) -> (&str, &str) {
    const MARKER: &str = "\"nonce\":0";
    let at = template
        .find(MARKER)
        .expect("canonical form always contains the nonce field");
    (
        &template[..at + MARKER.len() - 1],
        &template[at + MARKER.len()..],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_txs() -> Vec<Transaction> {
        vec![
            Transaction::new_at("Alice", "Bob", dec("10.5"), 1_600_000_000_000).unwrap(),
            Transaction::new_at("Bob", "Charlie", dec("5"), 1_600_000_100_000).unwrap(),
        ]
    }

    #[test]
    fn hash_matches_known_vector() {
        let block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        assert_eq!(block.nonce(), 0);
        assert_eq!(
            block.hash(),
            "d3dd809bb250239668b794967a15192a69ae6492ca686f7d5da2b21a4c5eef7a"
        );
        assert_eq!(block.hash(), block.compute_hash());
    }

    #[test]
    fn empty_block_hash_matches_known_vector() {
        let mut block = Block::new_at(vec![], "ab", 1_600_000_000_000);
        block.nonce = 7;
        assert_eq!(
            block.compute_hash(),
            "398b52b229c0bfbb96543587b73d0105f00f41945044f827aec7775e4476c92c"
        );
    }

    #[test]
    fn mine_difficulty_one_matches_full_serializer() {
        // Vector derived from hashing the complete canonical JSON at every
        // nonce; hitting it proves the splice fast path is byte-identical.
        let mut block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        block.mine(1);
        assert_eq!(block.nonce(), 19);
        assert_eq!(
            block.hash(),
            "08b7dc1e31849a645afba5f29ec04702b7bcc5409068492bca06d1034fa9064a"
        );
        assert_eq!(block.hash(), block.compute_hash());
    }

    #[test]
    fn mine_difficulty_two_matches_full_serializer() {
        let mut block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        block.mine(2);
        assert_eq!(block.nonce(), 334);
        assert_eq!(
            block.hash(),
            "005543c5b4d82c1b4cea56216b6b88b4d99c96e70e153491344c9fd4f4903ecf"
        );
        assert_eq!(block.hash(), block.compute_hash());
    }

    #[test]
    fn splice_equals_full_serialization_across_nonces() {
        let block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        let template = block.canonical_string(0);
        let (prefix, suffix) = split_at_nonce(&template);
        for nonce in [0u64, 1, 9, 10, 42, 999, 1_000_000, u64::MAX] {
            let spliced = format!("{prefix}{nonce}{suffix}");
            assert_eq!(spliced, block.canonical_string(nonce));
        }
    }

    #[test]
    fn mine_difficulty_zero_is_a_no_op() {
        let mut block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        let before = block.hash().to_owned();
        block.mine(0);
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.hash(), before);
    }

    #[test]
    fn mined_hash_meets_target() {
        let mut block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        block.mine(2);
        assert!(meets_target(block.hash(), 2));
        assert!(block.hash().starts_with("00"));
    }

    #[test]
    fn hash_changes_with_nonce() {
        let mut block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        let h0 = block.compute_hash();
        block.nonce += 1;
        assert_ne!(h0, block.compute_hash());
    }

    #[test]
    fn hash_depends_on_transaction_order() {
        let mut txs = sample_txs();
        let forward = Block::new_at(txs.clone(), "0", 1_600_000_200_000);
        txs.reverse();
        let reversed = Block::new_at(txs, "0", 1_600_000_200_000);
        assert_ne!(forward.hash(), reversed.hash());
    }

    #[test]
    fn hashes_are_full_sha256_hex() {
        let block = Block::new_at(sample_txs(), "0", 1_600_000_200_000);
        assert_eq!(block.hash().len(), crate::constants::HASH_HEX_SIZE);
        for tx in block.transactions() {
            assert_eq!(tx.id().len(), crate::constants::HASH_HEX_SIZE);
        }
    }

    #[test]
    fn meets_target_examples() {
        assert!(meets_target("00ab", 0));
        assert!(meets_target("00ab", 2));
        assert!(!meets_target("00ab", 3));
        assert!(!meets_target("a0ab", 1));
    }
}
