use crate::block::Block;
use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_RECIPIENT, GENESIS_SENDER, SYSTEM_SENDER};
use crate::error::LedgerError;
use crate::mine::{mine_block_parallel, CancelToken};
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// The ledger: an ordered chain of sealed blocks (genesis always present), a
/// pending-transaction pool, and a balance cache derived from the chain.
///
/// All mutating operations take `&mut self`, so admission and mining are
/// mutually exclusive on a shared ledger by construction; callers wanting
/// cross-thread sharing wrap the ledger in a `Mutex`. The only parallelism
/// inside an operation is the nonce search, which mutates nothing until a
/// winner is committed in a single serialized step.
pub struct Blockchain {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: u32,
    reward: Decimal,
    /// Authoritative balances, updated transactionally when a block is
    /// sealed. Never recomputed from history.
    balances: HashMap<String, Decimal>,
    /// Ids of every transaction in every sealed block; replay protection
    /// together with a scan of the (small) pending pool.
    seen_ids: HashSet<String>,
}

/// What a successful mining call reports back to the boundary layer.
#[derive(Clone, Debug, Serialize)]
pub struct BlockSummary {
    pub index: usize,
    pub hash: String,
    pub transaction_count: usize,
    pub timestamp: u64,
}

impl Blockchain {
    /// Creates a ledger whose chain holds the genesis block: a zero-value
    /// transaction from the genesis identifier, sealed under the sentinel
    /// previous hash. Genesis is applied to the balance cache like any other
    /// block; no identifier is special-cased there.
    pub fn new(difficulty: u32, reward: Decimal) -> Self {
        let genesis_tx = Transaction::new(GENESIS_SENDER, GENESIS_RECIPIENT, Decimal::ZERO)
            .expect("genesis transaction is always well-formed");
        let genesis = Block::new(vec![genesis_tx], GENESIS_PREVIOUS_HASH);
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            difficulty,
            reward,
            balances: HashMap::new(),
            seen_ids: HashSet::new(),
        };
        ledger.commit_block(genesis);
        ledger
    }

    /// Validates and admits a transaction into the pending pool. Either fully
    /// admits or fully rejects; balances move only when a block is sealed.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), LedgerError> {
        if self.seen_ids.contains(tx.id()) || self.pending.iter().any(|p| p.id() == tx.id()) {
            return Err(LedgerError::DuplicateTransaction(tx.id().to_owned()));
        }
        if tx.amount() <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(tx.amount()));
        }
        if tx.sender() != GENESIS_SENDER && tx.sender() != SYSTEM_SENDER {
            let spendable = self.get_spendable_balance(tx.sender());
            if spendable < tx.amount() {
                return Err(LedgerError::InsufficientFunds {
                    spendable,
                    required: tx.amount(),
                });
            }
        }
        debug!(id = %tx.id(), sender = %tx.sender(), "admitted to pending pool");
        self.pending.push(tx);
        Ok(())
    }

    /// Seals the pending pool plus a miner reward into a new block on top of
    /// the current tip, then commits: append, apply balances, clear the pool.
    pub fn mine_pending_transactions(
        &mut self,
        miner_address: &str,
    ) -> Result<BlockSummary, LedgerError> {
        self.mine_pending_transactions_with(miner_address, &CancelToken::new())
    }

    /// As [`Self::mine_pending_transactions`], but the nonce search observes
    /// the token. On cancellation the ledger is completely unchanged: the
    /// reward transaction only ever existed in the discarded candidate block.
    pub fn mine_pending_transactions_with(
        &mut self,
        miner_address: &str,
        cancel: &CancelToken,
    ) -> Result<BlockSummary, LedgerError> {
        let reward_tx = Transaction::new(SYSTEM_SENDER, miner_address, self.reward)?;
        let mut txs = self.pending.clone();
        txs.push(reward_tx);

        let tip_hash = self.tip().hash().to_owned();
        let mut block = Block::new(txs, tip_hash);
        if !mine_block_parallel(&mut block, self.difficulty, cancel) {
            return Err(LedgerError::MiningCancelled);
        }

        let summary = BlockSummary {
            index: self.chain.len(),
            hash: block.hash().to_owned(),
            transaction_count: block.transactions().len(),
            timestamp: block.timestamp(),
        };
        self.pending.clear();
        self.commit_block(block);
        info!(index = summary.index, hash = %summary.hash, "block appended");
        Ok(summary)
    }

    /// Confirmed balance; zero for an address the chain has never seen.
    pub fn get_balance(&self, address: &str) -> Decimal {
        self.balances.get(address).copied().unwrap_or(Decimal::ZERO)
    }

    /// Confirmed balance minus the address's pending outgoing amounts; the
    /// admission check uses this to prevent double-spends within the pool.
    pub fn get_spendable_balance(&self, address: &str) -> Decimal {
        let pending_outgoing: Decimal = self
            .pending
            .iter()
            .filter(|tx| tx.sender() == address)
            .map(Transaction::amount)
            .sum();
        self.get_balance(address) - pending_outgoing
    }

    /// Walks the chain from index 1, re-asserting each block's stored hash
    /// against recomputation and its linkage to the predecessor. A failure is
    /// a finding, not a panic.
    pub fn is_chain_valid(&self) -> bool {
        for pair in self.chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.hash() != current.compute_hash() {
                return false;
            }
            if current.previous_hash() != previous.hash() {
                return false;
            }
        }
        true
    }

    /// Ordered, read-only view of the sealed chain.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.chain.iter()
    }

    pub fn height(&self) -> usize {
        self.chain.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn reward(&self) -> Decimal {
        self.reward
    }

    fn tip(&self) -> &Block {
        self.chain.last().expect("chain is never empty")
    }

    /// The single place a block enters the chain: records ids for replay
    /// protection and applies every transaction to the balance cache, credit
    /// to recipient and debit from sender, privileged identities included.
    fn commit_block(&mut self, block: Block) {
        for tx in block.transactions() {
            self.seen_ids.insert(tx.id().to_owned());
            let amount = tx.amount();
            *self
                .balances
                .entry(tx.recipient().to_owned())
                .or_insert(Decimal::ZERO) += amount;
            *self
                .balances
                .entry(tx.sender().to_owned())
                .or_insert(Decimal::ZERO) -= amount;
        }
        self.chain.push(block);
    }
}
