use crate::block::{meets_target, split_at_nonce, Block};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Nonces examined per parallel sweep. Cancellation is observed between
/// sweeps, so this also bounds cancellation latency.
const SWEEP: u64 = 1 << 18;

/// Cooperative cancellation flag for the proof-of-work search. Cloning is
/// cheap and shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Searches the nonce space in parallel sweeps until a hash carries
/// `difficulty` leading hex zeros, then seals the block with the winning
/// nonce and hash. Returns `false` without touching the block if the token
/// was cancelled first.
///
/// The final hash is produced by the same splice path the sequential miner
/// uses, which is byte-identical to [`Block::compute_hash`]; whichever
/// worker wins, verification recomputes the same string.
pub fn mine_block_parallel(block: &mut Block, difficulty: u32, cancel: &CancelToken) -> bool {
    // Cancellation wins even over a hash that already satisfies the target:
    // a cancelled search must never seal anything.
    if cancel.is_cancelled() {
        return false;
    }
    if meets_target(&block.hash, difficulty) {
        return true;
    }
    let template = block.canonical_string(0);
    let (prefix, suffix) = split_at_nonce(&template);

    let mut start = 0u64;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let end = start.saturating_add(SWEEP);
        let found = (start..end).into_par_iter().find_map_any(|nonce| {
            let preimage = format!("{prefix}{nonce}{suffix}");
            let hash = hex::encode(Sha256::digest(preimage.as_bytes()));
            meets_target(&hash, difficulty).then_some((nonce, hash))
        });
        if let Some((nonce, hash)) = found {
            info!(nonce, hash = %hash, "found nonce at difficulty {difficulty}");
            block.nonce = nonce;
            block.hash = hash;
            return true;
        }
        // Practically unreachable: a fresh timestamp would be needed long
        // before the u64 nonce space runs out.
        start = end;
    }
}
