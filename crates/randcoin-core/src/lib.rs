//! RandCoin core: an append-only, hash-linked ledger of value transfers,
//! sealed by a proof-of-work search and backed by an in-memory balance view.
//!
//! The crate is single-node by design: no networking, no persistence, no
//! signatures. Sender identifiers are opaque, unauthenticated strings; the
//! boundary layer (CLI) decides how they are produced and presented.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;
pub mod transaction;
pub mod wallet;

pub use block::Block;
pub use chain::{BlockSummary, Blockchain};
pub use error::LedgerError;
pub use mine::CancelToken;
pub use transaction::{Transaction, TxSnapshot};
pub use wallet::Wallet;

/// Milliseconds since the Unix epoch; the timestamp resolution used by
/// transactions and blocks.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as u64
}
