use rust_decimal::Decimal;
use thiserror::Error;

/// Every way a ledger operation can be refused. All variants are recoverable;
/// the caller decides presentation. A failed chain-integrity walk is reported
/// as a boolean by [`crate::Blockchain::is_chain_valid`], not as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed transaction fields: non-positive amount, empty party.
    #[error("invalid transaction: {0}")]
    Validation(String),

    /// A transaction with this id already exists in the pending pool or in a
    /// sealed block.
    #[error("transaction {0} already exists")]
    DuplicateTransaction(String),

    /// Admission requires a strictly positive amount.
    #[error("transaction amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Spendable balance (confirmed minus pending outgoing) below the
    /// requested amount.
    #[error("insufficient funds: spendable {spendable}, required {required}")]
    InsufficientFunds {
        spendable: Decimal,
        required: Decimal,
    },

    /// The proof-of-work search was cancelled before a winning nonce was
    /// found; the ledger was left unchanged.
    #[error("mining cancelled before a valid nonce was found")]
    MiningCancelled,
}
