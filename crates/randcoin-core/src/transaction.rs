use crate::constants::GENESIS_SENDER;
use crate::error::LedgerError;
use crate::unix_millis;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// An immutable value-transfer record. All fields are private and frozen at
/// construction; the id is the hex SHA-256 of the canonical serialization of
/// the other four fields and is computed exactly once.
#[derive(Clone, Debug)]
pub struct Transaction {
    sender: String,
    recipient: String,
    amount: Decimal,
    timestamp: u64,
    id: String,
}

/// Id preimage. Field order is alphabetical so the serialized form is stable
/// regardless of how the struct was assembled. The amount serializes as its
/// exact decimal string, never a binary float.
#[derive(Serialize)]
struct IdPreimage<'a> {
    amount: &'a Decimal,
    recipient: &'a str,
    sender: &'a str,
    timestamp: u64,
}

/// Owned, read-only view of a transaction, used for block hashing and
/// display. Field order is the canonical (alphabetical) serialization order.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TxSnapshot {
    pub amount: Decimal,
    pub id: String,
    pub recipient: String,
    pub sender: String,
    pub timestamp: u64,
}

impl Transaction {
    /// Builds a transaction stamped with the current time.
    ///
    /// Rejects an empty sender or recipient, and a non-positive amount unless
    /// the sender is the genesis identifier.
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        Self::new_at(sender, recipient, amount, unix_millis())
    }

    /// Builds a transaction with an explicit timestamp (milliseconds).
    pub fn new_at(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Decimal,
        timestamp: u64,
    ) -> Result<Self, LedgerError> {
        let sender = sender.into();
        let recipient = recipient.into();
        if sender.is_empty() {
            return Err(LedgerError::Validation("sender must not be empty".into()));
        }
        if recipient.is_empty() {
            return Err(LedgerError::Validation(
                "recipient must not be empty".into(),
            ));
        }
        if amount <= Decimal::ZERO && sender != GENESIS_SENDER {
            return Err(LedgerError::Validation(format!(
                "amount must be positive, got {amount}"
            )));
        }
        // Strip trailing zeros so scale variants of the same value ("10.5",
        // "10.50") serialize identically and share an id; otherwise a
        // rescaled copy would slip past replay protection.
        let amount = amount.normalize();
        let id = compute_id(&sender, &recipient, &amount, timestamp);
        Ok(Self {
            sender,
            recipient,
            amount,
            timestamp,
            id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Read-only structured view; mutating it does not touch the live
    /// transaction.
    pub fn snapshot(&self) -> TxSnapshot {
        TxSnapshot {
            amount: self.amount,
            id: self.id.clone(),
            recipient: self.recipient.clone(),
            sender: self.sender.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        // The id is a content hash over every other field.
        self.id == other.id
    }
}

impl Eq for Transaction {}

fn compute_id(sender: &str, recipient: &str, amount: &Decimal, timestamp: u64) -> String {
    let preimage = IdPreimage {
        amount,
        recipient,
        sender,
        timestamp,
    };
    let bytes = serde_json::to_vec(&preimage).expect("canonical serialization cannot fail");
    hex::encode(Sha256::digest(bytes))
}
