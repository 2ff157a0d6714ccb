//! End-to-end scenarios driven purely through the public ledger API.

use randcoin_core::{
    block::meets_target, constants::SYSTEM_SENDER, Blockchain, CancelToken, LedgerError,
    Transaction, Wallet,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn fresh_ledger_pays_first_miner() {
    let mut ledger = Blockchain::new(1, dec("10"));
    assert_eq!(ledger.get_balance("Miner1"), Decimal::ZERO);

    let summary = ledger.mine_pending_transactions("Miner1").unwrap();

    assert_eq!(ledger.height(), 2);
    assert_eq!(summary.index, 1);
    assert_eq!(ledger.get_balance("Miner1"), dec("10"));
    assert!(ledger.is_chain_valid());
}

#[test]
fn earn_then_spend() {
    let mut ledger = Blockchain::new(1, dec("10"));

    let premature = Transaction::new("Alice", "Bob", dec("10")).unwrap();
    assert!(matches!(
        ledger.add_transaction(premature),
        Err(LedgerError::InsufficientFunds { .. })
    ));

    ledger.mine_pending_transactions("Alice").unwrap();
    ledger
        .add_transaction(Transaction::new("Alice", "Bob", dec("5")).unwrap())
        .unwrap();
    assert_eq!(ledger.get_spendable_balance("Alice"), dec("5"));

    ledger.mine_pending_transactions("Miner1").unwrap();
    assert_eq!(ledger.get_balance("Alice"), dec("5"));
    assert_eq!(ledger.get_balance("Bob"), dec("5"));
    assert_eq!(ledger.get_balance("Miner1"), dec("10"));
}

#[test]
fn a_transaction_is_admitted_once() {
    let mut ledger = Blockchain::new(1, dec("10"));
    let tx = Transaction::new(SYSTEM_SENDER, "Alice", dec("10")).unwrap();
    ledger.add_transaction(tx.clone()).unwrap();
    assert!(matches!(
        ledger.add_transaction(tx),
        Err(LedgerError::DuplicateTransaction(_))
    ));
}

#[test]
fn every_sealed_block_meets_the_difficulty_target() {
    let difficulty = 2;
    let mut ledger = Blockchain::new(difficulty, dec("10"));
    for _ in 0..3 {
        ledger.mine_pending_transactions("Miner1").unwrap();
    }
    for block in ledger.blocks().skip(1) {
        assert!(meets_target(block.hash(), difficulty));
    }
    assert!(ledger.is_chain_valid());
}

#[test]
fn wallets_transact_end_to_end() {
    let mut ledger = Blockchain::new(1, dec("12.5"));
    let miner = Wallet::new();
    let shop = Wallet::new();

    ledger.mine_pending_transactions(miner.address()).unwrap();
    assert_eq!(ledger.get_balance(miner.address()), dec("12.5"));

    ledger
        .add_transaction(Transaction::new(miner.address(), shop.address(), dec("2.5")).unwrap())
        .unwrap();
    ledger.mine_pending_transactions(miner.address()).unwrap();

    assert_eq!(ledger.get_balance(shop.address()), dec("2.5"));
    // Spent 2.5, earned a second reward.
    assert_eq!(ledger.get_balance(miner.address()), dec("22.5"));
    assert!(ledger.is_chain_valid());
}

#[test]
fn mining_can_be_cancelled_from_another_thread() {
    // Twelve leading hex zeros will not be found in 50ms on any hardware.
    let mut ledger = Blockchain::new(12, dec("10"));
    let token = CancelToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };

    let outcome = ledger.mine_pending_transactions_with("Miner1", &token);
    canceller.join().unwrap();

    assert_eq!(outcome.unwrap_err(), LedgerError::MiningCancelled);
    assert_eq!(ledger.height(), 1);
    assert_eq!(ledger.get_balance("Miner1"), Decimal::ZERO);
}
