use anyhow::Result;
use clap::Parser;
use randcoin_core::constants::{CURRENCY, MINING_DIFFICULTY, MINING_REWARD};
use randcoin_core::{Blockchain, LedgerError, Transaction, Wallet};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "randcoin")]
#[command(about = "Interactive single-node RandCoin ledger")]
struct Cli {
    /// Leading hex zeros required of a block hash
    #[arg(long, default_value_t = MINING_DIFFICULTY)]
    difficulty: u32,

    /// Reward paid to the miner of each block
    #[arg(long, default_value_t = MINING_REWARD)]
    reward: u64,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut ledger = Blockchain::new(cli.difficulty, Decimal::from(cli.reward));
    let mut wallet = Wallet::new();
    println!("RandCoin ledger (difficulty {}, reward {} {CURRENCY})", cli.difficulty, cli.reward);
    println!("your wallet address: {}", wallet.address());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!();
        println!("1) send   2) mine   3) balance   4) chain   5) validate   6) new wallet   7) export json   q) quit");
        let Some(choice) = prompt(&mut lines, "> ")? else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = send(&mut lines, &mut ledger, &wallet) {
                    println!("rejected: {e}");
                }
            }
            "2" => match ledger.mine_pending_transactions(wallet.address()) {
                Ok(summary) => println!(
                    "sealed block {} ({} txs) {}",
                    summary.index, summary.transaction_count, summary.hash
                ),
                Err(e) => println!("mining failed: {e}"),
            },
            "3" => {
                let Some(address) = prompt(&mut lines, "address (blank = yours): ")? else {
                    break;
                };
                let address = if address.is_empty() { wallet.address() } else { &address };
                println!(
                    "confirmed: {} {CURRENCY}, spendable: {} {CURRENCY}",
                    ledger.get_balance(address),
                    ledger.get_spendable_balance(address)
                );
            }
            "4" => show_chain(&ledger),
            "5" => {
                if ledger.is_chain_valid() {
                    println!("chain OK ({} blocks)", ledger.height());
                } else {
                    // A reportable finding, not a crash.
                    warn!("chain integrity check failed");
                    println!("chain INVALID");
                }
            }
            "6" => {
                wallet = Wallet::new();
                println!("new wallet address: {}", wallet.address());
            }
            "7" => export_json(&ledger)?,
            "q" | "Q" => break,
            other => println!("unknown choice: {other}"),
        }
    }
    Ok(())
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    label: &str,
) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_owned())),
        None => Ok(None),
    }
}

fn send(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    ledger: &mut Blockchain,
    wallet: &Wallet,
) -> Result<()> {
    let Some(recipient) = prompt(lines, "recipient: ")? else {
        return Ok(());
    };
    let Some(raw) = prompt(lines, &format!("amount ({CURRENCY}): "))? else {
        return Ok(());
    };
    let amount = raw
        .parse::<Decimal>()
        .map_err(|_| LedgerError::Validation(format!("not a decimal amount: {raw}")))?;
    let tx = Transaction::new(wallet.address(), recipient, amount)?;
    ledger.add_transaction(tx)?;
    println!("queued ({} pending)", ledger.pending_count());
    Ok(())
}

fn show_chain(ledger: &Blockchain) {
    for (index, block) in ledger.blocks().enumerate() {
        println!(
            "#{index}  hash {}  prev {}  nonce {}  txs {}",
            block.hash(),
            block.previous_hash(),
            block.nonce(),
            block.transactions().len()
        );
        for tx in block.transactions() {
            println!(
                "      {} -> {}: {} {CURRENCY}",
                tx.sender(),
                tx.recipient(),
                tx.amount()
            );
        }
    }
}

fn export_json(ledger: &Blockchain) -> Result<()> {
    let blocks: Vec<_> = ledger
        .blocks()
        .map(|block| {
            serde_json::json!({
                "hash": block.hash(),
                "previous_hash": block.previous_hash(),
                "nonce": block.nonce(),
                "timestamp": block.timestamp(),
                "transactions": block
                    .transactions()
                    .iter()
                    .map(|tx| tx.snapshot())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
