use crate::db::Storage;
use crate::services::LedgerStore;

use super::{describe, parse_amount};

pub async fn execute<S: Storage>(ledger: &LedgerStore<S>, args: &[&str]) -> Result<String, String> {
    let Some(wallet_id) = args.first() else {
        return Ok("Usage: $balance <wallet id>".to_string());
    };

    let wallet = ledger.get_wallet(wallet_id).await.map_err(|e| describe(&e))?;
    Ok(format!("Wallet: {}\nBalance: {}", wallet.id, wallet.balance))
}

pub async fn deposit<S: Storage>(ledger: &LedgerStore<S>, args: &[&str]) -> Result<String, String> {
    if args.len() < 2 {
        return Ok("Usage: $deposit <wallet id> <amount>\nAmount must be positive".to_string());
    }

    let amount = parse_amount(args[1])?;
    let transaction = ledger
        .deposit(args[0], amount)
        .await
        .map_err(|e| describe(&e))?;

    Ok(format!(
        "Deposit successful\nWallet: {}\nAmount: {}\nReceipt: {}",
        transaction.recipient, transaction.amount, transaction.uuid
    ))
}
