use crate::db::Storage;
use crate::services::LedgerStore;

use super::{describe, parse_amount};

pub async fn execute<S: Storage>(ledger: &LedgerStore<S>, args: &[&str]) -> Result<String, String> {
    if args.len() < 3 {
        return Ok("Usage: $send <sender id> <recipient id> <amount>\n\
                   Examples:\n  $send 3f2a... 9b1c... 20\n  $transfer 3f2a... 9b1c... 0.5"
            .to_string());
    }

    let amount = parse_amount(args[2])?;
    let transaction = ledger
        .transfer(args[0], args[1], amount)
        .await
        .map_err(|e| describe(&e))?;

    Ok(format!(
        "Transfer successful\nFrom: {}\nTo: {}\nAmount: {}\nReceipt: {}",
        args[0], transaction.recipient, transaction.amount, transaction.uuid
    ))
}
