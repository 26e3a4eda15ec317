//! Line-oriented front-end over the ledger
//!
//! Each input line is `$command arg...`; the reply is plain text. Ledger
//! errors are turned into readable messages here, never in the core.

pub mod balance;
pub mod help;
pub mod send;
pub mod transaction;
pub mod wallet;

use std::str::FromStr;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::db::Storage;
use crate::models::AMOUNT_SCALE;
use crate::services::LedgerStore;
use crate::utils::LedgerError;

/// What the command loop should do after a line
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Reply(String),
    Quit,
    Ignored,
}

pub async fn handle_line<S: Storage>(ledger: &LedgerStore<S>, page_size: usize, line: &str) -> Outcome {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return Outcome::Ignored;
    };

    debug!("command {} with {} args", command, args.len());

    let result = match command {
        "$create" | "$new" => wallet::create(ledger).await,
        "$wallets" | "$ls" => wallet::list(ledger).await,
        "$balance" | "$bal" => balance::execute(ledger, args).await,
        "$deposit" | "$dep" => balance::deposit(ledger, args).await,
        "$send" | "$transfer" => send::execute(ledger, args).await,
        "$history" | "$hist" => transaction::history(ledger, args, page_size).await,
        "$transaction" | "$tx" => transaction::detail(ledger, args).await,
        "$help" => Ok(help::text()),
        "$quit" | "$exit" => return Outcome::Quit,
        _ if command.starts_with('$') => Err(format!("Unknown command {}. Try $help", command)),
        _ => return Outcome::Ignored,
    };

    match result {
        Ok(reply) => Outcome::Reply(reply),
        Err(message) => Outcome::Reply(format!("Error: {}", message)),
    }
}

/// Answer commands line by line until end of input or `$quit`.
///
/// Every reply is flushed before the next line is read. A failed read,
/// write or flush ends the session and is returned to the caller.
pub async fn serve<S, R, W>(
    ledger: &LedgerStore<S>,
    page_size: usize,
    input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    S: Storage,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match handle_line(ledger, page_size, &line).await {
            Outcome::Reply(text) => {
                output.write_all(format!("{}\n", text).as_bytes()).await?;
                output.flush().await?;
            }
            Outcome::Quit => break,
            Outcome::Ignored => {}
        }
    }
    Ok(())
}

/// Human-readable message for a ledger failure
pub fn describe(err: &LedgerError) -> String {
    match err {
        LedgerError::NotFound(id) => format!("Wallet {} not found", id),
        LedgerError::InvalidAmount(amount) => format!(
            "Amount must be positive with at most {} decimal places, got {}",
            AMOUNT_SCALE, amount
        ),
        LedgerError::InvalidSender(id) => format!("Invalid sender: no wallet {}", id),
        LedgerError::InvalidRecipient(id) => format!("Invalid recipient: no wallet {}", id),
        LedgerError::InsufficientFunds { balance, requested, .. } => format!(
            "Insufficient funds\nRequested: {}\nAvailable: {}",
            requested, balance
        ),
        LedgerError::StorageUnavailable(_) => {
            "Storage is unavailable right now, please try again".to_string()
        }
        LedgerError::Database(detail) => format!("Database error: {}", detail),
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("Invalid amount: {}", raw))
}
