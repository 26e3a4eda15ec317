use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlConnection;

use crate::models::{NewTransaction, Transaction, TransactionKind};
use crate::utils::LedgerError;

/// Raw `ledger_transaction` row: (seq, uuid, kind, sender_id, recipient_id, amount, created_at)
pub type TransactionRow = (u64, String, String, Option<String>, String, Decimal, NaiveDateTime);

const SELECT_COLUMNS: &str =
    "SELECT seq, uuid, kind, sender_id, recipient_id, amount, created_at FROM ledger_transaction";

/// Append a log entry, returning its sequence number
pub async fn insert_transaction(
    conn: &mut MySqlConnection,
    entry: &NewTransaction,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO ledger_transaction (uuid, kind, sender_id, recipient_id, amount, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.uuid)
    .bind(entry.kind.as_str())
    .bind(entry.sender.as_deref())
    .bind(&entry.recipient)
    .bind(entry.amount)
    .bind(entry.timestamp.naive_utc())
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}

/// Get transaction by UUID
pub async fn get_transaction_by_uuid(
    conn: &mut MySqlConnection,
    uuid: &str,
) -> Result<Option<TransactionRow>, sqlx::Error> {
    let sql = format!("{} WHERE uuid = ?", SELECT_COLUMNS);
    sqlx::query_as::<_, TransactionRow>(&sql)
        .bind(uuid)
        .fetch_optional(conn)
        .await
}

/// Get all transactions where the wallet is sender or recipient, oldest first
pub async fn get_wallet_transactions(
    conn: &mut MySqlConnection,
    wallet_id: &str,
) -> Result<Vec<TransactionRow>, sqlx::Error> {
    let sql = format!(
        "{} WHERE sender_id = ? OR recipient_id = ? ORDER BY seq ASC",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, TransactionRow>(&sql)
        .bind(wallet_id)
        .bind(wallet_id)
        .fetch_all(conn)
        .await
}

pub fn row_to_transaction(row: TransactionRow) -> Result<Transaction, LedgerError> {
    let (seq, uuid, kind, sender, recipient, amount, created_at) = row;
    let kind = TransactionKind::parse(&kind)
        .ok_or_else(|| LedgerError::Database(format!("unknown transaction kind '{}' on {}", kind, uuid)))?;

    Ok(Transaction {
        seq,
        uuid,
        kind,
        sender,
        recipient,
        amount,
        timestamp: created_at.and_utc(),
    })
}
