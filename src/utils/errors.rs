use rust_decimal::Decimal;
use thiserror::Error;

/// Failure kinds returned by every ledger operation.
///
/// Only [`LedgerError::StorageUnavailable`] is worth retrying unmodified;
/// every other kind is permanent for the given input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("wallet {0} not found")]
    NotFound(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),
    #[error("invalid sender: {0}")]
    InvalidSender(String),
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("insufficient funds in {wallet}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        wallet: String,
        balance: Decimal,
        requested: Decimal,
    },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("database error: {0}")]
    Database(String),
}

impl LedgerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StorageUnavailable(_))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => LedgerError::StorageUnavailable(err.to_string()),
            // Deadlock victim or lock wait timeout: rolled back, safe to retry
            sqlx::Error::Database(ref db_err) if is_lock_conflict(db_err.message()) => {
                LedgerError::StorageUnavailable(extract_clean_error(&err.to_string()))
            }
            other => LedgerError::Database(extract_clean_error(&other.to_string())),
        }
    }
}

fn is_lock_conflict(message: &str) -> bool {
    message.contains("Deadlock found") || message.contains("Lock wait timeout")
}

/// Extract clean error message from database error strings
///
/// Removes technical error codes and prefixes like:
/// "error returned from database: 3819 (HY000): Check constraint 'wallet_chk_1' is violated."
///
/// Returns only the meaningful error message:
/// "Check constraint 'wallet_chk_1' is violated."
pub fn extract_clean_error(error_msg: &str) -> String {
    if error_msg.contains("error returned from database:") {
        // Everything after the last colon is the server's own message
        if let Some(last_colon) = error_msg.rfind(": ") {
            error_msg[last_colon + 2..].trim().to_string()
        } else {
            error_msg.to_string()
        }
    } else {
        error_msg.to_string()
    }
}
