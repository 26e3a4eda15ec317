use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::LedgerConfig;
use crate::models::{fits_amount_scale, NewTransaction, Transaction};
use crate::utils::LedgerError;

pub mod memory;
pub mod mysql;
pub mod transaction;
pub mod wallet;

pub use memory::MemoryStorage;
pub use mysql::MySqlStorage;

/// Storage backend behind the ledger service.
///
/// `apply_deposit` and `apply_transfer` must validate and apply their entry
/// as one atomic unit: either the balances change and the entry is appended,
/// or nothing is observable. Implementations serialize all mutations that
/// touch the same wallet.
///
/// The `deadline` bounds only the work that can still be abandoned without
/// effect. Once a backend starts committing it must finish and report the
/// real outcome instead of timing out.
pub trait Storage: Send + Sync {
    /// Insert a zero-balance wallet. Returns `false` if the ID is taken.
    fn insert_wallet(&self, wallet_id: &str) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    fn wallet_balance(
        &self,
        wallet_id: &str,
    ) -> impl Future<Output = Result<Option<Decimal>, LedgerError>> + Send;

    fn apply_deposit(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> impl Future<Output = Result<Transaction, LedgerError>> + Send;

    fn apply_transfer(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> impl Future<Output = Result<Transaction, LedgerError>> + Send;

    /// Entries naming the wallet as sender or recipient, oldest first
    fn transactions_for(
        &self,
        wallet_id: &str,
    ) -> impl Future<Output = Result<Vec<Transaction>, LedgerError>> + Send;

    fn transaction_by_uuid(
        &self,
        uuid: &str,
    ) -> impl Future<Output = Result<Option<Transaction>, LedgerError>> + Send;

    fn wallet_ids(&self) -> impl Future<Output = Result<Vec<String>, LedgerError>> + Send;

    fn total_balance(&self) -> impl Future<Output = Result<Decimal, LedgerError>> + Send;

    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Run `work` under `deadline`; elapsing drops it and reports the storage as
/// unavailable. Only wrap work whose cancellation leaves no trace.
pub async fn within_deadline<T, F>(
    deadline: Duration,
    op: &'static str,
    work: F,
) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    match tokio::time::timeout(deadline, work).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::StorageUnavailable(format!(
            "{} timed out after {}ms",
            op,
            deadline.as_millis()
        ))),
    }
}

/// Transfer preconditions, first failure wins: sender, recipient, an amount
/// with more decimal places than storage keeps, then funds. A non-positive
/// amount is reported as insufficient funds.
pub(crate) fn check_transfer(
    entry: &NewTransaction,
    sender_balance: Option<Decimal>,
    recipient_exists: bool,
) -> Result<(), LedgerError> {
    let sender_id = entry.sender.as_deref().unwrap_or_default();

    let balance = sender_balance.ok_or_else(|| LedgerError::InvalidSender(sender_id.to_string()))?;

    if !recipient_exists {
        return Err(LedgerError::InvalidRecipient(entry.recipient.clone()));
    }

    if !fits_amount_scale(entry.amount) {
        return Err(LedgerError::InvalidAmount(entry.amount));
    }

    if entry.amount <= Decimal::ZERO || balance < entry.amount {
        return Err(LedgerError::InsufficientFunds {
            wallet: sender_id.to_string(),
            balance,
            requested: entry.amount,
        });
    }

    Ok(())
}

/// Either backend, picked at startup from the configuration
pub enum AnyStorage {
    Memory(MemoryStorage),
    MySql(MySqlStorage),
}

/// Open the configured backend: MySQL when `DATABASE_URL` is set, else memory
pub async fn open(config: &LedgerConfig) -> Result<AnyStorage, LedgerError> {
    match &config.database_url {
        Some(url) => {
            let storage = MySqlStorage::open(url, config.max_connections, config.op_timeout).await?;
            Ok(AnyStorage::MySql(storage))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory storage");
            Ok(AnyStorage::Memory(MemoryStorage::new()))
        }
    }
}

impl Storage for AnyStorage {
    async fn insert_wallet(&self, wallet_id: &str) -> Result<bool, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.insert_wallet(wallet_id).await,
            AnyStorage::MySql(s) => s.insert_wallet(wallet_id).await,
        }
    }

    async fn wallet_balance(&self, wallet_id: &str) -> Result<Option<Decimal>, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.wallet_balance(wallet_id).await,
            AnyStorage::MySql(s) => s.wallet_balance(wallet_id).await,
        }
    }

    async fn apply_deposit(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.apply_deposit(entry, deadline).await,
            AnyStorage::MySql(s) => s.apply_deposit(entry, deadline).await,
        }
    }

    async fn apply_transfer(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.apply_transfer(entry, deadline).await,
            AnyStorage::MySql(s) => s.apply_transfer(entry, deadline).await,
        }
    }

    async fn transactions_for(&self, wallet_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.transactions_for(wallet_id).await,
            AnyStorage::MySql(s) => s.transactions_for(wallet_id).await,
        }
    }

    async fn transaction_by_uuid(&self, uuid: &str) -> Result<Option<Transaction>, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.transaction_by_uuid(uuid).await,
            AnyStorage::MySql(s) => s.transaction_by_uuid(uuid).await,
        }
    }

    async fn wallet_ids(&self) -> Result<Vec<String>, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.wallet_ids().await,
            AnyStorage::MySql(s) => s.wallet_ids().await,
        }
    }

    async fn total_balance(&self) -> Result<Decimal, LedgerError> {
        match self {
            AnyStorage::Memory(s) => s.total_balance().await,
            AnyStorage::MySql(s) => s.total_balance().await,
        }
    }

    async fn close(&self) {
        match self {
            AnyStorage::Memory(s) => s.close().await,
            AnyStorage::MySql(s) => s.close().await,
        }
    }
}
