use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::MySql;
use tracing::{debug, info, warn};

use super::{check_transfer, transaction, wallet, within_deadline, Storage};
use crate::models::{NewTransaction, Transaction};
use crate::utils::LedgerError;

const CREATE_TABLES: &str = include_str!("../../migrations/create_tables.sql");

/// MySQL backend over an owned connection pool.
///
/// Every mutation runs in its own database transaction and takes
/// `SELECT ... FOR UPDATE` row locks on the wallets it touches, lowest
/// wallet ID first. Returning early drops the transaction, which rolls it back.
///
/// The deadline covers everything up to the commit. The commit itself is
/// always awaited, and a failed commit is checked against the log so a
/// caller never sees an error for a transfer that actually landed.
pub struct MySqlStorage {
    pool: MySqlPool,
}

impl MySqlStorage {
    /// Connect and create the tables if they do not exist yet
    pub async fn open(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        sqlx::raw_sql(CREATE_TABLES).execute(&pool).await?;
        info!(max_connections, "MySQL storage ready");

        Ok(MySqlStorage { pool })
    }

    async fn commit(&self, tx: sqlx::Transaction<'static, MySql>, uuid: &str) -> Result<(), LedgerError> {
        let Err(e) = tx.commit().await else {
            return Ok(());
        };
        warn!(%uuid, "commit failed, checking whether it landed: {}", e);
        let recorded = self.transaction_by_uuid(uuid).await;
        commit_outcome(e, uuid, recorded)
    }
}

/// Decide what a failed commit means once the log has been checked for its
/// entry. A server-side rejection rolled the transaction back; a lost
/// connection leaves the outcome unknown unless the entry is found.
fn commit_outcome(
    err: sqlx::Error,
    uuid: &str,
    recorded: Result<Option<Transaction>, LedgerError>,
) -> Result<(), LedgerError> {
    match recorded {
        Ok(Some(_)) => Ok(()),
        Ok(None) if matches!(err, sqlx::Error::Database(_)) => Err(err.into()),
        _ => Err(LedgerError::Database(format!(
            "commit outcome unknown for {} ({}); look up the receipt before retrying",
            uuid, err
        ))),
    }
}

impl Storage for MySqlStorage {
    async fn insert_wallet(&self, wallet_id: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(wallet::insert_wallet(&mut conn, wallet_id).await?)
    }

    async fn wallet_balance(&self, wallet_id: &str) -> Result<Option<Decimal>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(wallet::get_balance(&mut conn, wallet_id).await?)
    }

    async fn apply_deposit(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        let (tx, seq) = within_deadline(deadline, "deposit", async {
            let mut tx = self.pool.begin().await?;

            if wallet::lock_balance(&mut tx, &entry.recipient).await?.is_none() {
                return Err(LedgerError::NotFound(entry.recipient.clone()));
            }

            wallet::update_balance(&mut tx, &entry.recipient, entry.amount).await?;
            let seq = transaction::insert_transaction(&mut tx, &entry).await?;
            Ok::<_, LedgerError>((tx, seq))
        })
        .await?;

        self.commit(tx, &entry.uuid).await?;
        Ok(entry.into_transaction(seq))
    }

    async fn apply_transfer(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        let sender_id = entry.sender.clone().unwrap_or_default();
        let recipient_id = entry.recipient.clone();

        let (tx, seq) = within_deadline(deadline, "transfer", async {
            let mut tx = self.pool.begin().await?;

            let (sender_balance, recipient_balance) = if sender_id == recipient_id {
                let balance = wallet::lock_balance(&mut tx, &sender_id).await?;
                (balance, balance)
            } else if sender_id < recipient_id {
                let s = wallet::lock_balance(&mut tx, &sender_id).await?;
                let r = wallet::lock_balance(&mut tx, &recipient_id).await?;
                (s, r)
            } else {
                let r = wallet::lock_balance(&mut tx, &recipient_id).await?;
                let s = wallet::lock_balance(&mut tx, &sender_id).await?;
                (s, r)
            };

            check_transfer(&entry, sender_balance, recipient_balance.is_some())?;

            if sender_id != recipient_id {
                wallet::update_balance(&mut tx, &sender_id, -entry.amount).await?;
                wallet::update_balance(&mut tx, &recipient_id, entry.amount).await?;
            }
            let seq = transaction::insert_transaction(&mut tx, &entry).await?;
            Ok::<_, LedgerError>((tx, seq))
        })
        .await?;

        self.commit(tx, &entry.uuid).await?;
        debug!(seq, "transfer committed to MySQL");
        Ok(entry.into_transaction(seq))
    }

    async fn transactions_for(&self, wallet_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let rows = transaction::get_wallet_transactions(&mut conn, wallet_id).await?;
        rows.into_iter().map(transaction::row_to_transaction).collect()
    }

    async fn transaction_by_uuid(&self, uuid: &str) -> Result<Option<Transaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transaction::get_transaction_by_uuid(&mut conn, uuid)
            .await?
            .map(transaction::row_to_transaction)
            .transpose()
    }

    async fn wallet_ids(&self) -> Result<Vec<String>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(wallet::list_wallet_ids(&mut conn).await?)
    }

    async fn total_balance(&self) -> Result<Decimal, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(wallet::total_balance(&mut conn).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("MySQL pool closed");
    }
}
