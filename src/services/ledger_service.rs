use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::db::{within_deadline, Storage};
use crate::models::{fits_amount_scale, NewTransaction, Transaction, Wallet};
use crate::utils::{LedgerError, Page};

/// Wallet balances plus the append-only transaction log.
///
/// The store owns its storage handle; open it at startup and call
/// [`LedgerStore::close`] at shutdown. Balances change only through
/// [`LedgerStore::deposit`] and [`LedgerStore::transfer`].
pub struct LedgerStore<S: Storage> {
    storage: S,
    op_timeout: Duration,
}

impl<S: Storage> LedgerStore<S> {
    pub fn new(storage: S, op_timeout: Duration) -> Self {
        LedgerStore { storage, op_timeout }
    }

    /// Run one read-only or idempotent storage call under the operation deadline
    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        let result = within_deadline(self.op_timeout, op, call).await;
        if let Err(e) = &result {
            log_storage_failure(op, e);
        }
        result
    }

    /// Create a wallet with zero balance and return its fresh ID
    pub async fn create_wallet(&self) -> Result<String, LedgerError> {
        loop {
            let wallet_id = uuid::Uuid::new_v4().to_string();
            if self
                .bounded("create_wallet", self.storage.insert_wallet(&wallet_id))
                .await?
            {
                info!(wallet = %wallet_id, "wallet created");
                return Ok(wallet_id);
            }
            warn!(wallet = %wallet_id, "wallet ID collision, regenerating");
        }
    }

    pub async fn get_balance(&self, wallet_id: &str) -> Result<Decimal, LedgerError> {
        debug!(wallet = %wallet_id, "balance lookup");
        self.bounded("get_balance", self.storage.wallet_balance(wallet_id))
            .await?
            .ok_or_else(|| LedgerError::NotFound(wallet_id.to_string()))
    }

    pub async fn get_wallet(&self, wallet_id: &str) -> Result<Wallet, LedgerError> {
        let balance = self.get_balance(wallet_id).await?;
        Ok(Wallet {
            id: wallet_id.to_string(),
            balance,
        })
    }

    /// Credit a wallet from outside the ledger
    pub async fn deposit(&self, wallet_id: &str, amount: Decimal) -> Result<Transaction, LedgerError> {
        if amount <= Decimal::ZERO {
            warn!(wallet = %wallet_id, %amount, "deposit rejected: non-positive amount");
            return Err(LedgerError::InvalidAmount(amount));
        }
        if !fits_amount_scale(amount) {
            warn!(wallet = %wallet_id, %amount, "deposit rejected: too many decimal places");
            return Err(LedgerError::InvalidAmount(amount));
        }

        // Mutations bound themselves: the storage applies the deadline up to
        // its commit and then reports the real outcome.
        let entry = NewTransaction::deposit(wallet_id, amount);
        match self.storage.apply_deposit(entry, self.op_timeout).await {
            Ok(transaction) => {
                info!(wallet = %wallet_id, %amount, seq = transaction.seq, "deposit applied");
                Ok(transaction)
            }
            Err(e) => {
                log_storage_failure("deposit", &e);
                warn!(wallet = %wallet_id, %amount, "deposit rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Move `amount` from sender to recipient.
    ///
    /// Checks run in order and the first failure wins: unknown sender, unknown
    /// recipient, an amount with more than eight decimal places (invalid
    /// amount), then a non-positive amount or a balance below `amount` (both
    /// reported as insufficient funds). Sending to oneself is allowed:
    /// the funds check still applies, the balance is unchanged and the
    /// transfer is logged.
    pub async fn transfer(
        &self,
        sender_id: &str,
        recipient_id: &str,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let entry = NewTransaction::transfer(sender_id, recipient_id, amount);
        match self.storage.apply_transfer(entry, self.op_timeout).await {
            Ok(transaction) => {
                info!(
                    sender = %sender_id,
                    recipient = %recipient_id,
                    %amount,
                    seq = transaction.seq,
                    "transfer applied"
                );
                Ok(transaction)
            }
            Err(e) => {
                log_storage_failure("transfer", &e);
                warn!(sender = %sender_id, recipient = %recipient_id, %amount, "transfer rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Every entry naming the wallet, oldest first. Unknown wallets have none.
    pub async fn get_transaction_history(&self, wallet_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        debug!(wallet = %wallet_id, "history lookup");
        self.bounded("get_transaction_history", self.storage.transactions_for(wallet_id))
            .await
    }

    /// One page (1-based) of [`LedgerStore::get_transaction_history`]
    pub async fn history_page(
        &self,
        wallet_id: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Page<Transaction>, LedgerError> {
        let history = self.get_transaction_history(wallet_id).await?;
        Ok(Page::from_slice(&history, page, per_page))
    }

    pub async fn get_transaction(&self, uuid: &str) -> Result<Option<Transaction>, LedgerError> {
        self.bounded("get_transaction", self.storage.transaction_by_uuid(uuid))
            .await
    }

    pub async fn list_wallet_ids(&self) -> Result<Vec<String>, LedgerError> {
        self.bounded("list_wallet_ids", self.storage.wallet_ids()).await
    }

    /// Sum of every wallet balance; equals the sum of all deposits
    pub async fn total_balance(&self) -> Result<Decimal, LedgerError> {
        self.bounded("total_balance", self.storage.total_balance()).await
    }

    pub async fn close(&self) {
        self.storage.close().await;
        info!("ledger closed");
    }
}

fn log_storage_failure(op: &str, e: &LedgerError) {
    if matches!(e, LedgerError::StorageUnavailable(_) | LedgerError::Database(_)) {
        error!("{} failed: {}", op, e);
    }
}
