use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::{check_transfer, within_deadline, Storage};
use crate::models::{NewTransaction, Transaction};
use crate::utils::LedgerError;

type BalanceCell = Arc<Mutex<Decimal>>;

/// In-process backend.
///
/// Each wallet balance sits behind its own mutex so mutations on disjoint
/// wallets never contend. Multi-wallet operations lock in ascending wallet-ID
/// order. The log is appended while the affected wallet locks are held, after
/// every fallible step and is the last await, so abandoning a mutation at its
/// deadline leaves nothing behind.
#[derive(Default)]
pub struct MemoryStorage {
    wallets: RwLock<HashMap<String, BalanceCell>>,
    log: RwLock<Vec<Transaction>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    async fn cell(&self, wallet_id: &str) -> Option<BalanceCell> {
        self.wallets.read().await.get(wallet_id).cloned()
    }

    async fn append(&self, entry: NewTransaction) -> Transaction {
        let mut log = self.log.write().await;
        let transaction = entry.into_transaction(log.len() as u64 + 1);
        log.push(transaction.clone());
        transaction
    }

    async fn deposit_now(&self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        let cell = self
            .cell(&entry.recipient)
            .await
            .ok_or_else(|| LedgerError::NotFound(entry.recipient.clone()))?;

        let mut balance = cell.lock().await;
        let updated = balance
            .checked_add(entry.amount)
            .ok_or_else(|| overflow(&entry.recipient))?;

        let transaction = self.append(entry).await;
        *balance = updated;
        Ok(transaction)
    }

    async fn transfer_now(&self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        let sender_id = entry.sender.clone().unwrap_or_default();
        let sender_cell = self
            .cell(&sender_id)
            .await
            .ok_or_else(|| LedgerError::InvalidSender(sender_id.clone()))?;
        let recipient_cell = self
            .cell(&entry.recipient)
            .await
            .ok_or_else(|| LedgerError::InvalidRecipient(entry.recipient.clone()))?;

        // Self-transfer: one lock, balance unchanged, still logged
        if sender_id == entry.recipient {
            let balance = sender_cell.lock().await;
            check_transfer(&entry, Some(*balance), true)?;
            return Ok(self.append(entry).await);
        }

        let sender_first = sender_id < entry.recipient;
        let (first, second) = if sender_first {
            (&sender_cell, &recipient_cell)
        } else {
            (&recipient_cell, &sender_cell)
        };
        let mut first_guard = first.lock().await;
        let mut second_guard = second.lock().await;
        let (sender_balance, recipient_balance) = if sender_first {
            (&mut *first_guard, &mut *second_guard)
        } else {
            (&mut *second_guard, &mut *first_guard)
        };

        check_transfer(&entry, Some(*sender_balance), true)?;

        let debited = *sender_balance - entry.amount;
        let credited = recipient_balance
            .checked_add(entry.amount)
            .ok_or_else(|| overflow(&entry.recipient))?;

        let transaction = self.append(entry).await;
        *sender_balance = debited;
        *recipient_balance = credited;
        debug!(seq = transaction.seq, "transfer applied in memory");
        Ok(transaction)
    }
}

fn overflow(wallet_id: &str) -> LedgerError {
    LedgerError::Database(format!("balance overflow on wallet {}", wallet_id))
}

impl Storage for MemoryStorage {
    async fn insert_wallet(&self, wallet_id: &str) -> Result<bool, LedgerError> {
        let mut wallets = self.wallets.write().await;
        if wallets.contains_key(wallet_id) {
            return Ok(false);
        }
        wallets.insert(wallet_id.to_string(), Arc::new(Mutex::new(Decimal::ZERO)));
        Ok(true)
    }

    async fn wallet_balance(&self, wallet_id: &str) -> Result<Option<Decimal>, LedgerError> {
        match self.cell(wallet_id).await {
            Some(cell) => Ok(Some(*cell.lock().await)),
            None => Ok(None),
        }
    }

    async fn apply_deposit(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        within_deadline(deadline, "deposit", self.deposit_now(entry)).await
    }

    async fn apply_transfer(
        &self,
        entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        within_deadline(deadline, "transfer", self.transfer_now(entry)).await
    }

    async fn transactions_for(&self, wallet_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        let log = self.log.read().await;
        Ok(log.iter().filter(|t| t.involves(wallet_id)).cloned().collect())
    }

    async fn transaction_by_uuid(&self, uuid: &str) -> Result<Option<Transaction>, LedgerError> {
        let log = self.log.read().await;
        Ok(log.iter().find(|t| t.uuid == uuid).cloned())
    }

    async fn wallet_ids(&self) -> Result<Vec<String>, LedgerError> {
        let wallets = self.wallets.read().await;
        let mut ids: Vec<String> = wallets.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn total_balance(&self) -> Result<Decimal, LedgerError> {
        let mut cells: Vec<(String, BalanceCell)> = {
            let wallets = self.wallets.read().await;
            wallets.iter().map(|(id, cell)| (id.clone(), cell.clone())).collect()
        };
        cells.sort_by(|a, b| a.0.cmp(&b.0));

        // Hold every wallet lock at once so no transfer is seen half-applied
        let mut guards = Vec::with_capacity(cells.len());
        for (_, cell) in &cells {
            guards.push(cell.lock().await);
        }

        let mut total = Decimal::ZERO;
        for guard in &guards {
            total = total
                .checked_add(**guard)
                .ok_or_else(|| LedgerError::Database("total balance overflow".into()))?;
        }
        Ok(total)
    }

    async fn close(&self) {
        debug!("in-memory storage closed");
    }
}
