use std::future::pending;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wallet_ledger::db::{within_deadline, MemoryStorage};
use wallet_ledger::models::NewTransaction;
use wallet_ledger::{LedgerError, LedgerStore, Storage, Transaction, TransactionKind};

fn ledger() -> LedgerStore<MemoryStorage> {
    LedgerStore::new(MemoryStorage::new(), Duration::from_secs(5))
}

#[tokio::test]
async fn test_deposit_then_transfer_scenario() {
    let ledger = ledger();

    let a = ledger.create_wallet().await.unwrap();
    assert_eq!(ledger.get_balance(&a).await.unwrap(), Decimal::ZERO);

    ledger.deposit(&a, dec!(50)).await.unwrap();
    assert_eq!(ledger.get_balance(&a).await.unwrap(), dec!(50));

    let history = ledger.get_transaction_history(&a).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::Deposit);
    assert_eq!(history[0].amount, dec!(50));

    let b = ledger.create_wallet().await.unwrap();
    assert_eq!(ledger.get_balance(&b).await.unwrap(), Decimal::ZERO);

    let transfer = ledger.transfer(&a, &b, dec!(20)).await.unwrap();
    assert_eq!(transfer.sender.as_deref(), Some(a.as_str()));
    assert_eq!(transfer.recipient, b);

    assert_eq!(ledger.get_balance(&a).await.unwrap(), dec!(30));
    assert_eq!(ledger.get_balance(&b).await.unwrap(), dec!(20));

    let history_a = ledger.get_transaction_history(&a).await.unwrap();
    assert_eq!(history_a.len(), 2);
    assert_eq!(history_a[0].kind, TransactionKind::Deposit);
    assert_eq!(history_a[1].kind, TransactionKind::Transfer);

    let history_b = ledger.get_transaction_history(&b).await.unwrap();
    assert_eq!(history_b, vec![transfer]);
}

#[tokio::test]
async fn test_conservation_over_mixed_operations() {
    let ledger = ledger();
    let mut wallets = Vec::new();
    for _ in 0..4 {
        wallets.push(ledger.create_wallet().await.unwrap());
    }

    let mut deposited = Decimal::ZERO;
    for (i, wallet) in wallets.iter().enumerate() {
        let amount = Decimal::from(10 * (i as i64 + 1)) + dec!(0.25);
        ledger.deposit(wallet, amount).await.unwrap();
        deposited += amount;
    }

    // Some succeed, some fail on funds; none may create or destroy value
    let moves = [
        (0, 1, dec!(5)),
        (1, 2, dec!(100)),
        (3, 0, dec!(40.25)),
        (2, 2, dec!(1)),
        (0, 3, dec!(55.25)),
        (1, 0, dec!(0.01)),
    ];
    for (from, to, amount) in moves {
        let _ = ledger.transfer(&wallets[from], &wallets[to], amount).await;
        assert_eq!(ledger.total_balance().await.unwrap(), deposited);
    }

    for wallet in &wallets {
        assert!(ledger.get_balance(wallet).await.unwrap() >= Decimal::ZERO);
    }

    let mut sum = Decimal::ZERO;
    for wallet in ledger.list_wallet_ids().await.unwrap() {
        sum += ledger.get_balance(&wallet).await.unwrap();
    }
    assert_eq!(sum, deposited);
}

#[tokio::test]
async fn test_history_of_unknown_wallet_is_empty() {
    let ledger = ledger();
    assert!(ledger.get_transaction_history("nobody").await.unwrap().is_empty());
}

/// Backend whose every call hangs, standing in for an unreachable database.
/// Mutations honour their deadline the way real backends do.
struct StalledStorage;

impl Storage for StalledStorage {
    async fn insert_wallet(&self, _wallet_id: &str) -> Result<bool, LedgerError> {
        pending().await
    }

    async fn wallet_balance(&self, _wallet_id: &str) -> Result<Option<Decimal>, LedgerError> {
        pending().await
    }

    async fn apply_deposit(
        &self,
        _entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        within_deadline(deadline, "deposit", pending()).await
    }

    async fn apply_transfer(
        &self,
        _entry: NewTransaction,
        deadline: Duration,
    ) -> Result<Transaction, LedgerError> {
        within_deadline(deadline, "transfer", pending()).await
    }

    async fn transactions_for(&self, _wallet_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        pending().await
    }

    async fn transaction_by_uuid(&self, _uuid: &str) -> Result<Option<Transaction>, LedgerError> {
        pending().await
    }

    async fn wallet_ids(&self) -> Result<Vec<String>, LedgerError> {
        pending().await
    }

    async fn total_balance(&self) -> Result<Decimal, LedgerError> {
        pending().await
    }

    async fn close(&self) {}
}

#[tokio::test]
async fn test_unreachable_storage_fails_fast_and_retryable() {
    let ledger = LedgerStore::new(StalledStorage, Duration::from_millis(20));

    let err = ledger.transfer("a", "b", dec!(1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::StorageUnavailable(_)));
    assert!(err.is_retryable());

    let err = ledger.deposit("a", dec!(1)).await.unwrap_err();
    assert!(err.is_retryable());

    assert!(matches!(
        ledger.get_balance("a").await,
        Err(LedgerError::StorageUnavailable(_))
    ));
    assert!(matches!(
        ledger.create_wallet().await,
        Err(LedgerError::StorageUnavailable(_))
    ));

    // Amount validation never reaches storage
    assert_eq!(
        ledger.deposit("a", dec!(0)).await,
        Err(LedgerError::InvalidAmount(dec!(0)))
    );
}
