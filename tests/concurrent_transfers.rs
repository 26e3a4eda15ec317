use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wallet_ledger::db::MemoryStorage;
use wallet_ledger::{LedgerError, LedgerStore, TransactionKind};

type Ledger = Arc<LedgerStore<MemoryStorage>>;

fn ledger() -> Ledger {
    Arc::new(LedgerStore::new(MemoryStorage::new(), Duration::from_secs(10)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hundred_concurrent_transfers_no_lost_updates() {
    let ledger = ledger();
    let a = ledger.create_wallet().await.unwrap();
    let b = ledger.create_wallet().await.unwrap();
    ledger.deposit(&a, dec!(100)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..100 {
        let ledger = ledger.clone();
        let (a, b) = (a.clone(), b.clone());
        handles.push(tokio::spawn(async move { ledger.transfer(&a, &b, dec!(1)).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ledger.get_balance(&a).await.unwrap(), Decimal::ZERO);
    assert_eq!(ledger.get_balance(&b).await.unwrap(), dec!(100));

    let transfers: Vec<_> = ledger
        .get_transaction_history(&b)
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.kind == TransactionKind::Transfer)
        .collect();
    assert_eq!(transfers.len(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overdraw_race_never_goes_negative() {
    let ledger = ledger();
    let source = ledger.create_wallet().await.unwrap();
    let mut sinks = Vec::new();
    for _ in 0..5 {
        sinks.push(ledger.create_wallet().await.unwrap());
    }
    ledger.deposit(&source, dec!(30)).await.unwrap();

    // 50 attempts of 1 against a balance of 30: exactly 30 may win
    let mut handles = Vec::new();
    for i in 0..50 {
        let ledger = ledger.clone();
        let source = source.clone();
        let sink = sinks[i % sinks.len()].clone();
        handles.push(tokio::spawn(async move { ledger.transfer(&source, &sink, dec!(1)).await }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(LedgerError::InsufficientFunds { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(ok, 30);
    assert_eq!(ledger.get_balance(&source).await.unwrap(), Decimal::ZERO);
    assert_eq!(ledger.total_balance().await.unwrap(), dec!(30));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposing_transfers_do_not_deadlock() {
    let ledger = ledger();
    let a = ledger.create_wallet().await.unwrap();
    let b = ledger.create_wallet().await.unwrap();
    ledger.deposit(&a, dec!(1000)).await.unwrap();
    ledger.deposit(&b, dec!(1000)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..200 {
        let ledger = ledger.clone();
        let (from, to) = if i % 2 == 0 { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
        handles.push(tokio::spawn(async move { ledger.transfer(&from, &to, dec!(3)).await }));
    }

    let all = tokio::time::timeout(Duration::from_secs(5), async {
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    })
    .await;
    assert!(all.is_ok(), "opposing transfers stalled");

    // 100 each way cancel out
    assert_eq!(ledger.get_balance(&a).await.unwrap(), dec!(1000));
    assert_eq!(ledger.get_balance(&b).await.unwrap(), dec!(1000));
    assert_eq!(ledger.get_transaction_history(&a).await.unwrap().len(), 201);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_and_reads() {
    let ledger = ledger();
    let a = ledger.create_wallet().await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..64 {
        let ledger = ledger.clone();
        let a = a.clone();
        handles.push(tokio::spawn(async move {
            ledger.deposit(&a, dec!(0.5)).await.unwrap();
            let seen = ledger.get_balance(&a).await.unwrap();
            assert!(seen >= dec!(0.5) && seen <= dec!(32));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(ledger.get_balance(&a).await.unwrap(), dec!(32));
    assert_eq!(ledger.get_transaction_history(&a).await.unwrap().len(), 64);
}
