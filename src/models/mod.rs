//! Ledger records
//!
//! Wallets and transaction-log entries as they cross the storage boundary.
//! Both are plain data: balances change only through the ledger service.

pub mod transaction;
pub mod wallet;

pub use transaction::{fits_amount_scale, NewTransaction, Transaction, TransactionKind, AMOUNT_SCALE};
pub use wallet::Wallet;
