//! Centralized wallet ledger.
//!
//! [`LedgerStore`] keeps per-wallet balances and an append-only transaction
//! log on top of a [`Storage`] backend: [`db::MemoryStorage`] in process, or
//! [`db::MySqlStorage`] over a sqlx pool. Deposits and transfers are applied
//! atomically and mutations touching the same wallet are serialized.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use config::LedgerConfig;
pub use db::Storage;
pub use models::{Transaction, TransactionKind, Wallet};
pub use services::LedgerStore;
pub use utils::LedgerError;
