use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places a stored amount may carry, matching `DECIMAL(30, 8)`
pub const AMOUNT_SCALE: u32 = 8;

/// True when `amount` is representable without rounding in storage.
/// Trailing zeros do not count: `1.500000000000` fits.
pub fn fits_amount_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Transfer,
    Deposit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Transfer => "transfer",
            TransactionKind::Deposit => "deposit",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "transfer" => Some(TransactionKind::Transfer),
            "deposit" => Some(TransactionKind::Deposit),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable transaction-log entry
///
/// `seq` is assigned by the storage backend on append and orders the log.
/// Deposits carry no sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub seq: u64,
    pub uuid: String,
    pub kind: TransactionKind,
    pub sender: Option<String>,
    pub recipient: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn involves(&self, wallet_id: &str) -> bool {
        self.recipient == wallet_id || self.sender.as_deref() == Some(wallet_id)
    }
}

/// A log entry that has been validated but not yet appended
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub uuid: String,
    pub kind: TransactionKind,
    pub sender: Option<String>,
    pub recipient: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl NewTransaction {
    pub fn deposit(wallet_id: &str, amount: Decimal) -> Self {
        NewTransaction {
            uuid: uuid::Uuid::new_v4().to_string(),
            kind: TransactionKind::Deposit,
            sender: None,
            recipient: wallet_id.to_string(),
            amount,
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn transfer(sender_id: &str, recipient_id: &str, amount: Decimal) -> Self {
        NewTransaction {
            uuid: uuid::Uuid::new_v4().to_string(),
            kind: TransactionKind::Transfer,
            sender: Some(sender_id.to_string()),
            recipient: recipient_id.to_string(),
            amount,
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn into_transaction(self, seq: u64) -> Transaction {
        Transaction {
            seq,
            uuid: self.uuid,
            kind: self.kind,
            sender: self.sender,
            recipient: self.recipient,
            amount: self.amount,
            timestamp: self.timestamp,
        }
    }
}
