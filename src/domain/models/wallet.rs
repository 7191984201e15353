//! Wallet and wallet transaction entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a wallet transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "CREDIT",
            TransactionKind::Debit => "DEBIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREDIT" => Some(TransactionKind::Credit),
            "DEBIT" => Some(TransactionKind::Debit),
            _ => None,
        }
    }
}

/// Per-user balance in smallest currency unit.
///
/// Invariant: balance never goes negative; debits are conditional atomic
/// updates, never read-then-write. Auto-created with balance 0 on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i32,
    pub user_id: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only ledger entry attached to a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: i32,
    pub wallet_id: i32,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    /// External reference, e.g. a session id or a payment order id
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}
