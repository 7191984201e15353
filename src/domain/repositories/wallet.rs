//! Wallet ledger repository trait

use async_trait::async_trait;

use crate::domain::error::DomainResult;
use crate::domain::models::{Wallet, WalletTransaction};

/// Owns balances and the append-only transaction ledger.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn find(&self, user_id: &str) -> DomainResult<Option<Wallet>>;

    /// Wallets are auto-created with balance 0 on first access.
    async fn get_or_create(&self, user_id: &str) -> DomainResult<Wallet>;

    /// Add to the balance and append a CREDIT row. Amount must be positive
    /// (validated by the service layer).
    async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet>;

    /// Decrement the balance and append a DEBIT row, only if the current
    /// balance covers the amount.
    ///
    /// Implemented as a single conditional update, never read-then-write,
    /// so concurrent debits cannot overdraw. Returns
    /// `DomainError::InsufficientFunds` when the balance does not cover it;
    /// the balance is left untouched in that case.
    async fn debit_if_sufficient(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet>;

    /// Recent ledger entries, newest first.
    async fn transactions(
        &self,
        wallet_id: i32,
        limit: u64,
    ) -> DomainResult<Vec<WalletTransaction>>;

    /// Record a top-up order as a pending CREDIT row without touching the
    /// balance. The row id doubles as the order id handed to the client.
    async fn record_pending_topup(
        &self,
        user_id: &str,
        amount: i64,
    ) -> DomainResult<WalletTransaction>;

    /// Settle a previously recorded top-up: adds the amount to the balance
    /// and stamps the payment reference. Confirming twice is a Conflict.
    async fn confirm_topup(
        &self,
        user_id: &str,
        transaction_id: i32,
        payment_ref: &str,
    ) -> DomainResult<Wallet>;
}
