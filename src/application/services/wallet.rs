//! Wallet service: credits, conditional fare debits, top-up stub

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::ports::{Notification, Notifier};
use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, Wallet, WalletTransaction,
};

/// Outcome of a fare debit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareDebit {
    Paid { new_balance: i64 },
    /// Balance did not cover the fare; nothing was deducted
    Insufficient,
}

pub struct WalletService {
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<dyn Notifier>,
    low_balance_threshold: i64,
}

impl WalletService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: Arc<dyn Notifier>,
        low_balance_threshold: i64,
    ) -> Self {
        Self {
            repos,
            notifier,
            low_balance_threshold,
        }
    }

    pub async fn get_wallet(&self, user_id: &str) -> DomainResult<Wallet> {
        self.repos.wallets().get_or_create(user_id).await
    }

    pub async fn transactions(
        &self,
        user_id: &str,
        limit: u64,
    ) -> DomainResult<Vec<WalletTransaction>> {
        let wallet = self.repos.wallets().get_or_create(user_id).await?;
        self.repos.wallets().transactions(wallet.id, limit).await
    }

    pub async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet> {
        if amount <= 0 {
            return Err(DomainError::Validation(
                "Credit amount must be positive".to_string(),
            ));
        }
        let wallet = self
            .repos
            .wallets()
            .credit(user_id, amount, description, reference)
            .await?;
        info!(user_id, amount, balance = wallet.balance, "wallet credited");
        Ok(wallet)
    }

    /// Deduct a parking fare. A zero fare trivially succeeds without
    /// touching the wallet. Insufficient funds is an expected outcome, not
    /// an error; the caller records the session as unpaid.
    pub async fn deduct_fare(
        &self,
        user_id: &str,
        fare: i64,
        session_id: &str,
    ) -> DomainResult<FareDebit> {
        if fare == 0 {
            let balance = self
                .repos
                .wallets()
                .find(user_id)
                .await?
                .map(|w| w.balance)
                .unwrap_or(0);
            return Ok(FareDebit::Paid { new_balance: balance });
        }

        match self
            .repos
            .wallets()
            .debit_if_sufficient(user_id, fare, "Parking fare", Some(session_id))
            .await
        {
            Ok(wallet) => {
                debug!(user_id, fare, balance = wallet.balance, "fare debited");
                if wallet.balance < self.low_balance_threshold {
                    self.notify_low_balance(user_id, wallet.balance);
                }
                Ok(FareDebit::Paid {
                    new_balance: wallet.balance,
                })
            }
            Err(DomainError::InsufficientFunds) => {
                info!(user_id, fare, "fare debit declined, insufficient balance");
                Ok(FareDebit::Insufficient)
            }
            Err(e) => Err(e),
        }
    }

    /// Record a top-up order without touching the balance. The gateway
    /// integration is a stub; the returned transaction id is the order id.
    pub async fn start_topup(&self, user_id: &str, amount: i64) -> DomainResult<WalletTransaction> {
        if amount <= 0 {
            return Err(DomainError::Validation(
                "Top-up amount must be positive".to_string(),
            ));
        }
        self.repos.wallets().record_pending_topup(user_id, amount).await
    }

    /// Settle a top-up order after the (stubbed) payment confirmation.
    pub async fn confirm_topup(
        &self,
        user_id: &str,
        transaction_id: i32,
        payment_ref: &str,
    ) -> DomainResult<Wallet> {
        let wallet = self
            .repos
            .wallets()
            .confirm_topup(user_id, transaction_id, payment_ref)
            .await?;
        info!(
            user_id,
            transaction_id,
            balance = wallet.balance,
            "top-up confirmed"
        );
        Ok(wallet)
    }

    fn notify_low_balance(&self, user_id: &str, balance: i64) {
        let notifier = Arc::clone(&self.notifier);
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            let delivered = notifier
                .notify(
                    &user_id,
                    Notification::new(
                        "Low wallet balance",
                        format!("Your parking wallet is down to {}. Top up to avoid unpaid exits.", balance),
                        json!({ "type": "low_balance", "balance": balance }),
                    ),
                )
                .await;
            if !delivered {
                warn!(user_id, "low-balance notification not delivered");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoopNotifier;
    use crate::infrastructure::memory::InMemoryRepositories;

    fn service(repos: Arc<InMemoryRepositories>) -> WalletService {
        WalletService::new(repos, Arc::new(NoopNotifier), 50)
    }

    #[tokio::test]
    async fn test_wallet_auto_created_with_zero_balance() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(repos);
        let wallet = svc.get_wallet("user-1").await.unwrap();
        assert_eq!(wallet.balance, 0);
    }

    #[tokio::test]
    async fn test_credit_rejects_non_positive_amount() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(repos);
        assert!(matches!(
            svc.credit("user-1", 0, "x", None).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.credit("user-1", -10, "x", None).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_debit_on_empty_wallet_is_insufficient() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(Arc::clone(&repos));
        let outcome = svc.deduct_fare("user-1", 75, "s-1").await.unwrap();
        assert_eq!(outcome, FareDebit::Insufficient);
        assert_eq!(svc.get_wallet("user-1").await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_zero_fare_succeeds_without_wallet() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(Arc::clone(&repos));
        let outcome = svc.deduct_fare("user-1", 0, "s-1").await.unwrap();
        assert_eq!(outcome, FareDebit::Paid { new_balance: 0 });
        // no wallet was created by the zero-fare path
        assert!(repos.wallets().find("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_credit_then_debit() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(repos);
        svc.credit("user-1", 500, "Wallet top-up", None).await.unwrap();
        let outcome = svc.deduct_fare("user-1", 75, "s-1").await.unwrap();
        assert_eq!(outcome, FareDebit::Paid { new_balance: 425 });

        let txns = svc.transactions("user-1", 10).await.unwrap();
        assert_eq!(txns.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = Arc::new(service(Arc::clone(&repos)));
        svc.credit("user-1", 100, "Wallet top-up", None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.deduct_fare("user-1", 60, &format!("s-{}", i)).await.unwrap()
            }));
        }
        let mut paid = 0;
        for h in handles {
            if matches!(h.await.unwrap(), FareDebit::Paid { .. }) {
                paid += 1;
            }
        }
        // only one 60-unit debit fits in a 100-unit balance
        assert_eq!(paid, 1);
        assert_eq!(svc.get_wallet("user-1").await.unwrap().balance, 40);
    }

    #[tokio::test]
    async fn test_topup_stub_round_trip() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(repos);
        let order = svc.start_topup("user-1", 300).await.unwrap();
        // pending order does not move the balance
        assert_eq!(svc.get_wallet("user-1").await.unwrap().balance, 0);

        let wallet = svc.confirm_topup("user-1", order.id, "pay-123").await.unwrap();
        assert_eq!(wallet.balance, 300);

        // settling the same order twice is a conflict
        assert!(matches!(
            svc.confirm_topup("user-1", order.id, "pay-123").await,
            Err(DomainError::Conflict(_))
        ));
    }
}
