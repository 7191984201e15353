//! SeaORM implementation of WalletRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::domain::{
    DomainError, DomainResult, TransactionKind, Wallet, WalletTransaction,
};
use crate::infrastructure::database::entities::{wallet, wallet_transaction};

const PENDING_TOPUP: &str = "Wallet top-up (pending)";

pub struct SeaOrmWalletRepository {
    db: DatabaseConnection,
}

impl SeaOrmWalletRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(w: wallet::Model) -> Wallet {
    Wallet {
        id: w.id,
        user_id: w.user_id,
        balance: w.balance,
        created_at: w.created_at,
        updated_at: w.updated_at,
    }
}

fn txn_to_domain(t: wallet_transaction::Model) -> WalletTransaction {
    WalletTransaction {
        id: t.id,
        wallet_id: t.wallet_id,
        kind: TransactionKind::from_str(&t.kind).unwrap_or(TransactionKind::Credit),
        amount: t.amount,
        description: t.description,
        reference: t.reference,
        created_at: t.created_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

impl SeaOrmWalletRepository {
    async fn ensure_wallet(&self, user_id: &str) -> DomainResult<wallet::Model> {
        if let Some(existing) = wallet::Entity::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
        {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = wallet::ActiveModel {
            user_id: Set(user_id.to_string()),
            balance: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(inserted) => Ok(inserted),
            // a concurrent first access created it; the unique index on
            // user_id makes this safe to re-read
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                wallet::Entity::find()
                    .filter(wallet::Column::UserId.eq(user_id))
                    .one(&self.db)
                    .await
                    .map_err(db_err)?
                    .ok_or_else(|| DomainError::Database("wallet vanished after conflict".into()))
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn fetch(&self, user_id: &str) -> DomainResult<wallet::Model> {
        wallet::Entity::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::NotFound {
                entity: "Wallet",
                field: "user_id",
                value: user_id.to_string(),
            })
    }
}

#[async_trait]
impl crate::domain::WalletRepository for SeaOrmWalletRepository {
    async fn find(&self, user_id: &str) -> DomainResult<Option<Wallet>> {
        let model = wallet::Entity::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn get_or_create(&self, user_id: &str) -> DomainResult<Wallet> {
        Ok(model_to_domain(self.ensure_wallet(user_id).await?))
    }

    async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet> {
        let existing = self.ensure_wallet(user_id).await?;

        let txn = self.db.begin().await.map_err(db_err)?;
        wallet::Entity::update_many()
            .col_expr(
                wallet::Column::Balance,
                Expr::col(wallet::Column::Balance).add(amount),
            )
            .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallet::Column::Id.eq(existing.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let row = wallet_transaction::ActiveModel {
            wallet_id: Set(existing.id),
            kind: Set(TransactionKind::Credit.as_str().to_string()),
            amount: Set(amount),
            description: Set(description.to_string()),
            reference: Set(reference.map(str::to_string)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        row.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Ok(model_to_domain(self.fetch(user_id).await?))
    }

    async fn debit_if_sufficient(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet> {
        let existing = self.ensure_wallet(user_id).await?;

        let txn = self.db.begin().await.map_err(db_err)?;
        // single conditional UPDATE: the balance check and the decrement
        // are one statement, so concurrent debits cannot overdraw
        let result = wallet::Entity::update_many()
            .col_expr(
                wallet::Column::Balance,
                Expr::col(wallet::Column::Balance).sub(amount),
            )
            .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallet::Column::Id.eq(existing.id))
            .filter(wallet::Column::Balance.gte(amount))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::InsufficientFunds);
        }

        let row = wallet_transaction::ActiveModel {
            wallet_id: Set(existing.id),
            kind: Set(TransactionKind::Debit.as_str().to_string()),
            amount: Set(amount),
            description: Set(description.to_string()),
            reference: Set(reference.map(str::to_string)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        row.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Ok(model_to_domain(self.fetch(user_id).await?))
    }

    async fn transactions(
        &self,
        wallet_id: i32,
        limit: u64,
    ) -> DomainResult<Vec<WalletTransaction>> {
        let models = wallet_transaction::Entity::find()
            .filter(wallet_transaction::Column::WalletId.eq(wallet_id))
            .order_by_desc(wallet_transaction::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(txn_to_domain).collect())
    }

    async fn record_pending_topup(
        &self,
        user_id: &str,
        amount: i64,
    ) -> DomainResult<WalletTransaction> {
        let existing = self.ensure_wallet(user_id).await?;
        let row = wallet_transaction::ActiveModel {
            wallet_id: Set(existing.id),
            kind: Set(TransactionKind::Credit.as_str().to_string()),
            amount: Set(amount),
            description: Set(PENDING_TOPUP.to_string()),
            reference: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let inserted = row.insert(&self.db).await.map_err(db_err)?;
        Ok(txn_to_domain(inserted))
    }

    async fn confirm_topup(
        &self,
        user_id: &str,
        transaction_id: i32,
        payment_ref: &str,
    ) -> DomainResult<Wallet> {
        let existing = self.ensure_wallet(user_id).await?;

        let pending = wallet_transaction::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .filter(|t| t.wallet_id == existing.id)
            .ok_or(DomainError::NotFound {
                entity: "WalletTransaction",
                field: "id",
                value: transaction_id.to_string(),
            })?;

        let txn = self.db.begin().await.map_err(db_err)?;
        // conditional on the row still being pending; settling twice loses
        // the race here
        let result = wallet_transaction::Entity::update_many()
            .col_expr(
                wallet_transaction::Column::Description,
                Expr::value("Wallet top-up"),
            )
            .col_expr(
                wallet_transaction::Column::Reference,
                Expr::value(Some(payment_ref.to_string())),
            )
            .filter(wallet_transaction::Column::Id.eq(transaction_id))
            .filter(wallet_transaction::Column::Description.eq(PENDING_TOPUP))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(format!(
                "top-up {} already settled",
                transaction_id
            )));
        }

        wallet::Entity::update_many()
            .col_expr(
                wallet::Column::Balance,
                Expr::col(wallet::Column::Balance).add(pending.amount),
            )
            .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallet::Column::Id.eq(existing.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Ok(model_to_domain(self.fetch(user_id).await?))
    }
}
