//! Partner wallets, their transaction ledger and withdrawal requests.
//!
//! Balance changes and the matching ledger row are written in one
//! transaction. Debits are conditional on the balance covering them, so a
//! wallet can never go negative.

use crate::error::DbError;
use crate::repositories::status::{TransactionKind, WithdrawalStatus};
use crate::rows::{self, new_id, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info, warn};

const INSUFFICIENT_BALANCE: &str = "Insufficient wallet balance";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub owner_id: String,
    pub balance: f64,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            balance: row.try_get("balance")?,
            updated_at: rows::timestamp(row, "updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    pub wallet_id: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            wallet_id: row.try_get("wallet_id")?,
            amount: row.try_get("amount")?,
            kind: rows::status(row, "kind")?,
            description: rows::optional(row, "description")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: String,
    pub wallet_id: String,
    pub owner_id: String,
    pub amount: f64,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WithdrawalRequest {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            wallet_id: row.try_get("wallet_id")?,
            owner_id: row.try_get("owner_id")?,
            amount: row.try_get("amount")?,
            status: rows::status(row, "status")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::timestamp(row, "updated_at")?,
        })
    }
}

const WITHDRAWAL_COLUMNS: &str = "id, wallet_id, owner_id, amount, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqlWalletRepository {
    db_client: DbClient,
}

impl SqlWalletRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Wallet>, DbError> {
        let row = sqlx::query("SELECT id, owner_id, balance, updated_at FROM wallets WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find wallet"))?;
        Ok(row.as_ref().map(Wallet::from_row).transpose()?)
    }

    /// The owner's wallet, opened with a zero balance on first access.
    pub async fn find_or_create(&self, owner_id: &str) -> Result<Wallet, DbError> {
        if let Some(wallet) = self.find_by_owner(owner_id).await? {
            return Ok(wallet);
        }

        debug!("Opening wallet for {}", owner_id);
        let wallet = Wallet {
            id: new_id(),
            owner_id: owner_id.to_string(),
            balance: 0.0,
            updated_at: Utc::now(),
        };
        sqlx::query("INSERT INTO wallets (id, owner_id, balance, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(&wallet.id)
            .bind(&wallet.owner_id)
            .bind(wallet.balance)
            .bind(to_db_timestamp(&wallet.updated_at))
            .execute(self.db_client.pool())
            .await
            .map_err(query_failed("insert wallet"))?;

        info!("Wallet {} opened for {}", wallet.id, owner_id);
        Ok(wallet)
    }

    /// Adds `amount` to the owner's wallet and records a credit.
    pub async fn credit(
        &self,
        owner_id: &str,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Wallet, DbError> {
        let wallet = self.find_or_create(owner_id).await?;
        let now = to_db_timestamp(&Utc::now());

        let mut tx = self
            .db_client
            .pool()
            .begin()
            .await
            .map_err(query_failed("begin wallet credit"))?;

        sqlx::query("UPDATE wallets SET balance = balance + $1, updated_at = $2 WHERE id = $3")
            .bind(amount)
            .bind(&now)
            .bind(&wallet.id)
            .execute(&mut *tx)
            .await
            .map_err(query_failed("credit wallet"))?;
        Self::record_transaction(&mut tx, &wallet.id, amount, TransactionKind::Credit, description, &now)
            .await?;

        tx.commit().await.map_err(query_failed("commit wallet credit"))?;
        info!("Wallet {} credited with {}", wallet.id, amount);

        self.find_by_owner(owner_id)
            .await?
            .ok_or_else(|| DbError::NotFound("Wallet".to_string()))
    }

    async fn record_transaction(
        tx: &mut sqlx::Transaction<'_, sqlx::Any>,
        wallet_id: &str,
        amount: f64,
        kind: TransactionKind,
        description: Option<&str>,
        created_at: &str,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (id, wallet_id, amount, kind, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(new_id())
        .bind(wallet_id)
        .bind(amount)
        .bind(kind.as_str())
        .bind(description)
        .bind(created_at)
        .execute(&mut **tx)
        .await
        .map_err(query_failed("insert wallet transaction"))?;
        Ok(())
    }

    pub async fn list_transactions(
        &self,
        wallet_id: &str,
    ) -> Result<Vec<WalletTransaction>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, wallet_id, amount, kind, description, created_at
            FROM wallet_transactions
            WHERE wallet_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(wallet_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_failed("list wallet transactions"))?;
        rows::decode_all(rows, WalletTransaction::from_row)
    }

    /// Files a pending withdrawal. The amount must be covered by the current
    /// balance; the balance itself only moves on approval.
    pub async fn create_withdrawal(
        &self,
        owner_id: &str,
        amount: f64,
    ) -> Result<WithdrawalRequest, DbError> {
        let wallet = self.find_or_create(owner_id).await?;
        if amount > wallet.balance {
            warn!(
                "Withdrawal of {} refused for {}: balance is {}",
                amount, owner_id, wallet.balance
            );
            return Err(DbError::Constraint(INSUFFICIENT_BALANCE.to_string()));
        }

        let now = Utc::now();
        let request = WithdrawalRequest {
            id: new_id(),
            wallet_id: wallet.id,
            owner_id: owner_id.to_string(),
            amount,
            status: WithdrawalStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            r#"
            INSERT INTO withdrawal_requests (id, wallet_id, owner_id, amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&request.id)
        .bind(&request.wallet_id)
        .bind(&request.owner_id)
        .bind(request.amount)
        .bind(request.status.as_str())
        .bind(to_db_timestamp(&request.created_at))
        .bind(to_db_timestamp(&request.updated_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert withdrawal request"))?;

        info!("Withdrawal {} of {} requested by {}", request.id, amount, owner_id);
        Ok(request)
    }

    pub async fn find_withdrawal(&self, id: &str) -> Result<Option<WithdrawalRequest>, DbError> {
        let query = format!("SELECT {WITHDRAWAL_COLUMNS} FROM withdrawal_requests WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find withdrawal request"))?;
        Ok(row.as_ref().map(WithdrawalRequest::from_row).transpose()?)
    }

    pub async fn list_withdrawals_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<WithdrawalRequest>, DbError> {
        let query = format!(
            "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawal_requests WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list withdrawal requests"))?;
        rows::decode_all(rows, WithdrawalRequest::from_row)
    }

    /// Moves a withdrawal to `status`. `approved` is terminal: approving
    /// debits the wallet and records a debit exactly once, re-approving is a
    /// no-op, and any other move out of `approved` is a `Constraint`. If the
    /// balance no longer covers the amount nothing is written and
    /// `Constraint` is returned.
    pub async fn update_withdrawal_status(
        &self,
        id: &str,
        status: WithdrawalStatus,
    ) -> Result<WithdrawalRequest, DbError> {
        let request = self
            .find_withdrawal(id)
            .await?
            .ok_or_else(|| DbError::NotFound("Withdrawal request".to_string()))?;
        let now = to_db_timestamp(&Utc::now());

        let mut tx = self
            .db_client
            .pool()
            .begin()
            .await
            .map_err(query_failed("begin withdrawal update"))?;

        let moved = sqlx::query(
            r#"
            UPDATE withdrawal_requests
            SET status = $1, updated_at = $2
            WHERE id = $3 AND status <> $4
            "#,
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(id)
        .bind(WithdrawalStatus::Approved.as_str())
        .execute(&mut *tx)
        .await
        .map_err(query_failed("update withdrawal request"))?;

        if moved.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(query_failed("roll back withdrawal update"))?;
            if status == WithdrawalStatus::Approved {
                debug!("Withdrawal {} already approved", id);
                return self
                    .find_withdrawal(id)
                    .await?
                    .ok_or_else(|| DbError::NotFound("Withdrawal request".to_string()));
            }
            warn!("Withdrawal {} is approved and cannot move to {}", id, status);
            return Err(DbError::Constraint(
                "Approved withdrawals cannot change status".to_string(),
            ));
        }

        if status == WithdrawalStatus::Approved {
            let debited = sqlx::query(
                r#"
                UPDATE wallets
                SET balance = balance - $1, updated_at = $2
                WHERE id = $3 AND balance >= $4
                "#,
            )
            .bind(request.amount)
            .bind(&now)
            .bind(&request.wallet_id)
            .bind(request.amount)
            .execute(&mut *tx)
            .await
            .map_err(query_failed("debit wallet"))?;

            if debited.rows_affected() == 0 {
                warn!("Withdrawal {} not approved: insufficient balance", id);
                tx.rollback()
                    .await
                    .map_err(query_failed("roll back withdrawal update"))?;
                return Err(DbError::Constraint(INSUFFICIENT_BALANCE.to_string()));
            }

            let description = format!("Withdrawal {id}");
            Self::record_transaction(
                &mut tx,
                &request.wallet_id,
                request.amount,
                TransactionKind::Debit,
                Some(&description),
                &now,
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(query_failed("commit withdrawal update"))?;
        info!("Withdrawal {} moved to {}", id, status);

        self.find_withdrawal(id)
            .await?
            .ok_or_else(|| DbError::NotFound("Withdrawal request".to_string()))
    }

    pub async fn count_pending_withdrawals(&self) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM withdrawal_requests WHERE status = $1")
            .bind(WithdrawalStatus::Pending.as_str())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_failed("count pending withdrawals"))?;
        Ok(row.try_get("n")?)
    }
}
