use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{AccountRow, collect_rows};
use crate::error::{Result, StorageError};
use crate::models::{Account, AccountUpdate, NewAccount, Role};
use crate::repository::{AccountRemoval, AccountRepository};

#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn role_of(&self, id: i64) -> Result<Option<Role>> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        role.map(|r| r.parse()).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, name, surname, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        row.try_into()
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create(&self, account: &NewAccount) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (email, role, name, surname)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, role, name, surname, created_at
            "#,
        )
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(&account.name)
        .bind(&account.surname)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET email = $2, name = $3, surname = $4
            WHERE id = $1
            RETURNING id, email, role, name, surname, created_at
            "#,
        )
        .bind(id)
        .bind(&update.email)
        .bind(&update.name)
        .bind(&update.surname)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        row.try_into()
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, name, surname, created_at
            FROM accounts
            WHERE role = $1
            ORDER BY surname, id
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        collect_rows(rows)
    }

    async fn begin_removal(&self) -> Result<Box<dyn AccountRemoval>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresAccountRemoval { tx }))
    }
}

/// Account removal running inside one database transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PostgresAccountRemoval {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccountRemoval for PostgresAccountRemoval {
    async fn delete_partnerships(&mut self, account_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM partnerships WHERE user_id = $1 OR trainer_id = $1")
            .bind(account_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_workouts(&mut self, account_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM workouts WHERE user_id = $1")
            .bind(account_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn detach_trainer(&mut self, account_id: i64) -> Result<u64> {
        let result = sqlx::query("UPDATE workouts SET trainer_id = NULL WHERE trainer_id = $1")
            .bind(account_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_account(&mut self, account_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
