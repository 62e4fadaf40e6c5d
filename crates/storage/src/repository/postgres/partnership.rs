use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AccountRow, PartnershipRow, TrainerRequestRow, collect_rows};
use crate::error::Result;
use crate::models::{Account, Partnership, PartnershipStatus, TrainerRequest};
use crate::repository::PartnershipRepository;

#[derive(Clone)]
pub struct PostgresPartnershipRepository {
    pool: PgPool,
}

impl PostgresPartnershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PartnershipRepository for PostgresPartnershipRepository {
    async fn find(&self, trainer_id: i64, user_id: i64) -> Result<Option<Partnership>> {
        let row = sqlx::query_as::<_, PartnershipRow>(
            r#"
            SELECT id, user_id, trainer_id, status, created_at, ended_at
            FROM partnerships
            WHERE trainer_id = $1 AND user_id = $2
            "#,
        )
        .bind(trainer_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Partnership::try_from).transpose()
    }

    async fn insert(
        &self,
        trainer_id: i64,
        user_id: i64,
        status: PartnershipStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Partnership> {
        let row = sqlx::query_as::<_, PartnershipRow>(
            r#"
            INSERT INTO partnerships (trainer_id, user_id, status, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, trainer_id, status, created_at, ended_at
            "#,
        )
        .bind(trainer_id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn compare_and_set(
        &self,
        id: i64,
        from: PartnershipStatus,
        to: PartnershipStatus,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE partnerships
            SET status = $3, ended_at = $4
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(ended_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn accept_request(&self, trainer_id: i64, request_id: i64) -> Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE partnerships
            SET status = 'approved', ended_at = NULL
            WHERE id = $2 AND trainer_id = $1 AND status = 'request'
            RETURNING id
            "#,
        )
        .bind(trainer_id)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn delete_request(&self, trainer_id: i64, request_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM partnerships WHERE id = $2 AND trainer_id = $1 AND status = 'request'",
        )
        .bind(trainer_id)
        .bind(request_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Partnership>> {
        let rows = sqlx::query_as::<_, PartnershipRow>(
            r#"
            SELECT id, user_id, trainer_id, status, created_at, ended_at
            FROM partnerships
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        collect_rows(rows)
    }

    async fn list_for_trainer(&self, trainer_id: i64) -> Result<Vec<Partnership>> {
        let rows = sqlx::query_as::<_, PartnershipRow>(
            r#"
            SELECT id, user_id, trainer_id, status, created_at, ended_at
            FROM partnerships
            WHERE trainer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await?;

        collect_rows(rows)
    }

    async fn pending_requests(&self, trainer_id: i64) -> Result<Vec<TrainerRequest>> {
        let rows = sqlx::query_as::<_, TrainerRequestRow>(
            r#"
            SELECT p.id AS request_id, a.id AS user_id, a.email, a.name, a.surname,
                   p.created_at AS sent_at
            FROM partnerships p
            JOIN accounts a ON a.id = p.user_id
            WHERE p.trainer_id = $1 AND p.status = 'request'
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrainerRequest::from).collect())
    }

    async fn pending_request(
        &self,
        trainer_id: i64,
        request_id: i64,
    ) -> Result<Option<TrainerRequest>> {
        let row = sqlx::query_as::<_, TrainerRequestRow>(
            r#"
            SELECT p.id AS request_id, a.id AS user_id, a.email, a.name, a.surname,
                   p.created_at AS sent_at
            FROM partnerships p
            JOIN accounts a ON a.id = p.user_id
            WHERE p.id = $2 AND p.trainer_id = $1 AND p.status = 'request'
            "#,
        )
        .bind(trainer_id)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TrainerRequest::from))
    }

    async fn approved_users(&self, trainer_id: i64) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT a.id, a.email, a.role, a.name, a.surname, a.created_at
            FROM accounts a
            JOIN partnerships p ON p.user_id = a.id
            WHERE p.trainer_id = $1 AND p.status = 'approved'
            ORDER BY a.surname, a.id
            "#,
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await?;

        collect_rows(rows)
    }
}
