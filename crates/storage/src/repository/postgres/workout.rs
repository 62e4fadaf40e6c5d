use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::WorkoutRow;
use crate::error::{Result, StorageError};
use crate::models::{DescriptionPolicy, NewWorkout, Workout, WorkoutAccess, WorkoutUpdate};
use crate::repository::WorkoutRepository;

#[derive(Clone)]
pub struct PostgresWorkoutRepository {
    pool: PgPool,
}

impl PostgresWorkoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkoutRepository for PostgresWorkoutRepository {
    async fn insert(&self, workout: &NewWorkout, date: DateTime<Utc>) -> Result<Workout> {
        let row = sqlx::query_as::<_, WorkoutRow>(
            r#"
            INSERT INTO workouts (title, user_id, trainer_id, description, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, user_id, trainer_id, description, date
            "#,
        )
        .bind(&workout.title)
        .bind(workout.user_id)
        .bind(workout.trainer_id)
        .bind(workout.description.as_deref().unwrap_or_default())
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn insert_if_partnered(
        &self,
        workout: &NewWorkout,
        trainer_id: i64,
        date: DateTime<Utc>,
    ) -> Result<Option<Workout>> {
        let row = sqlx::query_as::<_, WorkoutRow>(
            r#"
            INSERT INTO workouts (title, user_id, trainer_id, description, date)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (
                SELECT 1 FROM partnerships
                WHERE trainer_id = $3 AND user_id = $2 AND status = 'approved'
            )
            RETURNING id, title, user_id, trainer_id, description, date
            "#,
        )
        .bind(&workout.title)
        .bind(workout.user_id)
        .bind(trainer_id)
        .bind(workout.description.as_deref().unwrap_or_default())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workout::from))
    }

    async fn access(&self, id: i64) -> Result<Option<WorkoutAccess>> {
        let row: Option<(i64, Option<i64>)> =
            sqlx::query_as("SELECT user_id, trainer_id FROM workouts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(user_id, trainer_id)| WorkoutAccess {
            user_id,
            trainer_id,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Workout> {
        let row = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, title, user_id, trainer_id, description, date
            FROM workouts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: i64,
        update: &WorkoutUpdate,
        policy: DescriptionPolicy,
    ) -> Result<Workout> {
        let mut tx = self.pool.begin().await?;

        let existing: Workout = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, title, user_id, trainer_id, description, date
            FROM workouts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::NotFound)?
        .into();

        let changes = existing.merge(update, policy);
        let row = sqlx::query_as::<_, WorkoutRow>(
            r#"
            UPDATE workouts
            SET title = $2, description = $3, date = $4
            WHERE id = $1
            RETURNING id, title, user_id, trainer_id, description, date
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Workout>> {
        let rows = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, title, user_id, trainer_id, description, date
            FROM workouts
            WHERE user_id = $1
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Workout::from).collect())
    }

    async fn list_for_trainer(&self, trainer_id: i64) -> Result<Vec<Workout>> {
        let rows = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, title, user_id, trainer_id, description, date
            FROM workouts
            WHERE trainer_id = $1
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Workout::from).collect())
    }

    async fn list_for_pair(&self, trainer_id: i64, user_id: i64) -> Result<Vec<Workout>> {
        let rows = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, title, user_id, trainer_id, description, date
            FROM workouts
            WHERE trainer_id = $1 AND user_id = $2
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(trainer_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Workout::from).collect())
    }
}
