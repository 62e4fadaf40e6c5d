use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::error::StorageError;
use crate::models::{Account, Partnership, TrainerRequest, Workout};

mod account;
mod partnership;
mod workout;

pub use account::{PostgresAccountRemoval, PostgresAccountRepository};
pub use partnership::PostgresPartnershipRepository;
pub use workout::PostgresWorkoutRepository;

#[derive(Debug, FromRow)]
pub(crate) struct AccountRow {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub name: String,
    pub surname: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StorageError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            role: row.role.parse()?,
            name: row.name,
            surname: row.surname,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PartnershipRow {
    pub id: i64,
    pub user_id: i64,
    pub trainer_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TryFrom<PartnershipRow> for Partnership {
    type Error = StorageError;

    fn try_from(row: PartnershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            trainer_id: row.trainer_id,
            status: row.status.parse()?,
            created_at: row.created_at,
            ended_at: row.ended_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TrainerRequestRow {
    pub request_id: i64,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub sent_at: DateTime<Utc>,
}

impl From<TrainerRequestRow> for TrainerRequest {
    fn from(row: TrainerRequestRow) -> Self {
        Self {
            request_id: row.request_id,
            user_id: row.user_id,
            email: row.email,
            name: row.name,
            surname: row.surname,
            sent_at: row.sent_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct WorkoutRow {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub trainer_id: Option<i64>,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl From<WorkoutRow> for Workout {
    fn from(row: WorkoutRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            user_id: row.user_id,
            trainer_id: row.trainer_id,
            description: row.description,
            date: row.date,
        }
    }
}

pub(crate) fn collect_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, StorageError>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}
