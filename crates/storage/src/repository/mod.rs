//! Persistence contracts consumed by the coaching services.
//!
//! Each table gets one trait. `postgres` implements them on a `PgPool`,
//! `memory` keeps everything behind a single async mutex for development
//! and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    Account, AccountUpdate, DescriptionPolicy, NewAccount, NewWorkout, Partnership,
    PartnershipStatus, Role, TrainerRequest, Workout, WorkoutAccess, WorkoutUpdate,
};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Role of the account, `None` when the id is unknown.
    async fn role_of(&self, id: i64) -> Result<Option<Role>>;

    async fn find_by_id(&self, id: i64) -> Result<Account>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    async fn create(&self, account: &NewAccount) -> Result<Account>;

    /// Rewrite email, name and surname. Fails with a unique violation if the
    /// email belongs to another account.
    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<Account>;

    /// Accounts with the given role ordered by surname.
    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>>;

    /// Open a transaction for removing an account and everything it owns.
    async fn begin_removal(&self) -> Result<Box<dyn AccountRemoval>>;
}

/// Transactional unit of work for account removal.
///
/// Dropping it without calling [`AccountRemoval::commit`] rolls back every
/// step already executed.
#[async_trait]
pub trait AccountRemoval: Send {
    /// Partnerships where the account is either side.
    async fn delete_partnerships(&mut self, account_id: i64) -> Result<u64>;

    /// Workouts owned by the account.
    async fn delete_workouts(&mut self, account_id: i64) -> Result<u64>;

    /// Clear the account as assigning trainer on workouts it does not own.
    async fn detach_trainer(&mut self, account_id: i64) -> Result<u64>;

    async fn delete_account(&mut self, account_id: i64) -> Result<u64>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait PartnershipRepository: Send + Sync {
    async fn find(&self, trainer_id: i64, user_id: i64) -> Result<Option<Partnership>>;

    /// Insert a row for a fresh pair. Fails with a unique violation if the
    /// pair already has a row.
    async fn insert(
        &self,
        trainer_id: i64,
        user_id: i64,
        status: PartnershipStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Partnership>;

    /// Move row `id` from `from` to `to` and set `ended_at`, only if it is
    /// still in `from`. Returns whether the row was changed.
    async fn compare_and_set(
        &self,
        id: i64,
        from: PartnershipStatus,
        to: PartnershipStatus,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    /// Approve a pending request addressed to `trainer_id` in one statement.
    async fn accept_request(&self, trainer_id: i64, request_id: i64) -> Result<Option<i64>>;

    /// Delete a pending request addressed to `trainer_id` in one statement.
    async fn delete_request(&self, trainer_id: i64, request_id: i64) -> Result<bool>;

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Partnership>>;

    async fn list_for_trainer(&self, trainer_id: i64) -> Result<Vec<Partnership>>;

    async fn pending_requests(&self, trainer_id: i64) -> Result<Vec<TrainerRequest>>;

    async fn pending_request(
        &self,
        trainer_id: i64,
        request_id: i64,
    ) -> Result<Option<TrainerRequest>>;

    /// Users with an approved partnership, ordered by surname.
    async fn approved_users(&self, trainer_id: i64) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    async fn insert(&self, workout: &NewWorkout, date: DateTime<Utc>) -> Result<Workout>;

    /// Insert a workout assigned by `trainer_id`, in the same statement that
    /// checks the pair's partnership is approved. `None` when it is not.
    async fn insert_if_partnered(
        &self,
        workout: &NewWorkout,
        trainer_id: i64,
        date: DateTime<Utc>,
    ) -> Result<Option<Workout>>;

    async fn access(&self, id: i64) -> Result<Option<WorkoutAccess>>;

    async fn find_by_id(&self, id: i64) -> Result<Workout>;

    /// Merge `update` into the stored row and write it back, with no other
    /// writer in between.
    async fn update(
        &self,
        id: i64,
        update: &WorkoutUpdate,
        policy: DescriptionPolicy,
    ) -> Result<Workout>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Workout>>;

    async fn list_for_trainer(&self, trainer_id: i64) -> Result<Vec<Workout>>;

    async fn list_for_pair(&self, trainer_id: i64, user_id: i64) -> Result<Vec<Workout>>;
}
