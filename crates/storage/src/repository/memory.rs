//! In-memory backend used for development and tests.
//!
//! All tables live behind one `tokio::sync::Mutex`, so every repository call
//! is atomic with respect to every other. An account removal holds the lock
//! for its whole lifetime and restores the snapshot taken at `begin_removal`
//! unless it is committed.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StorageError};
use crate::models::{
    Account, AccountUpdate, DescriptionPolicy, NewAccount, NewWorkout, Partnership,
    PartnershipStatus, Role, TrainerRequest, Workout, WorkoutAccess, WorkoutUpdate,
};
use crate::repository::{
    AccountRemoval, AccountRepository, PartnershipRepository, WorkoutRepository,
};

/// Steps of an account removal that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStep {
    Partnerships,
    Workouts,
    DetachTrainer,
    Account,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
    partnerships: BTreeMap<i64, Partnership>,
    workouts: BTreeMap<i64, Workout>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_workout(&mut self, workout: &NewWorkout, date: DateTime<Utc>) -> Workout {
        let id = self.next_id();
        let stored = Workout {
            id,
            title: workout.title.clone(),
            user_id: workout.user_id,
            trainer_id: workout.trainer_id,
            description: workout.description.clone().unwrap_or_default(),
            date,
        };
        self.workouts.insert(id, stored.clone());
        stored
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    failing_step: Arc<StdMutex<Option<RemovalStep>>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Store that stamps `created_at` on new accounts from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            failing_step: Arc::new(StdMutex::new(None)),
            clock,
        }
    }

    /// Make the next account removal fail when it reaches `step`.
    pub fn fail_removal_at(&self, step: RemovalStep) {
        *self.failing_step.lock().unwrap_or_else(|e| e.into_inner()) = Some(step);
    }

    fn take_failing_step(&self) -> Option<RemovalStep> {
        self.failing_step
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

fn sort_workouts(mut workouts: Vec<Workout>) -> Vec<Workout> {
    workouts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    workouts
}

fn sort_partnerships(mut partnerships: Vec<Partnership>) -> Vec<Partnership> {
    partnerships.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    partnerships
}

fn to_request(p: &Partnership, user: &Account) -> TrainerRequest {
    TrainerRequest {
        request_id: p.id,
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        surname: user.surname.clone(),
        sent_at: p.created_at,
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn role_of(&self, id: i64) -> Result<Option<Role>> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.get(&id).map(|a| a.role))
    }

    async fn find_by_id(&self, id: i64) -> Result<Account> {
        let tables = self.tables.lock().await;
        tables.accounts.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.values().any(|a| a.email == email))
    }

    async fn create(&self, account: &NewAccount) -> Result<Account> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(StorageError::ConstraintViolation(format!(
                "email {} already exists",
                account.email
            )));
        }

        let id = tables.next_id();
        let created = Account {
            id,
            email: account.email.clone(),
            role: account.role,
            name: account.name.clone(),
            surname: account.surname.clone(),
            created_at: self.clock.now(),
        };
        tables.accounts.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<Account> {
        let mut tables = self.tables.lock().await;
        if !tables.accounts.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if tables
            .accounts
            .values()
            .any(|a| a.id != id && a.email == update.email)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "email {} already exists",
                update.email
            )));
        }

        let account = tables.accounts.get_mut(&id).ok_or(StorageError::NotFound)?;
        account.email = update.email.clone();
        account.name = update.name.clone();
        account.surname = update.surname.clone();
        Ok(account.clone())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>> {
        let tables = self.tables.lock().await;
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.surname.cmp(&b.surname).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn begin_removal(&self) -> Result<Box<dyn AccountRemoval>> {
        let guard = self.tables.clone().lock_owned().await;
        let snapshot = (*guard).clone();
        Ok(Box::new(MemoryAccountRemoval {
            guard,
            snapshot: Some(snapshot),
            failing_step: self.take_failing_step(),
        }))
    }
}

pub struct MemoryAccountRemoval {
    guard: OwnedMutexGuard<Tables>,
    snapshot: Option<Tables>,
    failing_step: Option<RemovalStep>,
}

impl MemoryAccountRemoval {
    fn check(&self, step: RemovalStep) -> Result<()> {
        if self.failing_step == Some(step) {
            return Err(StorageError::Backend(format!("injected failure at {step:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRemoval for MemoryAccountRemoval {
    async fn delete_partnerships(&mut self, account_id: i64) -> Result<u64> {
        self.check(RemovalStep::Partnerships)?;
        let before = self.guard.partnerships.len();
        self.guard
            .partnerships
            .retain(|_, p| p.user_id != account_id && p.trainer_id != account_id);
        Ok((before - self.guard.partnerships.len()) as u64)
    }

    async fn delete_workouts(&mut self, account_id: i64) -> Result<u64> {
        self.check(RemovalStep::Workouts)?;
        let before = self.guard.workouts.len();
        self.guard.workouts.retain(|_, w| w.user_id != account_id);
        Ok((before - self.guard.workouts.len()) as u64)
    }

    async fn detach_trainer(&mut self, account_id: i64) -> Result<u64> {
        self.check(RemovalStep::DetachTrainer)?;
        let mut detached = 0;
        for workout in self.guard.workouts.values_mut() {
            if workout.trainer_id == Some(account_id) {
                workout.trainer_id = None;
                detached += 1;
            }
        }
        Ok(detached)
    }

    async fn delete_account(&mut self, account_id: i64) -> Result<u64> {
        self.check(RemovalStep::Account)?;
        Ok(u64::from(self.guard.accounts.remove(&account_id).is_some()))
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }
}

impl Drop for MemoryAccountRemoval {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait]
impl PartnershipRepository for MemoryStore {
    async fn find(&self, trainer_id: i64, user_id: i64) -> Result<Option<Partnership>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .partnerships
            .values()
            .find(|p| p.trainer_id == trainer_id && p.user_id == user_id)
            .cloned())
    }

    async fn insert(
        &self,
        trainer_id: i64,
        user_id: i64,
        status: PartnershipStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Partnership> {
        let mut tables = self.tables.lock().await;
        if tables
            .partnerships
            .values()
            .any(|p| p.trainer_id == trainer_id && p.user_id == user_id)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "partnership ({trainer_id}, {user_id}) already exists"
            )));
        }

        let id = tables.next_id();
        let partnership = Partnership {
            id,
            user_id,
            trainer_id,
            status,
            created_at,
            ended_at: None,
        };
        tables.partnerships.insert(id, partnership.clone());
        Ok(partnership)
    }

    async fn compare_and_set(
        &self,
        id: i64,
        from: PartnershipStatus,
        to: PartnershipStatus,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.partnerships.get_mut(&id) {
            Some(p) if p.status == from => {
                p.status = to;
                p.ended_at = ended_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn accept_request(&self, trainer_id: i64, request_id: i64) -> Result<Option<i64>> {
        let mut tables = self.tables.lock().await;
        match tables.partnerships.get_mut(&request_id) {
            Some(p) if p.trainer_id == trainer_id && p.status == PartnershipStatus::Request => {
                p.status = PartnershipStatus::Approved;
                p.ended_at = None;
                Ok(Some(p.id))
            }
            _ => Ok(None),
        }
    }

    async fn delete_request(&self, trainer_id: i64, request_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let pending = tables.partnerships.get(&request_id).is_some_and(|p| {
            p.trainer_id == trainer_id && p.status == PartnershipStatus::Request
        });
        if pending {
            tables.partnerships.remove(&request_id);
        }
        Ok(pending)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Partnership>> {
        let tables = self.tables.lock().await;
        Ok(sort_partnerships(
            tables
                .partnerships
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_trainer(&self, trainer_id: i64) -> Result<Vec<Partnership>> {
        let tables = self.tables.lock().await;
        Ok(sort_partnerships(
            tables
                .partnerships
                .values()
                .filter(|p| p.trainer_id == trainer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn pending_requests(&self, trainer_id: i64) -> Result<Vec<TrainerRequest>> {
        let tables = self.tables.lock().await;
        let pending = sort_partnerships(
            tables
                .partnerships
                .values()
                .filter(|p| p.trainer_id == trainer_id && p.status == PartnershipStatus::Request)
                .cloned()
                .collect(),
        );
        Ok(pending
            .iter()
            .filter_map(|p| tables.accounts.get(&p.user_id).map(|u| to_request(p, u)))
            .collect())
    }

    async fn pending_request(
        &self,
        trainer_id: i64,
        request_id: i64,
    ) -> Result<Option<TrainerRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .partnerships
            .get(&request_id)
            .filter(|p| p.trainer_id == trainer_id && p.status == PartnershipStatus::Request)
            .and_then(|p| tables.accounts.get(&p.user_id).map(|u| to_request(p, u))))
    }

    async fn approved_users(&self, trainer_id: i64) -> Result<Vec<Account>> {
        let tables = self.tables.lock().await;
        let mut users: Vec<Account> = tables
            .partnerships
            .values()
            .filter(|p| p.trainer_id == trainer_id && p.status == PartnershipStatus::Approved)
            .filter_map(|p| tables.accounts.get(&p.user_id).cloned())
            .collect();
        users.sort_by(|a, b| a.surname.cmp(&b.surname).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl WorkoutRepository for MemoryStore {
    async fn insert(&self, workout: &NewWorkout, date: DateTime<Utc>) -> Result<Workout> {
        let mut tables = self.tables.lock().await;
        Ok(tables.insert_workout(workout, date))
    }

    async fn insert_if_partnered(
        &self,
        workout: &NewWorkout,
        trainer_id: i64,
        date: DateTime<Utc>,
    ) -> Result<Option<Workout>> {
        let mut tables = self.tables.lock().await;
        let approved = tables.partnerships.values().any(|p| {
            p.trainer_id == trainer_id
                && p.user_id == workout.user_id
                && p.status == PartnershipStatus::Approved
        });
        if !approved {
            return Ok(None);
        }

        let assigned = NewWorkout {
            trainer_id: Some(trainer_id),
            ..workout.clone()
        };
        Ok(Some(tables.insert_workout(&assigned, date)))
    }

    async fn access(&self, id: i64) -> Result<Option<WorkoutAccess>> {
        let tables = self.tables.lock().await;
        Ok(tables.workouts.get(&id).map(|w| WorkoutAccess {
            user_id: w.user_id,
            trainer_id: w.trainer_id,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Workout> {
        let tables = self.tables.lock().await;
        tables.workouts.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn update(
        &self,
        id: i64,
        update: &WorkoutUpdate,
        policy: DescriptionPolicy,
    ) -> Result<Workout> {
        let mut tables = self.tables.lock().await;
        let workout = tables.workouts.get_mut(&id).ok_or(StorageError::NotFound)?;
        let changes = workout.merge(update, policy);
        workout.title = changes.title;
        workout.description = changes.description;
        workout.date = changes.date;
        Ok(workout.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables
            .workouts
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Workout>> {
        let tables = self.tables.lock().await;
        Ok(sort_workouts(
            tables
                .workouts
                .values()
                .filter(|w| w.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_trainer(&self, trainer_id: i64) -> Result<Vec<Workout>> {
        let tables = self.tables.lock().await;
        Ok(sort_workouts(
            tables
                .workouts
                .values()
                .filter(|w| w.trainer_id == Some(trainer_id))
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_pair(&self, trainer_id: i64, user_id: i64) -> Result<Vec<Workout>> {
        let tables = self.tables.lock().await;
        Ok(sort_workouts(
            tables
                .workouts
                .values()
                .filter(|w| w.trainer_id == Some(trainer_id) && w.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }
}
