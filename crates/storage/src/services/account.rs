use std::sync::Arc;

use crate::dto::account::AccountOverview;
use crate::error::{CoachingError, CoachingResult};
use crate::models::{Account, AccountUpdate, NewAccount, Role};
use crate::repository::{AccountRepository, PartnershipRepository, WorkoutRepository};

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    partnerships: Arc<dyn PartnershipRepository>,
    workouts: Arc<dyn WorkoutRepository>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        partnerships: Arc<dyn PartnershipRepository>,
        workouts: Arc<dyn WorkoutRepository>,
    ) -> Self {
        Self {
            accounts,
            partnerships,
            workouts,
        }
    }

    pub async fn create_account(&self, account: NewAccount) -> CoachingResult<Account> {
        if self.accounts.email_exists(&account.email).await? {
            return Err(CoachingError::EmailTaken(account.email));
        }

        let created = match self.accounts.create(&account).await {
            Ok(created) => created,
            Err(e) if e.is_unique_violation() => {
                return Err(CoachingError::EmailTaken(account.email));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(account_id = created.id, role = %created.role, "Account created");
        Ok(created)
    }

    /// Change an account's email and names. The role stays as created.
    pub async fn update_account(&self, id: i64, update: AccountUpdate) -> CoachingResult<Account> {
        let existing = self.accounts.find_by_id(id).await?;

        if existing.email != update.email && self.accounts.email_exists(&update.email).await? {
            return Err(CoachingError::EmailTaken(update.email));
        }

        let updated = match self.accounts.update(id, &update).await {
            Ok(updated) => updated,
            Err(e) if e.is_unique_violation() => {
                return Err(CoachingError::EmailTaken(update.email));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(account_id = id, "Account updated");
        Ok(updated)
    }

    pub async fn account_by_id(&self, id: i64) -> CoachingResult<Account> {
        Ok(self.accounts.find_by_id(id).await?)
    }

    pub async fn accounts_by_role(&self, role: Role) -> CoachingResult<Vec<Account>> {
        Ok(self.accounts.list_by_role(role).await?)
    }

    pub async fn trainers(&self) -> CoachingResult<Vec<Account>> {
        self.accounts_by_role(Role::Trainer).await
    }

    /// A trainer's public profile; any other account reads as missing.
    pub async fn trainer_by_id(&self, id: i64) -> CoachingResult<Account> {
        let account = self.accounts.find_by_id(id).await?;
        if account.role != Role::Trainer {
            return Err(CoachingError::NotFound);
        }
        Ok(account)
    }

    /// Account together with its partnerships and workouts, seen from its own side.
    pub async fn account_overview(&self, id: i64) -> CoachingResult<AccountOverview> {
        let account = self.accounts.find_by_id(id).await?;

        let (partnerships, workouts) = match account.role {
            Role::User => (
                self.partnerships.list_for_user(id).await?,
                self.workouts.list_for_user(id).await?,
            ),
            Role::Trainer => (
                self.partnerships.list_for_trainer(id).await?,
                self.workouts.list_for_trainer(id).await?,
            ),
        };

        Ok(AccountOverview {
            account,
            partnerships,
            workouts,
        })
    }

    /// Remove an account with its partnerships and workouts, all or nothing.
    pub async fn delete_account(&self, id: i64) -> CoachingResult<()> {
        self.accounts.find_by_id(id).await?;

        let mut removal = self.accounts.begin_removal().await?;
        let partnerships = removal.delete_partnerships(id).await?;
        let workouts = removal.delete_workouts(id).await?;
        let detached = removal.detach_trainer(id).await?;
        if removal.delete_account(id).await? == 0 {
            return Err(CoachingError::NotFound);
        }
        removal.commit().await?;

        tracing::info!(
            account_id = id,
            partnerships,
            workouts,
            detached,
            "Account deleted"
        );
        Ok(())
    }
}
