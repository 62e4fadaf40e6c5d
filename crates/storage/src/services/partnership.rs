use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{CoachingError, CoachingResult};
use crate::models::partnership::{plan_end, plan_trainer_init, plan_user_request};
use crate::models::{Account, Partnership, PartnershipStatus, Role, Step, TrainerRequest};
use crate::repository::{AccountRepository, PartnershipRepository};

/// Re-reads allowed when a compare-and-set loses to a concurrent writer.
const MAX_ATTEMPTS: usize = 3;

/// Lifecycle of the trainer-user partnership.
///
/// Every transition is keyed by the (trainer, user) pair and applied with a
/// conditional statement, so two concurrent callers can never both move the
/// same row out of the same status.
#[derive(Clone)]
pub struct PartnershipService {
    accounts: Arc<dyn AccountRepository>,
    partnerships: Arc<dyn PartnershipRepository>,
    clock: Arc<dyn Clock>,
}

impl PartnershipService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        partnerships: Arc<dyn PartnershipRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            partnerships,
            clock,
        }
    }

    /// User asks `trainer_id` to become their trainer.
    pub async fn send_request_to_trainer(
        &self,
        trainer_id: i64,
        user_id: i64,
    ) -> CoachingResult<i64> {
        self.ensure_role(trainer_id, Role::Trainer).await?;
        self.drive(trainer_id, user_id, plan_user_request).await
    }

    /// Trainer takes `user_id` on directly, without a pending request.
    pub async fn init_partnership_with_user(
        &self,
        trainer_id: i64,
        user_id: i64,
    ) -> CoachingResult<i64> {
        self.ensure_role(user_id, Role::User).await?;
        self.drive(trainer_id, user_id, plan_trainer_init).await
    }

    /// Approve a pending request addressed to `trainer_id`.
    pub async fn accept_request(&self, trainer_id: i64, request_id: i64) -> CoachingResult<i64> {
        let id = self
            .partnerships
            .accept_request(trainer_id, request_id)
            .await?
            .ok_or(CoachingError::NoSuchRequest)?;

        tracing::info!(partnership_id = id, trainer_id, "Request accepted");
        Ok(id)
    }

    /// Remove a pending request addressed to `trainer_id`.
    pub async fn deny_request(&self, trainer_id: i64, request_id: i64) -> CoachingResult<()> {
        if !self
            .partnerships
            .delete_request(trainer_id, request_id)
            .await?
        {
            return Err(CoachingError::NoSuchRequest);
        }

        tracing::info!(partnership_id = request_id, trainer_id, "Request denied");
        Ok(())
    }

    /// Trainer side ends an approved partnership.
    pub async fn end_partnership_with_user(
        &self,
        trainer_id: i64,
        user_id: i64,
    ) -> CoachingResult<i64> {
        self.drive(trainer_id, user_id, |current| plan_end(current, Role::Trainer))
            .await
    }

    /// User side ends an approved partnership.
    pub async fn end_partnership_with_trainer(
        &self,
        trainer_id: i64,
        user_id: i64,
    ) -> CoachingResult<i64> {
        self.drive(trainer_id, user_id, |current| plan_end(current, Role::User))
            .await
    }

    pub async fn partnership(
        &self,
        trainer_id: i64,
        user_id: i64,
    ) -> CoachingResult<Option<Partnership>> {
        Ok(self.partnerships.find(trainer_id, user_id).await?)
    }

    pub async fn is_approved(&self, trainer_id: i64, user_id: i64) -> CoachingResult<bool> {
        let current = self.partnerships.find(trainer_id, user_id).await?;
        Ok(current.is_some_and(|p| p.status == PartnershipStatus::Approved))
    }

    pub async fn user_partnerships(&self, user_id: i64) -> CoachingResult<Vec<Partnership>> {
        Ok(self.partnerships.list_for_user(user_id).await?)
    }

    pub async fn trainer_partnerships(&self, trainer_id: i64) -> CoachingResult<Vec<Partnership>> {
        Ok(self.partnerships.list_for_trainer(trainer_id).await?)
    }

    pub async fn trainer_requests(&self, trainer_id: i64) -> CoachingResult<Vec<TrainerRequest>> {
        self.ensure_role(trainer_id, Role::Trainer).await?;
        Ok(self.partnerships.pending_requests(trainer_id).await?)
    }

    /// A pending request, hidden unless it is addressed to `trainer_id`.
    pub async fn trainer_request(
        &self,
        trainer_id: i64,
        request_id: i64,
    ) -> CoachingResult<TrainerRequest> {
        self.partnerships
            .pending_request(trainer_id, request_id)
            .await?
            .ok_or(CoachingError::NoSuchRequest)
    }

    pub async fn trainer_users(&self, trainer_id: i64) -> CoachingResult<Vec<Account>> {
        self.ensure_role(trainer_id, Role::Trainer).await?;
        Ok(self.partnerships.approved_users(trainer_id).await?)
    }

    /// A partnered user's account; only visible while the partnership is approved.
    pub async fn trainer_user(&self, trainer_id: i64, user_id: i64) -> CoachingResult<Account> {
        if !self.is_approved(trainer_id, user_id).await? {
            return Err(CoachingError::NoActivePartnership);
        }
        Ok(self.accounts.find_by_id(user_id).await?)
    }

    async fn ensure_role(&self, id: i64, role: Role) -> CoachingResult<()> {
        match self.accounts.role_of(id).await? {
            Some(actual) if actual == role => Ok(()),
            _ => {
                tracing::debug!(account_id = id, expected = %role, "Rejected partnership target");
                Err(CoachingError::InvalidTarget(id))
            }
        }
    }

    /// Read the pair's row, ask `plan` what to do, and apply it conditionally.
    /// A lost race re-reads the row and plans again.
    async fn drive<F>(&self, trainer_id: i64, user_id: i64, plan: F) -> CoachingResult<i64>
    where
        F: Fn(Option<&Partnership>) -> CoachingResult<Step> + Send + Sync,
    {
        for _ in 0..MAX_ATTEMPTS {
            let current = self.partnerships.find(trainer_id, user_id).await?;

            match plan(current.as_ref())? {
                Step::Keep(id) => return Ok(id),
                Step::Insert(status) => {
                    let now = self.clock.now();
                    match self
                        .partnerships
                        .insert(trainer_id, user_id, status, now)
                        .await
                    {
                        Ok(created) => {
                            tracing::info!(
                                partnership_id = created.id,
                                trainer_id,
                                user_id,
                                status = %status,
                                "Partnership created"
                            );
                            return Ok(created.id);
                        }
                        Err(e) if e.is_unique_violation() => {
                            tracing::debug!(trainer_id, user_id, "Partnership inserted concurrently");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Step::Update { id, from, to } => {
                    let ended_at = to.is_ended().then(|| self.clock.now());
                    if self
                        .partnerships
                        .compare_and_set(id, from, to, ended_at)
                        .await?
                    {
                        tracing::info!(
                            partnership_id = id,
                            trainer_id,
                            user_id,
                            from = %from,
                            to = %to,
                            "Partnership transitioned"
                        );
                        return Ok(id);
                    }
                    tracing::debug!(partnership_id = id, "Partnership changed concurrently");
                }
            }
        }

        Err(CoachingError::Conflict {
            trainer_id,
            user_id,
        })
    }
}
