use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{CoachingError, CoachingResult};
use crate::models::{DescriptionPolicy, NewWorkout, Role, Workout, WorkoutAccess, WorkoutUpdate};
use crate::repository::{AccountRepository, WorkoutRepository};

/// Workout records readable and writable only by their owner and assigning trainer.
#[derive(Clone)]
pub struct WorkoutService {
    accounts: Arc<dyn AccountRepository>,
    workouts: Arc<dyn WorkoutRepository>,
    clock: Arc<dyn Clock>,
    description_policy: DescriptionPolicy,
}

impl WorkoutService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        clock: Arc<dyn Clock>,
        description_policy: DescriptionPolicy,
    ) -> Self {
        Self {
            accounts,
            workouts,
            clock,
            description_policy,
        }
    }

    pub fn description_policy(&self) -> DescriptionPolicy {
        self.description_policy
    }

    /// Workout the user records for themselves, optionally naming a trainer.
    pub async fn create_workout_as_user(&self, workout: NewWorkout) -> CoachingResult<Workout> {
        validate_title(&workout)?;

        if let Some(trainer_id) = workout.trainer_id {
            if self.accounts.role_of(trainer_id).await? != Some(Role::Trainer) {
                tracing::debug!(trainer_id, "Workout names a non-trainer as trainer");
                return Err(CoachingError::InvalidTarget(trainer_id));
            }
        }

        self.persist(workout).await
    }

    /// Workout a trainer assigns to a user they are partnered with.
    pub async fn create_workout_as_trainer(&self, workout: NewWorkout) -> CoachingResult<Workout> {
        validate_title(&workout)?;

        let trainer_id = workout
            .trainer_id
            .ok_or(CoachingError::InvalidWorkout("trainer id is required"))?;

        let date = workout.date.unwrap_or_else(|| self.clock.now());
        let Some(created) = self
            .workouts
            .insert_if_partnered(&workout, trainer_id, date)
            .await?
        else {
            tracing::debug!(
                trainer_id,
                user_id = workout.user_id,
                "No approved partnership for workout"
            );
            return Err(CoachingError::NoPartnershipRights);
        };

        log_created(&created);
        Ok(created)
    }

    /// Succeeds iff `actor_id` owns the workout or assigned it.
    pub async fn check_access_to_workout(
        &self,
        workout_id: i64,
        actor_id: i64,
    ) -> CoachingResult<WorkoutAccess> {
        let access = self
            .workouts
            .access(workout_id)
            .await?
            .ok_or(CoachingError::NotFound)?;

        if !access.permits(actor_id) {
            tracing::debug!(workout_id, actor_id, "Workout access denied");
            return Err(CoachingError::NoAccess);
        }

        Ok(access)
    }

    pub async fn get_workout_by_id(
        &self,
        workout_id: i64,
        actor_id: i64,
    ) -> CoachingResult<Workout> {
        self.check_access_to_workout(workout_id, actor_id).await?;
        Ok(self.workouts.find_by_id(workout_id).await?)
    }

    pub async fn update_workout(
        &self,
        workout_id: i64,
        actor_id: i64,
        update: &WorkoutUpdate,
    ) -> CoachingResult<Workout> {
        self.check_access_to_workout(workout_id, actor_id).await?;

        let updated = self
            .workouts
            .update(workout_id, update, self.description_policy)
            .await?;

        tracing::info!(workout_id, actor_id, "Workout updated");
        Ok(updated)
    }

    pub async fn delete_workout(&self, workout_id: i64, actor_id: i64) -> CoachingResult<()> {
        self.check_access_to_workout(workout_id, actor_id).await?;
        self.workouts.delete(workout_id).await?;

        tracing::info!(workout_id, actor_id, "Workout deleted");
        Ok(())
    }

    pub async fn user_workouts(&self, user_id: i64) -> CoachingResult<Vec<Workout>> {
        Ok(self.workouts.list_for_user(user_id).await?)
    }

    pub async fn trainer_workouts(&self, trainer_id: i64) -> CoachingResult<Vec<Workout>> {
        Ok(self.workouts.list_for_trainer(trainer_id).await?)
    }

    pub async fn trainer_workouts_with_user(
        &self,
        trainer_id: i64,
        user_id: i64,
    ) -> CoachingResult<Vec<Workout>> {
        Ok(self.workouts.list_for_pair(trainer_id, user_id).await?)
    }

    async fn persist(&self, workout: NewWorkout) -> CoachingResult<Workout> {
        let date = workout.date.unwrap_or_else(|| self.clock.now());
        let created = self.workouts.insert(&workout, date).await?;

        log_created(&created);
        Ok(created)
    }
}

fn log_created(created: &Workout) {
    tracing::info!(
        workout_id = created.id,
        user_id = created.user_id,
        trainer_id = ?created.trainer_id,
        "Workout created"
    );
}

fn validate_title(workout: &NewWorkout) -> CoachingResult<()> {
    if workout.title.trim().is_empty() {
        return Err(CoachingError::InvalidWorkout("title must not be empty"));
    }
    Ok(())
}
