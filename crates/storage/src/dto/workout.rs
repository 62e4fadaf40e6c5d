use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{NewWorkout, Workout, WorkoutUpdate};

/// Workout a user records for themselves
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserWorkoutRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    /// Defaults to the creation time
    pub date: Option<DateTime<Utc>>,

    /// Trainer the workout is attributed to, if any
    pub trainer_id: Option<i64>,
}

impl CreateUserWorkoutRequest {
    pub fn into_new_workout(self, user_id: i64) -> NewWorkout {
        NewWorkout {
            title: self.title,
            user_id,
            trainer_id: self.trainer_id,
            description: self.description,
            date: self.date,
        }
    }
}

/// Workout a trainer assigns to a partnered user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTrainerWorkoutRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    pub date: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "user_id must be a positive id"))]
    pub user_id: i64,
}

impl CreateTrainerWorkoutRequest {
    pub fn into_new_workout(self, trainer_id: i64) -> NewWorkout {
        NewWorkout {
            title: self.title,
            user_id: self.user_id,
            trainer_id: Some(trainer_id),
            description: self.description,
            date: self.date,
        }
    }
}

/// Partial update; omitted fields keep their stored values
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkoutRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 4000))]
    pub description: Option<String>,

    pub date: Option<DateTime<Utc>>,
}

impl From<UpdateWorkoutRequest> for WorkoutUpdate {
    fn from(req: UpdateWorkoutRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            date: req.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkoutsResponse {
    pub workouts: Vec<Workout>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkoutIdResponse {
    pub workout_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_fails_validation() {
        let req = CreateUserWorkoutRequest {
            title: String::new(),
            description: None,
            date: None,
            trainer_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_trainer_request_assigns_trainer() {
        let req = CreateTrainerWorkoutRequest {
            title: "Intervals".to_string(),
            description: Some("6x400m".to_string()),
            date: None,
            user_id: 4,
        };
        assert!(req.validate().is_ok());

        let workout = req.into_new_workout(9);
        assert_eq!(workout.trainer_id, Some(9));
        assert_eq!(workout.user_id, 4);
    }

    #[test]
    fn test_update_payload_with_missing_fields() {
        let req: UpdateWorkoutRequest = serde_json::from_str(r#"{"title":"Core"}"#).unwrap();
        let update = WorkoutUpdate::from(req);
        assert_eq!(update.title.as_deref(), Some("Core"));
        assert!(update.description.is_none());
        assert!(update.date.is_none());
    }
}
