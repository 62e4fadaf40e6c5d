use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Workout {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    /// Assigning trainer; absent for workouts the user created alone.
    pub trainer_id: Option<i64>,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewWorkout {
    pub title: String,
    pub user_id: i64,
    pub trainer_id: Option<i64>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Partial update; `None` means "not provided".
#[derive(Debug, Clone, Default)]
pub struct WorkoutUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// How a blank description in a partial update is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DescriptionPolicy {
    /// A blank description clears the stored one.
    BlankOverwrites,
    /// A blank description is treated as not provided.
    #[default]
    BlankMeansUnset,
}

impl FromStr for DescriptionPolicy {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" | "blank-overwrites" => Ok(DescriptionPolicy::BlankOverwrites),
            "keep" | "blank-means-unset" => Ok(DescriptionPolicy::BlankMeansUnset),
            other => Err(StorageError::UnknownValue(format!(
                "description policy '{other}'"
            ))),
        }
    }
}

/// Fully resolved values written back by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutChanges {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl Workout {
    /// Fill the fields an update leaves unset from the stored workout.
    pub fn merge(&self, update: &WorkoutUpdate, policy: DescriptionPolicy) -> WorkoutChanges {
        let title = match update.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self.title.clone(),
        };

        let description = match (update.description.as_deref(), policy) {
            (None, _) => self.description.clone(),
            (Some(d), DescriptionPolicy::BlankMeansUnset) if d.trim().is_empty() => {
                self.description.clone()
            }
            (Some(d), _) => d.to_string(),
        };

        WorkoutChanges {
            title,
            description,
            date: update.date.unwrap_or(self.date),
        }
    }
}

/// Owner and assigning trainer of a workout; the only ids allowed to touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutAccess {
    pub user_id: i64,
    pub trainer_id: Option<i64>,
}

impl WorkoutAccess {
    pub fn permits(&self, actor_id: i64) -> bool {
        self.user_id == actor_id || self.trainer_id == Some(actor_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stored() -> Workout {
        Workout {
            id: 1,
            title: "Legs".to_string(),
            user_id: 5,
            trainer_id: Some(9),
            description: "Squats and lunges".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let changes = stored().merge(&WorkoutUpdate::default(), DescriptionPolicy::default());
        assert_eq!(changes.title, "Legs");
        assert_eq!(changes.description, "Squats and lunges");
        assert_eq!(changes.date, stored().date);
    }

    #[test]
    fn test_merge_blank_title_falls_back() {
        let update = WorkoutUpdate {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        let changes = stored().merge(&update, DescriptionPolicy::BlankOverwrites);
        assert_eq!(changes.title, "Legs");
    }

    #[test]
    fn test_merge_applies_provided_fields() {
        let date = Utc.with_ymd_and_hms(2024, 4, 2, 18, 30, 0).unwrap();
        let update = WorkoutUpdate {
            title: Some("Push day".to_string()),
            description: Some("Bench".to_string()),
            date: Some(date),
        };
        let changes = stored().merge(&update, DescriptionPolicy::BlankMeansUnset);
        assert_eq!(changes.title, "Push day");
        assert_eq!(changes.description, "Bench");
        assert_eq!(changes.date, date);
    }

    #[test]
    fn test_blank_description_depends_on_policy() {
        let update = WorkoutUpdate {
            description: Some(String::new()),
            ..Default::default()
        };
        let kept = stored().merge(&update, DescriptionPolicy::BlankMeansUnset);
        assert_eq!(kept.description, "Squats and lunges");

        let cleared = stored().merge(&update, DescriptionPolicy::BlankOverwrites);
        assert_eq!(cleared.description, "");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "overwrite".parse::<DescriptionPolicy>().unwrap(),
            DescriptionPolicy::BlankOverwrites
        );
        assert_eq!(
            "KEEP".parse::<DescriptionPolicy>().unwrap(),
            DescriptionPolicy::BlankMeansUnset
        );
        assert!("sometimes".parse::<DescriptionPolicy>().is_err());
    }

    #[test]
    fn test_access_owner_and_trainer_only() {
        let access = WorkoutAccess {
            user_id: 5,
            trainer_id: Some(9),
        };
        assert!(access.permits(5));
        assert!(access.permits(9));
        assert!(!access.permits(6));

        let self_made = WorkoutAccess {
            user_id: 5,
            trainer_id: None,
        };
        assert!(!self_made.permits(9));
    }
}
