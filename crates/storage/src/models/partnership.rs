use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CoachingError, CoachingResult, StorageError};
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    Request,
    Approved,
    EndedByUser,
    EndedByTrainer,
}

impl PartnershipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PartnershipStatus::Request => "request",
            PartnershipStatus::Approved => "approved",
            PartnershipStatus::EndedByUser => "ended_by_user",
            PartnershipStatus::EndedByTrainer => "ended_by_trainer",
        }
    }

    /// Status recorded when the given side leaves an approved partnership.
    pub fn ended_by(side: Role) -> Self {
        match side {
            Role::User => PartnershipStatus::EndedByUser,
            Role::Trainer => PartnershipStatus::EndedByTrainer,
        }
    }

    pub fn is_ended(self) -> bool {
        matches!(
            self,
            PartnershipStatus::EndedByUser | PartnershipStatus::EndedByTrainer
        )
    }
}

impl fmt::Display for PartnershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnershipStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(PartnershipStatus::Request),
            "approved" => Ok(PartnershipStatus::Approved),
            "ended_by_user" => Ok(PartnershipStatus::EndedByUser),
            "ended_by_trainer" => Ok(PartnershipStatus::EndedByTrainer),
            other => Err(StorageError::UnknownValue(format!(
                "partnership status '{other}'"
            ))),
        }
    }
}

/// Consent relationship between one trainer and one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Partnership {
    pub id: i64,
    pub user_id: i64,
    pub trainer_id: i64,
    pub status: PartnershipStatus,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// A user's pending request as seen by the addressed trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrainerRequest {
    pub request_id: i64,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub sent_at: DateTime<Utc>,
}

/// What the state machine wants done to the (trainer, user) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No row exists yet: insert one with this status.
    Insert(PartnershipStatus),
    /// Row already in the wanted state.
    Keep(i64),
    /// Move the row, provided it is still in `from`.
    Update {
        id: i64,
        from: PartnershipStatus,
        to: PartnershipStatus,
    },
}

/// User asks a trainer to partner.
pub fn plan_user_request(current: Option<&Partnership>) -> CoachingResult<Step> {
    let Some(p) = current else {
        return Ok(Step::Insert(PartnershipStatus::Request));
    };
    match p.status {
        PartnershipStatus::Request => Ok(Step::Keep(p.id)),
        PartnershipStatus::Approved => Err(CoachingError::AlreadyApproved),
        PartnershipStatus::EndedByUser | PartnershipStatus::EndedByTrainer => Ok(Step::Update {
            id: p.id,
            from: p.status,
            to: PartnershipStatus::Request,
        }),
    }
}

/// Trainer partners with a user directly, skipping the request phase.
///
/// A user who ended the partnership holds the veto on re-entry.
pub fn plan_trainer_init(current: Option<&Partnership>) -> CoachingResult<Step> {
    let Some(p) = current else {
        return Ok(Step::Insert(PartnershipStatus::Approved));
    };
    match p.status {
        PartnershipStatus::Approved => Ok(Step::Keep(p.id)),
        PartnershipStatus::Request | PartnershipStatus::EndedByTrainer => Ok(Step::Update {
            id: p.id,
            from: p.status,
            to: PartnershipStatus::Approved,
        }),
        PartnershipStatus::EndedByUser => Err(CoachingError::UserMustReinitiate {
            partnership_id: p.id,
        }),
    }
}

/// Either side ends an approved partnership.
pub fn plan_end(current: Option<&Partnership>, side: Role) -> CoachingResult<Step> {
    match current {
        Some(p) if p.status == PartnershipStatus::Approved => Ok(Step::Update {
            id: p.id,
            from: PartnershipStatus::Approved,
            to: PartnershipStatus::ended_by(side),
        }),
        _ => Err(CoachingError::NoActivePartnership),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn row(status: PartnershipStatus) -> Partnership {
        Partnership {
            id: 11,
            user_id: 2,
            trainer_id: 1,
            status,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            ended_at: None,
        }
    }

    #[test]
    fn test_status_text_round_trip() {
        for status in [
            PartnershipStatus::Request,
            PartnershipStatus::Approved,
            PartnershipStatus::EndedByUser,
            PartnershipStatus::EndedByTrainer,
        ] {
            assert_eq!(status.as_str().parse::<PartnershipStatus>().unwrap(), status);
        }
        assert!("paused".parse::<PartnershipStatus>().is_err());
    }

    #[test]
    fn test_user_request_transitions() {
        assert_eq!(
            plan_user_request(None).unwrap(),
            Step::Insert(PartnershipStatus::Request)
        );
        assert_eq!(
            plan_user_request(Some(&row(PartnershipStatus::Request))).unwrap(),
            Step::Keep(11)
        );
        assert_eq!(
            plan_user_request(Some(&row(PartnershipStatus::Approved)))
                .unwrap_err()
                .kind(),
            ErrorKind::AlreadyApproved
        );
        for ended in [PartnershipStatus::EndedByUser, PartnershipStatus::EndedByTrainer] {
            assert_eq!(
                plan_user_request(Some(&row(ended))).unwrap(),
                Step::Update {
                    id: 11,
                    from: ended,
                    to: PartnershipStatus::Request
                }
            );
        }
    }

    #[test]
    fn test_trainer_init_transitions() {
        assert_eq!(
            plan_trainer_init(None).unwrap(),
            Step::Insert(PartnershipStatus::Approved)
        );
        assert_eq!(
            plan_trainer_init(Some(&row(PartnershipStatus::Approved))).unwrap(),
            Step::Keep(11)
        );
        for from in [PartnershipStatus::Request, PartnershipStatus::EndedByTrainer] {
            assert_eq!(
                plan_trainer_init(Some(&row(from))).unwrap(),
                Step::Update {
                    id: 11,
                    from,
                    to: PartnershipStatus::Approved
                }
            );
        }
    }

    #[test]
    fn test_trainer_cannot_resume_after_user_ended() {
        let err = plan_trainer_init(Some(&row(PartnershipStatus::EndedByUser))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserMustReinitiate);
        assert_eq!(err.partnership_id(), Some(11));
    }

    #[test]
    fn test_end_requires_approved() {
        assert_eq!(
            plan_end(Some(&row(PartnershipStatus::Approved)), Role::User).unwrap(),
            Step::Update {
                id: 11,
                from: PartnershipStatus::Approved,
                to: PartnershipStatus::EndedByUser
            }
        );
        assert_eq!(
            plan_end(Some(&row(PartnershipStatus::Approved)), Role::Trainer).unwrap(),
            Step::Update {
                id: 11,
                from: PartnershipStatus::Approved,
                to: PartnershipStatus::EndedByTrainer
            }
        );
        assert!(plan_end(None, Role::User).is_err());
        assert!(plan_end(Some(&row(PartnershipStatus::Request)), Role::Trainer).is_err());
        assert!(plan_end(Some(&row(PartnershipStatus::EndedByTrainer)), Role::User).is_err());
    }
}
